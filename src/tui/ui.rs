use chrono::Utc;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::dashboard::DashboardView;
use crate::filter::{is_at_risk, parse_filter_date};
use crate::output::{
    format_age, format_closed, format_date, format_size, format_summary, truncate_title,
};
use crate::tui::app::{App, FlashKind, InputMode};
use crate::tui::theme::ThemeColors;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 7 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Filters(1) + Table(fill) + Pages(1) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Filter bar
        Constraint::Fill(1),   // PR table or error
        Constraint::Length(1), // Page indicator
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_filters(frame, chunks[1], app);
    if let Some(error) = app.dashboard.error.clone() {
        render_error(frame, chunks[2], &app.theme, &error);
    } else {
        render_table(frame, chunks[2], app);
    }
    render_page_bar(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::EditRepository => render_input_popup(
            frame,
            app,
            " Repository ",
            "owner/name, empty = default",
        ),
        InputMode::EditOpenedAfter => {
            render_input_popup(frame, app, " Opened on or after ", "YYYY-MM-DD, empty = any")
        }
        InputMode::EditOpenedBefore => {
            render_input_popup(frame, app, " Opened on or before ", "YYYY-MM-DD, empty = any")
        }
        InputMode::Help => render_help_popup(frame, &app.theme),
        InputMode::Normal => {}
    }

    // Render loading overlay if loading (appears on top of everything)
    if app.dashboard.loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let name = "PR Dash";
    let repository = app.dashboard.target_repository.as_str();
    let mut spans = vec![
        Span::styled(name, Style::default().fg(theme.title_color).bold()),
        Span::raw("  "),
        Span::styled(repository, Style::default().bold()),
    ];

    if let Some(refreshed) = app.last_refresh {
        let elapsed = refreshed.elapsed();
        let refresh_time = if elapsed.as_secs() < 60 {
            format!("refreshed {}s ago", elapsed.as_secs())
        } else {
            format!("refreshed {}m ago", elapsed.as_secs() / 60)
        };
        let left_len = name.len() + 2 + repository.chars().count();
        let padding_len = (area.width as usize).saturating_sub(left_len + refresh_time.len());
        spans.push(Span::raw(" ".repeat(padding_len)));
        spans.push(Span::styled(refresh_time, Style::default().fg(theme.muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// "Status: open  After: 2024-01-01  Before: any  At risk: on"
fn render_filters(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let filters = &app.dashboard.filters;
    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme.filter_label));

    let value = |text: String, active: bool| {
        if active {
            Span::styled(text, theme.filter_active)
        } else {
            Span::styled(text, Style::default().fg(theme.muted))
        }
    };

    let date_value = |input: &str| {
        if input.trim().is_empty() {
            value("any".to_string(), false)
        } else if parse_filter_date(input).is_some() {
            value(input.trim().to_string(), true)
        } else {
            Span::styled(
                format!("{} (ignored)", input.trim()),
                Style::default().fg(theme.flash_error),
            )
        }
    };

    let status_active = filters.status != crate::filter::StatusFilter::All;
    let spans = vec![
        label("Status: "),
        value(filters.status.label().to_string(), status_active),
        Span::raw("  "),
        label("After: "),
        date_value(&filters.opened_after),
        Span::raw("  "),
        label("Before: "),
        date_value(&filters.opened_before),
        Span::raw("  "),
        label("At risk: "),
        value(
            if filters.at_risk { "on" } else { "off" }.to_string(),
            filters.at_risk,
        ),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let now = Utc::now();
    let theme = app.theme.clone();
    let at_risk_after = app.dashboard.settings.at_risk_after;
    let view = app.dashboard.view(now);

    if view.rows.is_empty() {
        let text = if app.dashboard.loading {
            ""
        } else if view.total_count == 0 {
            "No pull requests in this repository"
        } else {
            "No pull requests match the current filters"
        };
        let empty_msg = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    let rows: Vec<Row> = view
        .rows
        .iter()
        .enumerate()
        .map(|(idx, pr)| {
            let at_risk = is_at_risk(pr, now, at_risk_after);
            let marker = if at_risk { "!" } else { "" };
            let title_style = if at_risk {
                Style::default().fg(theme.at_risk)
            } else {
                Style::default()
            };

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(marker).style(Style::default().fg(theme.at_risk).bold()),
                Cell::from(format!("#{}", pr.number)).style(Style::default().fg(theme.index_color)),
                Cell::from(pr.state.as_str())
                    .style(Style::default().fg(theme.state_color(pr.state))),
                Cell::from(truncate_title(&pr.title, 80)).style(title_style),
                Cell::from(truncate_title(&pr.author, 16)),
                Cell::from(format_size(pr)),
                Cell::from(format_date(pr.created_at)),
                Cell::from(format_age(pr.age_at(now))),
                Cell::from(format_closed(pr)).style(Style::default().fg(theme.muted)),
            ])
            .style(row_style)
        })
        .collect();

    // Column widths
    let widths = [
        Constraint::Length(1),  // At-risk marker
        Constraint::Length(7),  // "#12345"
        Constraint::Length(6),  // "closed"
        Constraint::Fill(1),    // Title
        Constraint::Length(16), // Author
        Constraint::Length(13), // "+1234/-567"
        Constraint::Length(10), // Opened
        Constraint::Length(4),  // "12w"
        Constraint::Length(10), // Closed
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "#", "State", "Title", "Author", "Size", "Opened", "Age", "Closed"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_error(frame: &mut Frame, area: Rect, theme: &ThemeColors, error: &str) {
    let block = Block::bordered()
        .title(" Error ")
        .border_style(Style::default().fg(theme.error_border));
    let lines = vec![
        Line::from(Span::styled(error.to_string(), Style::default().bold())),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry or / to choose another repository",
            Style::default().fg(theme.muted),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_page_bar(frame: &mut Frame, area: Rect, app: &App) {
    let view: DashboardView<'_> = app.dashboard.view(Utc::now());
    // Unavailable directions stay visible, greyed out
    let nav_style = |enabled: bool| {
        if enabled {
            Style::default().fg(app.theme.status_key_color)
        } else {
            Style::default().fg(app.theme.muted).dim()
        }
    };
    let spans = vec![
        Span::styled("< Prev  ", nav_style(view.has_prev)),
        Span::styled(format_summary(&view), Style::default().fg(app.theme.muted)),
        Span::styled("  Next >", nav_style(view.has_next)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, kind, _)) = app.flash_message {
        let msg_color = match kind {
            FlashKind::Info => theme.flash_info,
            FlashKind::Error => theme.flash_error,
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints = [
            ("j/k", ":nav "),
            ("n/p", ":page "),
            ("s", ":status "),
            ("a", ":at-risk "),
            ("[/]", ":dates "),
            ("/", ":repo "),
            ("Enter", ":open "),
            ("?", ":help "),
            ("q", ":quit"),
        ];

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Render a single-line text input popup
fn render_input_popup(frame: &mut Frame, app: &App, title: &str, hint: &str) {
    let popup_area = centered_rect_fixed(50, 5, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(title)
        .title_style(app.theme.popup_title)
        .border_style(Style::default().fg(app.theme.popup_border));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let chunks = Layout::vertical([
        Constraint::Length(1), // Input line
        Constraint::Length(1), // Help text
    ])
    .split(inner);

    let input = Paragraph::new(format!("{}|", app.input));
    frame.render_widget(input, chunks[0]);

    let help = Paragraph::new(format!("Enter: confirm | Esc: cancel | {}", hint))
        .style(Style::default().fg(app.theme.muted));
    frame.render_widget(help, chunks[1]);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(52, 19, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(" Keyboard Shortcuts ")
        .title_style(theme.popup_title)
        .border_style(Style::default().fg(theme.popup_border));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);

    let shortcuts = [
        ("j / Down", "Move down"),
        ("k / Up", "Move up"),
        ("n / Right", "Next page"),
        ("p / Left", "Previous page"),
        ("Enter / o", "Open PR in browser"),
        ("s", "Cycle status: all, open, closed"),
        ("a", "Toggle at-risk only"),
        ("[", "Set opened-after date"),
        ("]", "Set opened-before date"),
        ("c", "Clear date filters"),
        ("/", "Change repository"),
        ("r", "Refetch repository"),
        ("?", "Show/hide this help"),
        ("q / Ctrl-c", "Quit"),
    ];

    let mut help_lines: Vec<Line> = shortcuts
        .iter()
        .map(|(keys, description)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<14}", keys),
                    Style::default().fg(theme.status_key_color).bold(),
                ),
                Span::raw(*description),
            ])
        })
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(36, 3, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let text = if app.dashboard.records.is_empty() {
        format!("{} Loading pull requests...", spinner)
    } else {
        format!("{} Refreshing...", spinner)
    };

    let loading_text = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.title_color));

    frame.render_widget(loading_text, inner);
}
