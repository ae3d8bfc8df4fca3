use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::dashboard::DashboardView;
use crate::filter::is_at_risk;
use crate::github::{PrState, PullRequest};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
pub fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Calendar date in UTC, "2024-06-01"
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Closing date, or "-" while the PR is still open
pub fn format_closed(pr: &PullRequest) -> String {
    pr.closed_at
        .map(format_date)
        .unwrap_or_else(|| "-".to_string())
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// "+120/-4"
pub fn format_size(pr: &PullRequest) -> String {
    format!("+{}/-{}", pr.additions, pr.deletions)
}

/// Format PRs as an aligned table with columns:
/// number, state, author, size, opened, age, closed, title.
///
/// Titles are truncated to the terminal width when stdout is a terminal.
/// Open PRs past `at_risk_after` get a leading `!` marker.
pub fn format_pr_table(
    prs: &[&PullRequest],
    now: DateTime<Utc>,
    at_risk_after: Duration,
    use_colors: bool,
) -> String {
    if prs.is_empty() {
        return "No pull requests match the current filters.".to_string();
    }

    let number_width = prs
        .iter()
        .map(|pr| pr.number.to_string().len() + 1)
        .max()
        .unwrap_or(2);
    let author_width = prs
        .iter()
        .map(|pr| pr.author.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);
    let size_width = prs
        .iter()
        .map(|pr| format_size(pr).len())
        .max()
        .unwrap_or(0);
    let age_width = prs
        .iter()
        .map(|pr| format_age(pr.age_at(now)).len())
        .max()
        .unwrap_or(0);
    let state_width = 6;
    let date_width = 10;
    let separator = "  ";

    // marker + number + state + author + size + opened + age + closed, each with a separator
    let fixed_width = 2
        + number_width
        + state_width
        + author_width
        + size_width
        + date_width * 2
        + age_width
        + separator.len() * 7;
    let title_width = get_terminal_width().map(|width| {
        if width > fixed_width + 10 {
            width - fixed_width
        } else {
            20
        }
    });

    prs.iter()
        .map(|pr| {
            let at_risk = is_at_risk(pr, now, at_risk_after);
            let marker = if at_risk { "! " } else { "  " };
            let number = format!("{:>width$}", format!("#{}", pr.number), width = number_width);
            let state = format!("{:<width$}", pr.state.as_str(), width = state_width);
            let title = match title_width {
                Some(width) => truncate_title(&pr.title, width),
                None => pr.title.clone(),
            };
            let author = format!(
                "{:<width$}",
                truncate_title(&pr.author, author_width),
                width = author_width
            );
            let size = format!("{:>width$}", format_size(pr), width = size_width);
            let opened = format_date(pr.created_at);
            let age = format!("{:>width$}", format_age(pr.age_at(now)), width = age_width);
            let closed = format!("{:<width$}", format_closed(pr), width = date_width);

            if use_colors {
                let state = match pr.state {
                    PrState::Open => state.green().to_string(),
                    PrState::Closed => state.red().to_string(),
                };
                let marker = if at_risk {
                    marker.red().bold().to_string()
                } else {
                    marker.to_string()
                };
                format!(
                    "{}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
                    marker,
                    number.dimmed(),
                    state,
                    author.yellow(),
                    size,
                    opened,
                    age.cyan(),
                    closed.dimmed(),
                    title.bold(),
                    sep = separator
                )
            } else {
                format!(
                    "{}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
                    marker,
                    number,
                    state,
                    author,
                    size,
                    opened,
                    age,
                    closed,
                    title,
                    sep = separator
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format PRs as tab-separated values for scripting
/// Columns: number, state, title, author, additions, deletions, opened,
/// closed, url (no headers, no colors)
pub fn format_tsv(prs: &[&PullRequest]) -> String {
    prs.iter()
        .map(|pr| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                pr.number,
                pr.state,
                pr.title.replace('\t', " "),
                pr.author,
                pr.additions,
                pr.deletions,
                pr.created_at.to_rfc3339(),
                pr.closed_at.map(|d| d.to_rfc3339()).unwrap_or_default(),
                pr.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "Page 2 of 3 (45 of 120 pull requests)"
pub fn format_summary(view: &DashboardView<'_>) -> String {
    format!(
        "Page {} of {} ({} of {} pull requests)",
        view.page, view.total_pages, view.filtered_count, view.total_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn sample_pr() -> PullRequest {
        PullRequest {
            number: 123,
            title: "Fix login bug".to_string(),
            author: "octocat".to_string(),
            state: PrState::Open,
            url: "https://github.com/owner/repo/pull/123".to_string(),
            created_at: now() - Duration::days(2),
            closed_at: None,
            additions: 50,
            deletions: 10,
        }
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(30)), "now");
        assert_eq!(format_age(Duration::minutes(30)), "30m");
        assert_eq!(format_age(Duration::hours(5)), "5h");
        assert_eq!(format_age(Duration::days(3)), "3d");
        assert_eq!(format_age(Duration::days(15)), "2w");
    }

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("short", 10), "short");
        assert_eq!(truncate_title("a longer title", 8), "a lon...");
        assert_eq!(truncate_title("abcdef", 3), "abc");
        // Multi-byte characters count as one column each
        assert_eq!(truncate_title("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_closed() {
        let mut pr = sample_pr();
        assert_eq!(format_closed(&pr), "-");

        pr.closed_at = Some(Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 0).unwrap());
        assert_eq!(format_closed(&pr), "2024-06-14");
    }

    #[test]
    fn test_pr_table_plain() {
        let pr = sample_pr();
        let output = format_pr_table(&[&pr], now(), Duration::days(7), false);

        assert!(output.starts_with("  #123"));
        assert!(output.contains("open"));
        assert!(output.contains("octocat"));
        assert!(output.contains("+50/-10"));
        assert!(output.contains("2024-06-13"));
        assert!(output.contains("Fix login bug"));
    }

    #[test]
    fn test_pr_table_shows_age() {
        let mut old = sample_pr();
        old.number = 9;
        old.created_at = now() - Duration::days(21);
        let output = format_pr_table(&[&sample_pr(), &old], now(), Duration::days(30), false);
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].contains("2024-06-13  2d  -"));
        assert!(lines[1].contains("2024-05-25  3w  -"));
    }

    #[test]
    fn test_pr_table_marks_at_risk() {
        let mut pr = sample_pr();
        pr.created_at = now() - Duration::days(30);
        let output = format_pr_table(&[&pr], now(), Duration::days(7), false);
        assert!(output.starts_with("! #123"));
    }

    #[test]
    fn test_pr_table_empty() {
        let output = format_pr_table(&[], now(), Duration::days(7), false);
        assert_eq!(output, "No pull requests match the current filters.");
    }

    #[test]
    fn test_format_tsv() {
        let mut closed = sample_pr();
        closed.number = 7;
        closed.state = PrState::Closed;
        closed.title = "Tabs\tinside".to_string();
        closed.closed_at = Some(now());
        let open = sample_pr();

        let output = format_tsv(&[&open, &closed]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[0], "123");
        assert_eq!(fields[1], "open");
        assert_eq!(fields[7], "");

        let fields: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[2], "Tabs inside");
        assert_eq!(fields[7], "2024-06-15T12:00:00+00:00");
    }

    #[test]
    fn test_format_summary() {
        let view = DashboardView {
            rows: Vec::new(),
            page: 2,
            total_pages: 3,
            has_prev: true,
            has_next: true,
            filtered_count: 45,
            total_count: 120,
        };
        assert_eq!(format_summary(&view), "Page 2 of 3 (45 of 120 pull requests)");
    }
}
