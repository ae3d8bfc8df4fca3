use chrono::Utc;
use std::time::Instant;

use crate::dashboard::{reduce, Action, Command, DashboardState};
use crate::filter::parse_filter_date;
use crate::github::PullRequest;
use crate::tui::theme::ThemeColors;

const FLASH_DURATION_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditRepository,
    EditOpenedAfter,
    EditOpenedBefore,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Info,
    Error,
}

pub struct App {
    pub dashboard: DashboardState,
    pub table_state: ratatui::widgets::TableState,
    pub input_mode: InputMode,
    pub input: String,
    pub flash_message: Option<(String, FlashKind, Instant)>,
    pub last_refresh: Option<Instant>,
    pub should_quit: bool,
    pub spinner_frame: usize,
    pub theme: ThemeColors,
    commands: Vec<Command>,
}

impl App {
    /// Wrap a freshly started dashboard. The start command is not queued here;
    /// the caller runs it.
    pub fn new(dashboard: DashboardState) -> Self {
        Self {
            dashboard,
            table_state: ratatui::widgets::TableState::default(),
            input_mode: InputMode::Normal,
            input: String::new(),
            flash_message: None,
            last_refresh: None,
            should_quit: false,
            spinner_frame: 0,
            theme: ThemeColors::dark(),
            commands: Vec::new(),
        }
    }

    /// Run an action through the dashboard reducer and queue any command it
    /// returns
    pub fn dispatch(&mut self, action: Action) {
        let flash = match &action {
            Action::FetchSucceeded {
                generation,
                repository,
                records,
            } if *generation == self.dashboard.generation => Some((
                format!("Loaded {} pull requests from {}", records.len(), repository),
                FlashKind::Info,
            )),
            Action::FetchFailed { generation, .. } if *generation == self.dashboard.generation => {
                Some(("Fetch failed".to_string(), FlashKind::Error))
            }
            _ => None,
        };
        let is_page_change = matches!(action, Action::NextPage | Action::PrevPage);
        let is_commit = matches!(action, Action::FetchSucceeded { .. });

        let (next, command) = reduce(self.dashboard.clone(), action);
        self.dashboard = next;
        if let Some(command) = command {
            self.commands.push(command);
        }

        if let Some((msg, kind)) = flash {
            if kind == FlashKind::Info {
                self.last_refresh = Some(Instant::now());
            }
            self.set_flash(msg, kind);
        }

        if is_page_change || is_commit {
            self.table_state.select(None);
        }
        self.clamp_selection();
    }

    /// Commands queued since the last call
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn visible_rows(&self) -> Vec<&PullRequest> {
        self.dashboard.view(Utc::now()).rows
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            match self.table_state.selected() {
                Some(selected) if selected >= len => self.table_state.select(Some(len - 1)),
                Some(_) => {}
                None => self.table_state.select(Some(0)),
            }
        }
    }

    pub fn next_row(&mut self) {
        let len = self.visible_rows().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.visible_rows().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_pr(&self) -> Option<&PullRequest> {
        let rows = self.visible_rows();
        self.table_state.selected().and_then(|i| rows.get(i).copied())
    }

    pub fn open_selected(&mut self) {
        let Some(pr) = self.selected_pr().cloned() else {
            return;
        };
        match crate::browser::open_pull_request(&pr) {
            Ok(()) => self.show_flash(format!("Opened: #{} {}", pr.number, pr.title)),
            Err(e) => self.show_error(format!("Failed to open browser: {}", e)),
        }
    }

    /// Clear flash message after it has been shown long enough
    pub fn update_flash(&mut self) {
        if let Some((_, _, shown_at)) = &self.flash_message {
            if shown_at.elapsed().as_secs() >= FLASH_DURATION_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.set_flash(msg, FlashKind::Info);
    }

    pub fn show_error(&mut self, msg: String) {
        self.set_flash(msg, FlashKind::Error);
    }

    fn set_flash(&mut self, msg: String, kind: FlashKind) {
        self.flash_message = Some((msg, kind, Instant::now()));
    }

    /// Open one of the text inputs, prefilled with the current value
    pub fn start_input(&mut self, mode: InputMode) {
        self.input = match mode {
            InputMode::EditRepository => self.dashboard.filters.repository.clone(),
            InputMode::EditOpenedAfter => self.dashboard.filters.opened_after.clone(),
            InputMode::EditOpenedBefore => self.dashboard.filters.opened_before.clone(),
            InputMode::Normal | InputMode::Help => String::new(),
        };
        self.input_mode = mode;
    }

    pub fn confirm_input(&mut self) {
        let value = std::mem::take(&mut self.input).trim().to_string();
        let mode = self.input_mode;
        self.input_mode = InputMode::Normal;

        match mode {
            InputMode::EditRepository => self.dispatch(Action::SetRepository(value)),
            InputMode::EditOpenedAfter | InputMode::EditOpenedBefore => {
                if !value.is_empty() && parse_filter_date(&value).is_none() {
                    self.show_error(format!(
                        "Ignoring invalid date '{}' (use YYYY-MM-DD)",
                        value
                    ));
                }
                if mode == InputMode::EditOpenedAfter {
                    self.dispatch(Action::SetOpenedAfter(value));
                } else {
                    self.dispatch(Action::SetOpenedBefore(value));
                }
            }
            InputMode::Normal | InputMode::Help => {}
        }
    }

    pub fn cancel_input(&mut self) {
        self.input.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
