//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::github::PrState;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // PR state colors
    pub state_open: Color,
    pub state_closed: Color,
    pub at_risk: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,

    // Styles
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Filter bar
    pub filter_label: Color,
    pub filter_active: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_info: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub error_border: Color,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            state_open: Color::Green,
            state_closed: Color::Red,
            at_risk: Color::Yellow,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            filter_label: Color::DarkGray,
            filter_active: Style::new().fg(Color::Cyan).bold(),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_info: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            error_border: Color::Red,
        }
    }

    pub fn state_color(&self, state: PrState) -> Color {
        match state {
            PrState::Open => self.state_open,
            PrState::Closed => self.state_closed,
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::dark()
    }
}
