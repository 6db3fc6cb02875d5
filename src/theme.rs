//! Colors and styles for the TUI
//!
//! Every widget takes its colors from here rather than hardcoding them.

use ratatui::style::{Color, Modifier, Style};

/// Color palette
pub struct Colors;

impl Colors {
    /// Dialog background
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    pub const FG_PRIMARY: Color = Color::White;
    pub const FG_SECONDARY: Color = Color::Gray;
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Borders, titles, focus
    pub const PRIMARY: Color = Color::Cyan;
    /// Selected entries
    pub const SECONDARY: Color = Color::Yellow;

    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    pub const BORDER_ACTIVE: Color = Color::Cyan;
    pub const BORDER_INACTIVE: Color = Color::DarkGray;

    pub const SELECTED_BG: Color = Color::Yellow;
    pub const SELECTED_FG: Color = Color::Black;

    pub const NAV_HINT: Color = Color::DarkGray;
}

/// Pre-built styles
pub struct Styles;

impl Styles {
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER_INACTIVE)
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY)
    }

    /// Focused button
    pub fn button_active() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn button_inactive() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    /// Button that cannot be pressed while a run is in progress
    pub fn button_disabled() -> Style {
        Style::default()
            .fg(Colors::FG_MUTED)
            .add_modifier(Modifier::DIM)
    }

    /// Yes button (selected)
    pub fn button_confirm() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    /// No button (selected)
    pub fn button_cancel() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }
}

/// Log line categories, used only for coloring the log pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    /// Guess the category of a workflow log line from its wording
    pub fn classify(line: &str) -> Self {
        let lower = line.to_ascii_lowercase();
        if lower.starts_with("error")
            || lower.contains("failed")
            || lower.contains("is not available")
            || lower.contains("not valid")
            || lower.contains("refusing to clear")
        {
            LogLevel::Error
        } else if lower.starts_with("successfully") || lower.starts_with("universal wheel for") {
            LogLevel::Success
        } else if lower.starts_with("matching wheels not found")
            || lower.contains("delete the cache folder manually")
            || lower.starts_with("choose an empty")
            || lower.starts_with("please enter")
        {
            LogLevel::Warning
        } else {
            LogLevel::Info
        }
    }
}

pub struct Theme;

impl Theme {
    pub fn log_style(level: LogLevel) -> Style {
        match level {
            LogLevel::Info => Style::default().fg(Colors::FG_PRIMARY),
            LogLevel::Warning => Style::default().fg(Colors::WARNING),
            LogLevel::Error => Style::default().fg(Colors::ERROR),
            LogLevel::Success => Style::default().fg(Colors::SUCCESS),
        }
    }
}

/// Layout constants
pub struct UiConstants;

impl UiConstants {
    pub const DIALOG_WIDTH: u16 = 60;
    pub const DIALOG_HEIGHT: u16 = 9;
    pub const NAV_BAR_HEIGHT: u16 = 1;
    /// Lines moved by PageUp/PageDown in the log pane
    pub const PAGE_SCROLL_SIZE: usize = 10;
}

/// Button labels
pub struct UiText;

impl UiText {
    pub const BTN_INSTALL: &'static str = "[ Install ]";
    pub const BTN_YES: &'static str = "[ Yes ]";
    pub const BTN_NO: &'static str = "[ No ]";
}
