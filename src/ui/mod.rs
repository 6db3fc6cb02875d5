//! User interface rendering
//!
//! - `header` - title, status line, navigation bar
//! - `dialogs` - install and exit confirmations
//!
//! The screen is a single form:
//!
//! ```text
//! +--------------- title ----------------+
//! | Package name: [ numpy              ] |
//! |             [ Install ]              |
//! | log pane (scrolls, newest at bottom) |
//! | status                               |
//! | nav hints                            |
//! ```

mod dialogs;
mod header;

pub use dialogs::centered_rect;

use crate::app::{AppState, Focus};
use crate::components::keybindings::KeybindingContext;
use crate::theme::{LogLevel, Styles, Theme, UiConstants, UiText};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub const TITLE: &str = "fatwheel: universal2 wheel builder";

#[derive(Default)]
pub struct UiRenderer;

impl UiRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, f: &mut Frame, state: &AppState, keybindings: &KeybindingContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(UiConstants::NAV_BAR_HEIGHT),
            ])
            .split(f.area());

        header::render_title(f, chunks[0], TITLE);
        render_entry(f, chunks[1], state);
        render_install_button(f, chunks[2], state);
        render_log(f, chunks[3], state);
        header::render_status(f, chunks[4], &state.status_message, state.is_running());
        header::render_nav_bar(f, chunks[5], &keybindings.nav_items(state.mode));

        dialogs::render_dialog(f, state);
    }
}

fn render_entry(f: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.input_enabled() && state.focus == Focus::Entry;
    let border_style = if focused {
        Styles::border_active()
    } else {
        Styles::border_inactive()
    };
    let text_style = if state.input_enabled() {
        Styles::text()
    } else {
        Styles::text_muted()
    };

    let entry = Paragraph::new(Span::styled(state.package_input.clone(), text_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Package name ")
            .border_style(border_style),
    );
    f.render_widget(entry, area);

    if focused {
        // Inside the left border; clamp to the visible width.
        let max_x = area.x + area.width.saturating_sub(2);
        let x = (area.x + 1 + state.cursor as u16).min(max_x);
        f.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn render_install_button(f: &mut Frame, area: Rect, state: &AppState) {
    let style = if !state.input_enabled() {
        Styles::button_disabled()
    } else if state.focus == Focus::InstallButton {
        Styles::button_active()
    } else {
        Styles::button_inactive()
    };
    let button = Paragraph::new(Line::from(Span::styled(UiText::BTN_INSTALL, style)))
        .alignment(Alignment::Center);
    f.render_widget(button, area);
}

/// Indices of the log lines that fit in `height` rows, honoring the scroll
/// offset from the bottom.
pub fn visible_log_range(total: usize, height: usize, scroll_from_bottom: usize) -> (usize, usize) {
    let end = total.saturating_sub(scroll_from_bottom);
    let start = end.saturating_sub(height);
    (start, end)
}

fn render_log(f: &mut Frame, area: Rect, state: &AppState) {
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_log_range(state.log.len(), height, state.log_scroll);

    let lines: Vec<Line> = state.log[start..end]
        .iter()
        .map(|line| {
            Line::from(Span::styled(
                line.clone(),
                Theme::log_style(LogLevel::classify(line)),
            ))
        })
        .collect();

    let title = if state.log_scroll > 0 {
        format!(" Log ({} more below) ", state.log_scroll)
    } else {
        " Log ".to_string()
    };
    let log = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Styles::border_inactive()),
    );
    f.render_widget(log, area);
}
