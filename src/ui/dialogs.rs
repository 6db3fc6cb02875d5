//! Yes/no confirmation dialogs drawn over the main screen

use crate::app::{AppMode, AppState};
use crate::theme::{Colors, Styles, UiConstants, UiText};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Render whichever dialog the current mode calls for
pub fn render_dialog(f: &mut Frame, state: &AppState) {
    match state.mode {
        AppMode::ConfirmInstall => {
            let Some(pending) = state.pending_install.as_ref() else {
                return;
            };
            let file_name = pending
                .wheel
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let message = vec![
                format!(
                    "Do you want to install the universal wheel for {} now?",
                    pending.base
                ),
                String::new(),
                file_name,
            ];
            render_confirm(f, " Install Universal Wheel ", &message, state.dialog_yes, Colors::PRIMARY);
        }
        AppMode::ConfirmExit => {
            let mut message = vec!["Are you sure you want to exit?".to_string()];
            if state.is_running() {
                message.push(String::new());
                message.push("The running build will be stopped.".to_string());
            }
            render_confirm(f, " Exit ", &message, state.dialog_yes, Colors::WARNING);
        }
        AppMode::Form | AppMode::Running => {}
    }
}

fn render_confirm(
    f: &mut Frame,
    title: &str,
    message: &[String],
    yes_selected: bool,
    accent: Color,
) {
    let area = centered_rect(UiConstants::DIALOG_WIDTH, UiConstants::DIALOG_HEIGHT, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(accent))
        .style(Styles::panel_bg());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let lines: Vec<Line> = message
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), Styles::text())))
        .collect();
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[0],
    );

    let (yes_style, no_style) = if yes_selected {
        (Styles::button_confirm(), Styles::button_inactive())
    } else {
        (Styles::button_inactive(), Styles::button_cancel())
    };
    let buttons = Line::from(vec![
        Span::styled(UiText::BTN_YES, yes_style),
        Span::raw("    "),
        Span::styled(UiText::BTN_NO, no_style),
    ]);
    f.render_widget(
        Paragraph::new(buttons).alignment(Alignment::Center),
        chunks[1],
    );
}

/// Rectangle of at most `width` x `height` centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
