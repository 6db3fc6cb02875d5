//! Title, status line and navigation bar

use crate::components::keybindings::NavBarItem;
use crate::theme::{Colors, Styles};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render_title(f: &mut Frame, area: Rect, title: &str) {
    let title_widget = Paragraph::new(Line::from(Span::styled(title.to_string(), Styles::title())))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active()),
        )
        .alignment(Alignment::Center);
    f.render_widget(title_widget, area);
}

pub fn render_status(f: &mut Frame, area: Rect, status: &str, running: bool) {
    let style = if running {
        Style::default().fg(Colors::SECONDARY)
    } else {
        Style::default().fg(Colors::FG_SECONDARY)
    };
    let marker = if running { "* " } else { "  " };
    let widget = Paragraph::new(Line::from(vec![
        Span::styled(marker, style),
        Span::styled(status.to_string(), style),
    ]));
    f.render_widget(widget, area);
}

pub fn render_nav_bar(f: &mut Frame, area: Rect, items: &[NavBarItem]) {
    let mut spans = Vec::with_capacity(items.len() * 3);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Styles::nav_hint()));
        }
        spans.push(Span::styled(
            item.key_display.clone(),
            Style::default().fg(Colors::PRIMARY),
        ));
        spans.push(Span::styled(
            format!(" {}", item.action_label),
            Styles::nav_hint(),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
