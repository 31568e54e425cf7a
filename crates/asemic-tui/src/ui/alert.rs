//! Alert overlay
//!
//! Blocks the screen until the operator presses a key.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const WIDTH: u16 = 60;
const HEIGHT: u16 = 7;

/// Render `message` in a centered box over `area`.
pub fn render(frame: &mut Frame, message: &str, area: Rect) {
    let width = WIDTH.min(area.width);
    let height = HEIGHT.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Error ")
        .border_style(Style::default().fg(Color::Red));
    let lines = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::styled("Press any key", Style::default().fg(Color::DarkGray)),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), popup);
}
