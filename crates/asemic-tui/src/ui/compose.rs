//! Compose panel
//!
//! One line of form state, one input line with the cursor.

use asemic_app::view::ComposeView;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::InputState;

const PROMPT_WIDTH: u16 = 3; // "> "
const INPUT_LINE_OFFSET_Y: u16 = 2; // border + form line
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the compose form and input line.
pub fn render(frame: &mut Frame, compose: &ComposeView, input: &InputState, area: Rect) {
    let title = if compose.in_flight > 0 {
        format!(" Compose ({} pending) ", compose.in_flight)
    } else {
        " Compose ".to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let dim = Style::default().fg(Color::DarkGray);
    let target = if compose.target.is_empty() { "-" } else { compose.target.as_str() };
    let mut form = vec![
        Span::styled("to ", dim),
        Span::raw(target.to_string()),
        Span::styled("  key ", dim),
        Span::raw(compose.current_key.clone()),
        Span::styled("  pattern ", dim),
        Span::raw(compose.pattern.to_string()),
        Span::styled("  noise ", dim),
        Span::raw(compose.noise_level.to_string()),
    ];
    if let Some(label) = &compose.file_label {
        form.push(Span::styled(format!("  {label}"), Style::default().fg(Color::Yellow)));
    } else if !compose.text.is_empty() {
        form.push(Span::styled(format!("  draft: {}", compose.text), dim));
    }

    let lines = vec![Line::from(form), Line::from(format!("> {}", input.buffer()))];
    frame.render_widget(Paragraph::new(lines).block(block), area);

    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor_offset = (input.cursor() as u16).min(available_width);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
