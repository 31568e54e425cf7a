//! Traffic feed
//!
//! Noise packets the relay could not decrypt, newest first.

use asemic_app::view::{FeedView, NOISE_LABEL, TrafficView};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::BORDER_SIZE;

/// Render the traffic feed.
pub fn render(frame: &mut Frame, feed: &FeedView<TrafficView>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Traffic ");

    let items: Vec<ListItem> = match feed.placeholder {
        Some(placeholder) => vec![ListItem::new(Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        )))],
        None => feed
            .items
            .iter()
            .take(usize::from(area.height.saturating_sub(BORDER_SIZE)))
            .map(|row| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!(
                        "[{}] RECV from {} | {} bytes | ",
                        row.time, row.sender, row.size
                    )),
                    Span::styled(NOISE_LABEL, Style::default().fg(Color::Magenta)),
                ]))
            })
            .collect(),
    };

    frame.render_widget(List::new(items).block(block), area);
}
