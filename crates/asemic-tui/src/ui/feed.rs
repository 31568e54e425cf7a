//! Message feed
//!
//! Newest message first. Each row is numbered so `/save N` can name it.

use asemic_app::view::{FeedView, MessageBody, MessageView};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::BORDER_SIZE;

/// Render the message feed.
pub fn render(frame: &mut Frame, feed: &FeedView<MessageView>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Messages ");

    let items: Vec<ListItem> = match feed.placeholder {
        Some(placeholder) => vec![ListItem::new(Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        )))],
        None => feed.items.iter().map(message_item).collect(),
    };

    let visible = usize::from(area.height.saturating_sub(BORDER_SIZE));
    let items: Vec<_> = items.into_iter().take(visible).collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn message_item(message: &MessageView) -> ListItem<'static> {
    let header = vec![
        Span::styled(format!("{:>3} ", message.position), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("[{}] ", message.time)),
        Span::styled(
            message.sender.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({} / {}) ", message.key, message.pattern),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let body = match &message.body {
        MessageBody::Text(text) => Span::raw(text.clone()),
        MessageBody::File { filename, href: Some(_) } => Span::styled(
            format!("[file] {filename} (/save {})", message.position),
            Style::default().fg(Color::Yellow),
        ),
        MessageBody::File { filename, href: None } => {
            Span::styled(format!("[file] {filename}"), Style::default().fg(Color::Yellow))
        },
    };

    let mut spans = header;
    spans.push(body);
    ListItem::new(Line::from(spans))
}
