//! Keys and stats sidebar

use asemic_app::ViewModel;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

const STATS_HEIGHT: u16 = 6;

/// Render the key list above the relay counters.
pub fn render(frame: &mut Frame, view: &ViewModel, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(STATS_HEIGHT)])
        .split(area);

    let [keys_area, stats_area] = chunks.as_ref() else {
        return;
    };

    render_keys(frame, view, *keys_area);
    render_stats(frame, view, *stats_area);
}

fn render_keys(frame: &mut Frame, view: &ViewModel, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Keys ");

    let items: Vec<ListItem> = match view.keys.placeholder {
        Some(placeholder) => vec![ListItem::new(Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        )))],
        None => view
            .keys
            .entries
            .iter()
            .map(|entry| {
                let (marker, style) = if entry.selected {
                    ("> ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                } else {
                    ("  ", Style::default())
                };
                ListItem::new(Line::from(Span::styled(format!("{marker}{}", entry.name), style)))
            })
            .collect(),
    };

    frame.render_widget(List::new(items).block(block), area);
}

fn render_stats(frame: &mut Frame, view: &ViewModel, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Stats ");
    let stats = view.stats;

    let lines = vec![
        Line::from(format!("Sent: {}", stats.packets_sent)),
        Line::from(format!("Noise: {}", stats.noise_packets_sent)),
        Line::from(format!("Received: {}", stats.packets_received)),
        Line::from(format!("Decrypted: {}", stats.messages_decrypted)),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
