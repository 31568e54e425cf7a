//! Status bar

use asemic_app::{ViewModel, view::StatusClass};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, view: &ViewModel, area: Rect) {
    let status = &view.status;
    let color = match status.class {
        StatusClass::Connected => Color::Green,
        StatusClass::Connecting => Color::Yellow,
        StatusClass::Disconnected => Color::Red,
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", status.text), Style::default().fg(Color::Black).bg(color)),
        Span::raw(format!(" {}", status.server)),
    ];
    if !status.synced {
        spans.push(Span::styled(" (stale)", Style::default().fg(Color::DarkGray)));
    }
    if let Some(notice) = &view.notice {
        spans.push(Span::raw(format!(" | {notice}")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
