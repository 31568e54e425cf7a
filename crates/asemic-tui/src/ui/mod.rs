//! UI rendering
//!
//! Rendering functions that draw a [`ViewModel`] into terminal output using
//! ratatui widgets. All functions are pure (no I/O). Every string in the view
//! model is already stripped of terminal control characters.

mod alert;
mod compose;
mod feed;
mod sidebar;
mod status;
mod traffic;

use asemic_app::ViewModel;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::InputState;

const BORDER_SIZE: u16 = 2;

/// Render the entire UI.
pub fn render(frame: &mut Frame, view: &ViewModel, input: &InputState) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 6;
    const COMPOSE_HEIGHT: u16 = 4;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(COMPOSE_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, compose_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, view, *main_area);
    compose::render(frame, &view.compose, input, *compose_area);
    status::render(frame, view, *status_area);

    if let Some(message) = &view.alert {
        alert::render(frame, message, frame.area());
    }
}

/// Render the main area (keys and stats sidebar, then both feeds).
fn render_main_area(frame: &mut Frame, view: &ViewModel, area: Rect) {
    const SIDEBAR_WIDTH: u16 = 28;
    const FEED_MIN_WIDTH: u16 = 30;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(FEED_MIN_WIDTH)])
        .split(area);

    let [sidebar_area, feeds_area] = chunks.as_ref() else {
        return;
    };

    sidebar::render(frame, view, *sidebar_area);

    let feeds = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(*feeds_area);

    let [messages_area, traffic_area] = feeds.as_ref() else {
        return;
    };

    feed::render(frame, &view.messages, *messages_area);
    traffic::render(frame, &view.traffic, *traffic_area);
}

#[cfg(test)]
mod tests {
    use asemic_app::{App, AppEvent, ViewModel};
    use chrono::Utc;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn draw(app: &App) -> String {
        let view = ViewModel::render(app);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, &view, &InputState::new())).unwrap();
        terminal.backend().buffer().content.iter().map(|cell| cell.symbol()).collect()
    }

    fn frame(app: &mut App, payload: &str) {
        app.handle(AppEvent::Frame { payload: payload.to_string(), received_at: Utc::now() });
    }

    #[test]
    fn empty_state_shows_placeholders() {
        let screen = draw(&App::new("http://relay:8080".into()));

        assert!(screen.contains("No keys added."));
        assert!(screen.contains("Waiting for messages..."));
        assert!(screen.contains("Waiting for traffic..."));
    }

    #[test]
    fn state_is_drawn() {
        let mut app = App::new("http://relay:8080".into());
        frame(&mut app, r#"{"event":"KeyUpdate","data":["alpha"]}"#);
        frame(&mut app, r#"{"event":"NewMessage","data":{"timestamp":"2024-05-01T12:30:00Z","sender":"10.0.0.9:4000","decrypted_with_key":"alpha","decrypted_with_pattern":"Sunshine","content":{"type":"Text","payload":"hi there"}}}"#);
        frame(&mut app, r#"{"event":"StatsUpdate","data":{"packets_sent":7,"noise_packets_sent":3,"packets_received":11,"messages_decrypted":1}}"#);

        let screen = draw(&app);

        assert!(screen.contains("alpha"));
        assert!(screen.contains("hi there"));
        assert!(screen.contains("10.0.0.9:4000"));
        assert!(screen.contains("Received: 11"));
    }

    #[test]
    fn alert_overlays_screen() {
        let mut app = App::new("http://relay:8080".into());
        app.send_message();

        let screen = draw(&app);

        assert!(screen.contains("target address is required"));
        assert!(screen.contains("Press any key"));
    }
}
