//! Application state machine.
//!
//! [`App`] owns everything the console knows: the mirror of relay state, the
//! client-local compose form, commands awaiting an outcome, and what the
//! operator is being told. It consumes [`AppEvent`]s and exposes an operator
//! API; both return [`AppAction`]s for the runtime to execute. No I/O.
//!
//! Commands never mutate local state optimistically. A successful response
//! only clears the compose form or updates the noise control; keys and
//! messages change when the push channel says so.

use asemic_proto::{MessageContent, NoiseLevel, ObfuscationPattern};

use crate::{
    AppAction, AppEvent, Attachment, Command, CommandOutcome, CommandTracker, ComposeForm,
    ConnectionState, EventRouter, Regions, StateStore, ValidationError,
};

/// Application state machine.
#[derive(Debug, Clone)]
pub struct App {
    /// Push channel state as last reported by the runtime.
    connection: ConnectionState,
    /// Relay address shown in the status bar.
    server: String,
    /// Mirror of relay state.
    store: StateStore,
    /// Frame decoder and counters.
    router: EventRouter,
    /// Outgoing message form.
    compose: ComposeForm,
    /// Submitted commands awaiting an outcome.
    commands: CommandTracker,
    /// Noise level last confirmed by the relay.
    noise_level: NoiseLevel,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status line. `None` if nothing to say.
    status_message: Option<String>,
    /// Pending blocking notification. `None` if dismissed.
    alert: Option<String>,
}

impl App {
    /// Create an App for the relay at `server`.
    pub fn new(server: String) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            server,
            store: StateStore::new(),
            router: EventRouter::new(),
            compose: ComposeForm::default(),
            commands: CommandTracker::new(),
            noise_level: NoiseLevel::default(),
            terminal_size: (80, 24),
            status_message: None,
            alert: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render(Regions::ALL)]
            },
            AppEvent::Connecting => {
                self.connection = ConnectionState::Connecting;
                vec![AppAction::Render(Regions::STATUS)]
            },
            AppEvent::Connected => {
                self.connection = ConnectionState::Connected;
                vec![AppAction::Render(Regions::STATUS)]
            },
            AppEvent::Disconnected { retry_in } => {
                tracing::debug!(?retry_in, "mirror stale until next full state");
                self.connection = ConnectionState::Disconnected;
                self.store.mark_stale();
                vec![AppAction::Render(Regions::STATUS)]
            },
            AppEvent::Frame { payload, received_at } => {
                let was_synced = self.store.is_synced();
                let mut regions = self.router.route(&mut self.store, &payload, received_at);
                if self.store.is_synced() != was_synced {
                    regions |= Regions::STATUS;
                }
                if regions.contains(Regions::KEYS) {
                    if self.compose.retain_selection(self.store.keys()) {
                        tracing::debug!("selected key removed by relay");
                    }
                    regions |= Regions::COMPOSE;
                }

                if regions.is_empty() { vec![] } else { vec![AppAction::Render(regions)] }
            },
            AppEvent::CommandCompleted(outcome) => self.complete(outcome),
        }
    }

    fn complete(&mut self, outcome: CommandOutcome) -> Vec<AppAction> {
        let Some(command) = self.commands.finish(outcome.id) else {
            tracing::warn!(id = outcome.id, "outcome for unknown command");
            return vec![];
        };

        match outcome.result {
            Ok(()) => {
                tracing::info!(command = %command.describe(), "command accepted");
                self.confirm(command);
                vec![AppAction::Render(Regions::STATUS | Regions::COMPOSE)]
            },
            Err(error) => {
                tracing::warn!(command = %command.describe(), %error, "command failed");
                let message = error.to_string();
                self.status_message = Some(format!("Failed to {}", command.describe()));
                self.alert = Some(message.clone());
                vec![
                    AppAction::Notify { message },
                    AppAction::Render(Regions::STATUS | Regions::COMPOSE | Regions::ALERT),
                ]
            },
        }
    }

    fn confirm(&mut self, command: Command) {
        let status = match command {
            Command::AddKey { key } => format!("Key {key} submitted"),
            Command::RemoveKey { key } => format!("Key {key} removal submitted"),
            Command::SetNoiseLevel { level } => {
                self.noise_level = level;
                format!("Noise level set to {level}")
            },
            Command::SendMessage(req) => {
                self.compose.clear_content();
                format!("Message queued for {}", req.target_addr)
            },
            Command::FetchFile { filename, .. } => format!("Saved {filename}"),
        };
        self.status_message = Some(status);
    }

    fn submit(&mut self, command: Command) -> Vec<AppAction> {
        tracing::debug!(command = %command.describe(), "submitting command");
        let id = self.commands.begin(command.clone());
        vec![AppAction::Submit { id, command }, AppAction::Render(Regions::COMPOSE)]
    }

    fn reject(&mut self, error: ValidationError) -> Vec<AppAction> {
        tracing::debug!(%error, "command rejected locally");
        let message = error.to_string();
        self.alert = Some(message.clone());
        vec![AppAction::Notify { message }, AppAction::Render(Regions::ALERT)]
    }

    fn validated(&mut self, command: Result<Command, ValidationError>) -> Vec<AppAction> {
        match command {
            Ok(command) => self.submit(command),
            Err(error) => self.reject(error),
        }
    }

    /// Ask the relay to add a key. Blank input is rejected locally.
    pub fn add_key(&mut self, raw: &str) -> Vec<AppAction> {
        let command = Command::add_key(raw);
        self.validated(command)
    }

    /// Ask the relay to remove a key.
    pub fn remove_key(&mut self, key: &str) -> Vec<AppAction> {
        let command = Command::remove_key(key);
        self.validated(command)
    }

    /// Ask the relay to change the noise level. The control only moves once
    /// the relay accepts.
    pub fn set_noise_level(&mut self, level: NoiseLevel) -> Vec<AppAction> {
        self.submit(Command::SetNoiseLevel { level })
    }

    /// Send the compose form.
    pub fn send_message(&mut self) -> Vec<AppAction> {
        let command = self.compose.build_command();
        self.validated(command)
    }

    /// Download the file at 1-based `position` in the message feed.
    pub fn fetch_file(&mut self, position: usize) -> Vec<AppAction> {
        let file = position
            .checked_sub(1)
            .and_then(|i| self.store.messages().get(i))
            .and_then(|m| match &m.content {
                MessageContent::File(f) => f.id.map(|id| (id, f.filename.clone())),
                MessageContent::Text(_) => None,
            });

        match file {
            Some((id, filename)) => self.submit(Command::FetchFile { id, filename }),
            None => self.reject(ValidationError::NoSuchFile),
        }
    }

    /// Select the key to send with. Must be a key the relay reported.
    pub fn select_key(&mut self, key: &str) -> Vec<AppAction> {
        if self.store.contains_key(key) {
            self.compose.selected_key = Some(key.to_string());
        } else {
            self.status_message = Some(format!("Unknown key: {key}"));
        }
        vec![AppAction::Render(Regions::KEYS | Regions::COMPOSE | Regions::STATUS)]
    }

    /// Move the selection to the next key, wrapping around.
    pub fn cycle_key(&mut self) -> Vec<AppAction> {
        let keys = self.store.keys();
        if keys.is_empty() {
            return vec![];
        }

        let next = self
            .compose
            .selected_key
            .as_ref()
            .and_then(|k| keys.iter().position(|x| x == k))
            .map_or(0, |i| (i + 1) % keys.len());
        self.compose.selected_key = keys.get(next).cloned();

        vec![AppAction::Render(Regions::KEYS | Regions::COMPOSE)]
    }

    /// Set the destination address.
    pub fn set_target(&mut self, target: &str) -> Vec<AppAction> {
        self.compose.target = target.trim().to_string();
        vec![AppAction::Render(Regions::COMPOSE)]
    }

    /// Set the obfuscation pattern for outgoing messages.
    pub fn set_pattern(&mut self, pattern: ObfuscationPattern) -> Vec<AppAction> {
        self.compose.pattern = pattern;
        vec![AppAction::Render(Regions::COMPOSE)]
    }

    /// Replace the message text.
    pub fn set_text(&mut self, text: &str) -> Vec<AppAction> {
        self.compose.text = text.to_string();
        vec![AppAction::Render(Regions::COMPOSE)]
    }

    /// Attach a file. Clears the message text.
    pub fn attach_file(&mut self, attachment: Attachment) -> Vec<AppAction> {
        self.compose.attach(attachment);
        vec![AppAction::Render(Regions::COMPOSE)]
    }

    /// Remove the attached file.
    pub fn detach_file(&mut self) -> Vec<AppAction> {
        self.compose.attachment = None;
        vec![AppAction::Render(Regions::COMPOSE)]
    }

    /// Dismiss the pending alert, if any.
    pub fn dismiss_alert(&mut self) -> Vec<AppAction> {
        match self.alert.take() {
            Some(_) => vec![AppAction::Render(Regions::ALERT)],
            None => vec![],
        }
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set a status message to display to the operator.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Push channel state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Relay address.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Mirror of relay state.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Frame routing counters.
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Outgoing message form.
    pub fn compose(&self) -> &ComposeForm {
        &self.compose
    }

    /// Number of commands awaiting an outcome.
    pub fn in_flight(&self) -> usize {
        self.commands.in_flight()
    }

    /// Confirmed noise level.
    pub fn noise_level(&self) -> NoiseLevel {
        self.noise_level
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Current status line, if any.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Pending alert, if any.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::CommandError;

    fn frame(app: &mut App, payload: &str) -> Vec<AppAction> {
        app.handle(AppEvent::Frame { payload: payload.to_string(), received_at: Utc::now() })
    }

    fn submitted(actions: &[AppAction]) -> Option<(u64, Command)> {
        actions.iter().find_map(|a| match a {
            AppAction::Submit { id, command } => Some((*id, command.clone())),
            _ => None,
        })
    }

    #[test]
    fn key_update_renders_keys_and_compose() {
        let mut app = App::new("relay:8080".into());
        let actions = frame(&mut app, r#"{"event":"KeyUpdate","data":["a","b"]}"#);
        assert_eq!(actions, vec![AppAction::Render(Regions::KEYS | Regions::COMPOSE)]);
    }

    #[test]
    fn unknown_frame_produces_no_actions() {
        let mut app = App::new("relay:8080".into());
        assert!(frame(&mut app, r#"{"event":"FutureThing","data":{}}"#).is_empty());
        assert!(frame(&mut app, "garbage").is_empty());
    }

    #[test]
    fn blank_key_is_rejected_without_submit() {
        let mut app = App::new("relay:8080".into());
        let actions = app.add_key("   ");

        assert!(submitted(&actions).is_none());
        assert!(matches!(actions.first(), Some(AppAction::Notify { .. })));
        assert_eq!(app.alert(), Some("key must not be empty"));
        assert_eq!(app.in_flight(), 0);
    }

    #[test]
    fn noise_control_moves_only_on_success() {
        let mut app = App::new("relay:8080".into());

        let (id, _) = submitted(&app.set_noise_level(NoiseLevel::Fast)).unwrap();
        assert_eq!(app.noise_level(), NoiseLevel::Off);
        app.handle(AppEvent::CommandCompleted(CommandOutcome {
            id,
            result: Err(CommandError::Transport("refused".into())),
        }));
        assert_eq!(app.noise_level(), NoiseLevel::Off);

        let (id, _) = submitted(&app.set_noise_level(NoiseLevel::Fast)).unwrap();
        app.handle(AppEvent::CommandCompleted(CommandOutcome { id, result: Ok(()) }));
        assert_eq!(app.noise_level(), NoiseLevel::Fast);
    }

    #[test]
    fn failure_surfaces_body_and_keeps_form() {
        let mut app = App::new("relay:8080".into());
        frame(&mut app, r#"{"event":"KeyUpdate","data":["k"]}"#);
        app.select_key("k");
        app.set_target("10.0.0.1:9000");
        app.set_text("hello");

        let (id, _) = submitted(&app.send_message()).unwrap();
        let actions = app.handle(AppEvent::CommandCompleted(CommandOutcome {
            id,
            result: Err(CommandError::Http { status: 400, body: "bad key".into() }),
        }));

        assert_eq!(actions.first(), Some(&AppAction::Notify {
            message: "API error (400): bad key".into()
        }));
        assert_eq!(app.compose().text, "hello");
        assert_eq!(app.compose().selected_key.as_deref(), Some("k"));
    }

    #[test]
    fn cycle_key_wraps() {
        let mut app = App::new("relay:8080".into());
        frame(&mut app, r#"{"event":"KeyUpdate","data":["a","b"]}"#);

        app.cycle_key();
        assert_eq!(app.compose().selected_key.as_deref(), Some("a"));
        app.cycle_key();
        assert_eq!(app.compose().selected_key.as_deref(), Some("b"));
        app.cycle_key();
        assert_eq!(app.compose().selected_key.as_deref(), Some("a"));
    }

    #[test]
    fn fetch_file_needs_a_file_at_position() {
        let mut app = App::new("relay:8080".into());
        frame(
            &mut app,
            r#"{"event":"NewMessage","data":{"id":null,"timestamp":"2024-05-01T10:00:00Z","sender":"10.0.0.9:4000","decrypted_with_key":"k","decrypted_with_pattern":"Sunshine","content":{"type":"File","payload":{"filename":"a.txt","id":"6f9619ff-8b86-d011-b42d-00c04fc964ff"}}}}"#,
        );

        assert!(submitted(&app.fetch_file(0)).is_none());
        assert!(submitted(&app.fetch_file(2)).is_none());
        let (_, command) = submitted(&app.fetch_file(1)).unwrap();
        assert!(matches!(command, Command::FetchFile { filename, .. } if filename == "a.txt"));
    }

    #[test]
    fn disconnect_marks_mirror_stale() {
        let mut app = App::new("relay:8080".into());
        frame(&mut app, r#"{"event":"FullState","data":{"keys":[],"messages":[],"stats":{"packets_sent":0,"noise_packets_sent":0,"packets_received":0,"messages_decrypted":0}}}"#);
        assert!(app.store().is_synced());

        app.handle(AppEvent::Disconnected { retry_in: crate::DEFAULT_RECONNECT_DELAY });
        assert!(!app.store().is_synced());
        assert_eq!(app.connection_state(), ConnectionState::Disconnected);
    }
}
