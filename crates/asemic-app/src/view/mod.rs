//! Pure projection from [`App`] to what the operator sees.
//!
//! [`ViewModel::render`] builds the whole view; [`ViewModel::refresh`]
//! rebuilds only the regions an event touched, and must agree with a full
//! render of the same state. Every string taken from the relay is passed
//! through [`codec::sanitize_terminal`] here, so a frontend can draw the
//! model as-is. The markup projection in [`html`] escapes on top of that.

mod html;

pub use html::Html;

use asemic_proto::{
    Endpoint, Message, MessageContent, NoiseLevel, ObfuscationPattern, Stats, TrafficRecord, codec,
};
use chrono::{DateTime, Utc};

use crate::{App, ConnectionState, Regions};

/// Shown in the key list when the relay has no keys.
pub const NO_KEYS_PLACEHOLDER: &str = "No keys added.";
/// Shown in the message feed while it is empty.
pub const NO_MESSAGES_PLACEHOLDER: &str = "Waiting for messages...";
/// Shown in the traffic feed while it is empty.
pub const NO_TRAFFIC_PLACEHOLDER: &str = "Waiting for traffic...";
/// Label of every traffic record.
pub const NOISE_LABEL: &str = "Noise/Undecrypted";

const TIME_FORMAT: &str = "%H:%M:%S";

/// Visual class of the connection indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Handshake in progress.
    Connecting,
    /// Channel open.
    Connected,
    /// Waiting to reconnect.
    Disconnected,
}

impl StatusClass {
    /// CSS class name.
    pub fn css(self) -> &'static str {
        match self {
            Self::Connecting => "status-connecting",
            Self::Connected => "status-connected",
            Self::Disconnected => "status-disconnected",
        }
    }
}

/// Connection indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// Indicator text.
    pub text: &'static str,
    /// Indicator class.
    pub class: StatusClass,
    /// Relay address.
    pub server: String,
    /// False while showing state from a previous connection.
    pub synced: bool,
}

/// One entry of the key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    /// Key identifier.
    pub name: String,
    /// Whether this is the compose selection.
    pub selected: bool,
}

/// Key list region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysView {
    /// Keys in relay order.
    pub entries: Vec<KeyEntry>,
    /// Placeholder when `entries` is empty.
    pub placeholder: Option<&'static str>,
}

/// A feed with an empty-state placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView<T> {
    /// Items, newest first.
    pub items: Vec<T>,
    /// Placeholder when `items` is empty.
    pub placeholder: Option<&'static str>,
}

impl<T> FeedView<T> {
    fn new(items: Vec<T>, placeholder: &'static str) -> Self {
        let placeholder = items.is_empty().then_some(placeholder);
        Self { items, placeholder }
    }
}

/// Body of a feed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Text message.
    Text(String),
    /// File attachment.
    File {
        /// Sender-chosen file name.
        filename: String,
        /// Download path, when the relay assigned an id.
        href: Option<String>,
    },
}

/// One message in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    /// 1-based feed position, used to address downloads.
    pub position: usize,
    /// Decryption time, `HH:MM:SS` UTC.
    pub time: String,
    /// Sender address.
    pub sender: String,
    /// Key that decrypted it.
    pub key: String,
    /// Pattern it was decoded with.
    pub pattern: ObfuscationPattern,
    /// Body.
    pub body: MessageBody,
}

/// One traffic observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficView {
    /// Arrival time, `HH:MM:SS` UTC.
    pub time: String,
    /// Sender address.
    pub sender: String,
    /// Packet size in bytes.
    pub size: u64,
}

/// Compose form and controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeView {
    /// Destination address.
    pub target: String,
    /// Selected key, or `"None"`.
    pub current_key: String,
    /// Outgoing pattern.
    pub pattern: ObfuscationPattern,
    /// Message text.
    pub text: String,
    /// `"Selected: <name>"` while a file is attached.
    pub file_label: Option<String>,
    /// Confirmed noise level.
    pub noise_level: NoiseLevel,
    /// Commands awaiting an outcome.
    pub in_flight: usize,
}

/// Complete view of the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Connection indicator.
    pub status: StatusView,
    /// Key list.
    pub keys: KeysView,
    /// Message feed.
    pub messages: FeedView<MessageView>,
    /// Traffic feed.
    pub traffic: FeedView<TrafficView>,
    /// Relay counters.
    pub stats: Stats,
    /// Compose form.
    pub compose: ComposeView,
    /// Status line.
    pub notice: Option<String>,
    /// Modal alert.
    pub alert: Option<String>,
}

impl ViewModel {
    /// Project the whole application state.
    pub fn render(app: &App) -> Self {
        Self {
            status: status_view(app),
            keys: keys_view(app),
            messages: messages_view(app),
            traffic: traffic_view(app),
            stats: app.store().stats(),
            compose: compose_view(app),
            notice: app.status_message().map(codec::sanitize_terminal),
            alert: app.alert().map(codec::sanitize_terminal),
        }
    }

    /// Rebuild only `regions`.
    pub fn refresh(&mut self, app: &App, regions: Regions) {
        if regions.contains(Regions::STATUS) {
            self.status = status_view(app);
            self.notice = app.status_message().map(codec::sanitize_terminal);
        }
        if regions.contains(Regions::KEYS) {
            self.keys = keys_view(app);
        }
        if regions.contains(Regions::MESSAGES) {
            self.messages = messages_view(app);
        }
        if regions.contains(Regions::TRAFFIC) {
            self.traffic = traffic_view(app);
        }
        if regions.contains(Regions::STATS) {
            self.stats = app.store().stats();
        }
        if regions.contains(Regions::COMPOSE) {
            self.compose = compose_view(app);
        }
        if regions.contains(Regions::ALERT) {
            self.alert = app.alert().map(codec::sanitize_terminal);
        }
    }
}

fn status_view(app: &App) -> StatusView {
    let (text, class) = match app.connection_state() {
        ConnectionState::Connecting => ("Connecting...", StatusClass::Connecting),
        ConnectionState::Connected => ("Connected", StatusClass::Connected),
        ConnectionState::Disconnected => ("Disconnected. Retrying...", StatusClass::Disconnected),
    };
    StatusView {
        text,
        class,
        server: codec::sanitize_terminal(app.server()),
        synced: app.store().is_synced(),
    }
}

fn keys_view(app: &App) -> KeysView {
    let selected = app.compose().selected_key.as_deref();
    let entries: Vec<_> = app
        .store()
        .keys()
        .iter()
        .map(|k| KeyEntry { name: codec::sanitize_terminal(k), selected: selected == Some(k) })
        .collect();
    let placeholder = entries.is_empty().then_some(NO_KEYS_PLACEHOLDER);
    KeysView { entries, placeholder }
}

fn messages_view(app: &App) -> FeedView<MessageView> {
    let items = app
        .store()
        .messages()
        .iter()
        .enumerate()
        .map(|(i, m)| message_view(i + 1, m))
        .collect();
    FeedView::new(items, NO_MESSAGES_PLACEHOLDER)
}

fn message_view(position: usize, message: &Message) -> MessageView {
    let body = match &message.content {
        MessageContent::Text(text) => MessageBody::Text(codec::sanitize_terminal(text)),
        MessageContent::File(file) => MessageBody::File {
            filename: codec::sanitize_terminal(&file.filename),
            href: file.id.map(|id| Endpoint::Download(id).path()),
        },
    };
    MessageView {
        position,
        time: clock(message.timestamp),
        sender: message.sender.to_string(),
        key: codec::sanitize_terminal(&message.decrypted_with_key),
        pattern: message.decrypted_with_pattern,
        body,
    }
}

fn traffic_view(app: &App) -> FeedView<TrafficView> {
    let items = app.store().traffic().iter().map(traffic_row).collect();
    FeedView::new(items, NO_TRAFFIC_PLACEHOLDER)
}

fn traffic_row(record: &TrafficRecord) -> TrafficView {
    TrafficView {
        time: clock(record.received_at),
        sender: record.sender.to_string(),
        size: record.size,
    }
}

fn compose_view(app: &App) -> ComposeView {
    let form = app.compose();
    ComposeView {
        target: codec::sanitize_terminal(&form.target),
        current_key: form
            .selected_key
            .as_deref()
            .map_or_else(|| "None".to_string(), codec::sanitize_terminal),
        pattern: form.pattern,
        text: codec::sanitize_terminal(&form.text),
        file_label: form
            .attachment
            .as_ref()
            .map(|a| format!("Selected: {}", codec::sanitize_terminal(&a.filename))),
        noise_level: app.noise_level(),
        in_flight: app.in_flight(),
    }
}

fn clock(at: DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}
