//! Request/response command path.
//!
//! Commands travel over plain HTTP with JSON bodies, independent of the push
//! channel. A 2xx response only means the relay accepted the request; the
//! resulting state change is confirmed later by a push event.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{NoiseLevel, ObfuscationPattern};

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

/// Relay HTTP endpoints used by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /keys`
    AddKey,
    /// `DELETE /keys`
    RemoveKey,
    /// `POST /config/noise`
    SetNoise,
    /// `POST /send`
    Send,
    /// `GET /download/{id}`
    Download(Uuid),
}

impl Endpoint {
    /// Path of the push channel upgrade endpoint.
    pub const PUSH_CHANNEL_PATH: &'static str = "/ws";

    /// HTTP method.
    pub fn method(self) -> Method {
        match self {
            Self::AddKey | Self::SetNoise | Self::Send => Method::Post,
            Self::RemoveKey => Method::Delete,
            Self::Download(_) => Method::Get,
        }
    }

    /// Request path relative to the relay root.
    pub fn path(self) -> String {
        match self {
            Self::AddKey | Self::RemoveKey => "/keys".to_string(),
            Self::SetNoise => "/config/noise".to_string(),
            Self::Send => "/send".to_string(),
            Self::Download(id) => format!("/download/{id}"),
        }
    }
}

/// Body of `POST /keys` and `DELETE /keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRequest {
    /// Key identifier.
    pub key: String,
}

/// Body of `POST /config/noise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseRequest {
    /// New emission level.
    pub level: NoiseLevel,
}

/// File payload of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingFile {
    /// File name shown to the receiver.
    pub filename: String,
    /// Base64 file bytes.
    pub data: String,
}

/// Body of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutgoingContent {
    /// Plain text.
    Text(String),
    /// Encoded file.
    File(OutgoingFile),
}

/// Body of `POST /send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Destination `host:port`; resolved by the relay.
    pub target_addr: String,
    /// Key to encrypt with.
    pub key: String,
    /// Obfuscation pattern.
    pub pattern: ObfuscationPattern,
    /// Message body.
    pub content: OutgoingContent,
}
