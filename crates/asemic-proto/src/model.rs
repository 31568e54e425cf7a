//! Server-owned state as seen by the console.
//!
//! These are the payload types carried by push events. The console never
//! decrypts anything: messages arrive already decrypted and noise packets are
//! opaque observations.

use std::{fmt, net::SocketAddr, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Obfuscation pattern a message was sent or decrypted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObfuscationPattern {
    /// Default pattern.
    #[default]
    Sunshine,
    /// Alternate pattern.
    Starfall,
}

impl ObfuscationPattern {
    /// All patterns in display order.
    pub const ALL: [Self; 2] = [Self::Sunshine, Self::Starfall];

    /// Wire name of the pattern.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunshine => "Sunshine",
            Self::Starfall => "Starfall",
        }
    }
}

impl fmt::Display for ObfuscationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObfuscationPattern {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant { kind: "pattern", input: s.to_string() })
    }
}

/// Rate at which the relay emits cover traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NoiseLevel {
    /// No cover traffic.
    #[default]
    Off,
    /// Low rate.
    Slow,
    /// Medium rate.
    Medium,
    /// High rate.
    Fast,
}

impl NoiseLevel {
    /// All levels bound to the noise control, in display order.
    pub const ALL: [Self; 4] = [Self::Off, Self::Slow, Self::Medium, Self::Fast];

    /// Wire name of the level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Slow => "Slow",
            Self::Medium => "Medium",
            Self::Fast => "Fast",
        }
    }
}

impl fmt::Display for NoiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant { kind: "noise level", input: s.to_string() })
    }
}

/// Operator input that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {input}")]
pub struct UnknownVariant {
    /// What was being parsed.
    pub kind: &'static str,
    /// Raw input.
    pub input: String,
}

/// Received file attachment.
///
/// The push channel normally omits `data`; the bytes are fetched on demand
/// through the download endpoint using `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Original file name as chosen by the sender. Untrusted.
    pub filename: String,
    /// Server-side identifier for download.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Base64 file bytes, when inlined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Decrypted message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum MessageContent {
    /// Plain text. Untrusted.
    Text(String),
    /// File attachment.
    File(FileAttachment),
}

/// A message the relay decrypted under one of the active keys.
///
/// Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned message id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Time the relay decrypted the message.
    pub timestamp: DateTime<Utc>,
    /// Peer the packet came from.
    pub sender: SocketAddr,
    /// Key that decrypted the message. Untrusted (operator supplied).
    pub decrypted_with_key: String,
    /// Pattern the message was decoded with.
    pub decrypted_with_pattern: ObfuscationPattern,
    /// Message body.
    pub content: MessageContent,
}

/// Inbound packet that failed decryption under every key and pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoisePacket {
    /// Peer the packet came from.
    pub sender: SocketAddr,
    /// Datagram size in bytes.
    pub size: u64,
}

impl NoisePacket {
    /// Stamp this observation with its arrival time.
    pub fn received(self, received_at: DateTime<Utc>) -> TrafficRecord {
        TrafficRecord { sender: self.sender, size: self.size, received_at }
    }
}

/// Noise packet observation as held by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficRecord {
    /// Peer the packet came from.
    pub sender: SocketAddr,
    /// Datagram size in bytes.
    pub size: u64,
    /// Time the console received the observation.
    pub received_at: DateTime<Utc>,
}

/// Relay counters. Monotonically non-decreasing, owned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Packets transmitted.
    pub packets_sent: u64,
    /// Cover-traffic packets transmitted.
    pub noise_packets_sent: u64,
    /// Packets received.
    pub packets_received: u64,
    /// Received packets that decrypted to a message.
    pub messages_decrypted: u64,
}
