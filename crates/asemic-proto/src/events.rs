//! Push-channel event envelope.
//!
//! Every frame on the push channel is a JSON object `{ "event": <kind>,
//! "data": <payload> }`. [`PushEvent`] is the closed set of kinds the console
//! understands plus a catch-all for kinds added by newer relays.
//!
//! # Invariants
//!
//! - Decoding never panics. Malformed frames return [`ProtocolError`].
//! - An unrecognised `event` string is not an error: it decodes to
//!   [`PushEvent::Unknown`] so older consoles keep working against newer
//!   relays.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    errors::{ProtocolError, Result},
    model::{Message, NoisePacket, Stats},
};

/// Event delivered over the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum PushEvent {
    /// Complete authoritative state. Supersedes everything received before.
    FullState {
        /// Active keys in insertion order.
        keys: Vec<String>,
        /// Message history, oldest first.
        messages: Vec<Message>,
        /// Current counters.
        stats: Stats,
    },

    /// A newly decrypted message.
    NewMessage(Message),

    /// A packet that failed decryption under every key.
    NoisePacket(NoisePacket),

    /// The complete key set after an add or remove.
    KeyUpdate(Vec<String>),

    /// Latest counters.
    StatsUpdate(Stats),

    /// Event kind this console does not know. Ignored by the router.
    #[serde(skip_serializing)]
    Unknown {
        /// Raw discriminator.
        event: String,
    },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    event: Option<Value>,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct FullStatePayload {
    keys: Vec<String>,
    messages: Vec<Message>,
    stats: Stats,
}

impl PushEvent {
    /// Decode a raw text frame.
    pub fn decode(frame: &str) -> Result<Self> {
        let envelope: Envelope =
            serde_json::from_str(frame).map_err(|e| ProtocolError::Json(e.to_string()))?;

        let Some(Value::String(kind)) = envelope.event else {
            return Err(ProtocolError::MissingEvent);
        };

        let data = envelope.data;
        match kind.as_str() {
            "FullState" => {
                let FullStatePayload { keys, messages, stats } = payload("FullState", data)?;
                Ok(Self::FullState { keys, messages, stats })
            },
            "NewMessage" => payload("NewMessage", data).map(Self::NewMessage),
            "NoisePacket" => payload("NoisePacket", data).map(Self::NoisePacket),
            "KeyUpdate" => payload("KeyUpdate", data).map(Self::KeyUpdate),
            "StatsUpdate" => payload("StatsUpdate", data).map(Self::StatsUpdate),
            _ => Ok(Self::Unknown { event: kind }),
        }
    }

    /// Encode as a text frame. Fails for [`PushEvent::Unknown`].
    pub fn encode(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Event discriminator.
    pub fn kind(&self) -> &str {
        match self {
            Self::FullState { .. } => "FullState",
            Self::NewMessage(_) => "NewMessage",
            Self::NoisePacket(_) => "NoisePacket",
            Self::KeyUpdate(_) => "KeyUpdate",
            Self::StatsUpdate(_) => "StatsUpdate",
            Self::Unknown { event } => event,
        }
    }
}

fn payload<T: DeserializeOwned>(event: &'static str, data: Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| ProtocolError::InvalidPayload { event, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_key_update() {
        let event = PushEvent::decode(r#"{"event":"KeyUpdate","data":["alpha","beta"]}"#).unwrap();
        assert_eq!(event, PushEvent::KeyUpdate(vec!["alpha".into(), "beta".into()]));
    }

    #[test]
    fn decode_noise_packet() {
        let event =
            PushEvent::decode(r#"{"event":"NoisePacket","data":{"sender":"10.0.0.1:7070","size":512}}"#)
                .unwrap();
        let PushEvent::NoisePacket(packet) = event else {
            panic!("expected noise packet");
        };
        assert_eq!(packet.size, 512);
        assert_eq!(packet.sender.port(), 7070);
    }

    #[test]
    fn unknown_kind_is_not_an_error() {
        let event = PushEvent::decode(r#"{"event":"FutureThing","data":{}}"#).unwrap();
        assert_eq!(event, PushEvent::Unknown { event: "FutureThing".into() });
        assert_eq!(event.kind(), "FutureThing");
    }

    #[test]
    fn missing_discriminator() {
        assert_eq!(PushEvent::decode(r#"{"data":{}}"#), Err(ProtocolError::MissingEvent));
        assert_eq!(PushEvent::decode(r#"{"event":7,"data":{}}"#), Err(ProtocolError::MissingEvent));
    }

    #[test]
    fn garbage_is_json_error() {
        assert!(matches!(PushEvent::decode("not json"), Err(ProtocolError::Json(_))));
        assert!(matches!(PushEvent::decode("42"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn wrong_payload_shape() {
        let err = PushEvent::decode(r#"{"event":"StatsUpdate","data":"nope"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload { event: "StatsUpdate", .. }));
    }

    #[test]
    fn unknown_cannot_be_encoded() {
        assert!(PushEvent::Unknown { event: "X".into() }.encode().is_err());
    }
}
