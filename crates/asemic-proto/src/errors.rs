//! Error types for decoding push-channel frames.
//!
//! Decoding never panics. Every malformed input maps to a [`ProtocolError`]
//! so the caller can log and drop the frame without touching channel health.

use thiserror::Error;

/// Errors produced while decoding a push-channel frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is not valid JSON.
    #[error("malformed frame: {0}")]
    Json(String),

    /// Envelope has no string `event` discriminator.
    #[error("missing event discriminator")]
    MissingEvent,

    /// Known event kind whose payload does not match the expected shape.
    #[error("invalid {event} payload: {reason}")]
    InvalidPayload {
        /// Event kind that failed to decode.
        event: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// Attachment data is not valid base64.
    #[error("invalid attachment encoding: {0}")]
    Attachment(String),
}

/// Convenience alias for decoding results.
pub type Result<T> = std::result::Result<T, ProtocolError>;
