//! Transport setup errors.

use thiserror::Error;

/// Failures setting up a transport.
///
/// Failures of individual commands are [`asemic_app::CommandError`]s, and a
/// channel that dies after opening reports through its event stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The relay URL cannot be used.
    #[error("invalid relay url: {0}")]
    InvalidUrl(String),

    /// WebSocket handshake failed.
    #[error("push channel handshake failed: {0}")]
    Handshake(String),

    /// HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    Client(String),
}
