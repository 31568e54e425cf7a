//! Network adapters for the relay console.
//!
//! Thin I/O layers around the sans-IO core in `asemic-app`:
//!
//! - [`channel`]: the WebSocket push channel, surfaced as a stream of
//!   [`asemic_app::ChannelEvent`]s
//! - [`http`]: the [`CommandClient`] for the request/response command path
//!
//! Neither retries anything. Reconnection is decided by
//! [`asemic_app::ConnectionManager`]; command retries are up to the operator.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod channel;
pub mod error;
pub mod http;

pub use channel::{DEFAULT_HANDSHAKE_TIMEOUT, PushChannel, open, push_url};
pub use error::TransportError;
pub use http::{CommandClient, CommandResponse};
