//! Wire model for the Asemic relay console.
//!
//! The relay exposes two surfaces to its operator console:
//!
//! - a push channel delivering [`PushEvent`]s as JSON text frames, and
//! - a request/response command path ([`Endpoint`]) taking JSON bodies.
//!
//! This crate holds the types on both surfaces plus the stateless [`codec`]
//! helpers. It performs no I/O.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod errors;
pub mod events;
pub mod model;
pub mod requests;

pub use errors::ProtocolError;
pub use events::PushEvent;
pub use model::{
    FileAttachment, Message, MessageContent, NoiseLevel, NoisePacket, ObfuscationPattern, Stats,
    TrafficRecord, UnknownVariant,
};
pub use requests::{
    Endpoint, KeyRequest, Method, NoiseRequest, OutgoingContent, OutgoingFile, SendRequest,
};
