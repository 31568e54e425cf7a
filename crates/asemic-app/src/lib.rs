//! Application layer for the Asemic relay console
//!
//! Pure state machines and a generic runtime, so the same orchestration code
//! runs against a real terminal and network or against simulation.
//!
//! # Components
//!
//! - [`StateStore`]: mirror of relay state (keys, message log, traffic log,
//!   counters)
//! - [`EventRouter`]: push frame decoding and dispatch
//! - [`ConnectionManager`]: push channel lifecycle and reconnection timer
//! - [`App`]: operator state machine (commands, compose form, alerts)
//! - [`ViewModel`]: pure projection of [`App`] for frontends
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod command;
mod compose;
mod connection;
mod driver;
mod event;
mod region;
mod router;
mod runtime;
mod state;
pub mod view;

pub use action::AppAction;
pub use app::App;
pub use command::{
    Command, CommandError, CommandId, CommandOutcome, CommandTracker, ValidationError,
};
pub use compose::{Attachment, ComposeForm};
pub use connection::{
    ConnectionAction, ConnectionConfig, ConnectionManager, DEFAULT_RECONNECT_DELAY,
};
pub use driver::{ChannelEvent, Driver};
pub use event::AppEvent;
pub use region::Regions;
pub use router::EventRouter;
pub use runtime::Runtime;
pub use state::{ConnectionState, StateStore, TRAFFIC_LOG_CAPACITY};
pub use view::ViewModel;
