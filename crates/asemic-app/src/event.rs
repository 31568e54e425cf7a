//! Application input events.
//!
//! Events come from the operator (resize, ticks), from the push channel as
//! relayed by the runtime, and from finished commands.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::CommandOutcome;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// A push channel is being opened.
    Connecting,

    /// The push channel handshake completed.
    Connected,

    /// The push channel was lost.
    Disconnected {
        /// Delay until the next attempt.
        retry_in: Duration,
    },

    /// One raw push channel frame, in arrival order.
    Frame {
        /// Frame text.
        payload: String,
        /// Arrival time, stamped by the transport.
        received_at: DateTime<Utc>,
    },

    /// A submitted command finished.
    CommandCompleted(CommandOutcome),
}
