//! Push channel lifecycle.
//!
//! [`ConnectionManager`] decides when a channel is opened and when the next
//! attempt happens after a loss. It does no I/O: methods take the current
//! instant and return [`ConnectionAction`]s for the runtime to execute.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  connect   ┌────────────┐  opened   ┌───────────┐
//! │ Disconnected │───────────>│ Connecting │──────────>│ Connected │
//! └──────────────┘            └────────────┘           └───────────┘
//!        ^                          │ error/close            │ error/close
//!        │   tick >= deadline       ↓                        ↓
//!        └─────────────── reconnect scheduled <──────────────┘
//! ```
//!
//! Errors are not a separate terminal state: they funnel into the close path
//! so exactly one reconnection is scheduled per loss. Attempts are unbounded
//! and the delay never grows.

use std::{ops::Add, time::Duration};

use crate::ConnectionState;

/// Delay between a channel loss and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Actions returned by the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionAction<I> {
    /// Open a new push channel.
    OpenChannel,

    /// Release the current channel handle.
    CloseChannel,

    /// A reconnection attempt will fire at `at`.
    ScheduleReconnect {
        /// Instant the attempt fires.
        at: I,
        /// Delay from the loss.
        delay: Duration,
    },
}

/// Connection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Fixed delay before reconnecting.
    pub reconnect_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { reconnect_delay: DEFAULT_RECONNECT_DELAY }
    }
}

/// Push channel lifecycle state machine.
///
/// Generic over the instant type so simulation can drive it with virtual
/// time.
#[derive(Debug, Clone)]
pub struct ConnectionManager<I> {
    state: ConnectionState,
    config: ConnectionConfig,
    reconnect_at: Option<I>,
    attempts: u64,
}

impl<I> ConnectionManager<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create a manager in [`ConnectionState::Disconnected`] with nothing
    /// scheduled.
    pub fn new(config: ConnectionConfig) -> Self {
        Self { state: ConnectionState::Disconnected, config, reconnect_at: None, attempts: 0 }
    }

    /// Current link state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Connection attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Instant of the pending reconnection attempt, if any.
    pub fn next_deadline(&self) -> Option<I> {
        self.reconnect_at
    }

    /// Configured reconnect delay.
    pub fn reconnect_delay(&self) -> Duration {
        self.config.reconnect_delay
    }

    /// Start a connection attempt.
    ///
    /// Only one channel exists at a time: this is a no-op unless
    /// disconnected. A pending reconnection is superseded.
    pub fn connect(&mut self) -> Vec<ConnectionAction<I>> {
        if self.state != ConnectionState::Disconnected {
            tracing::debug!(state = ?self.state, "connect ignored, channel already active");
            return vec![];
        }

        self.state = ConnectionState::Connecting;
        self.reconnect_at = None;
        self.attempts += 1;
        tracing::info!(attempt = self.attempts, "opening push channel");

        vec![ConnectionAction::OpenChannel]
    }

    /// The channel handshake completed.
    ///
    /// Returns `false` if no handshake was pending.
    pub fn handle_opened(&mut self) -> bool {
        if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Connected;
            tracing::info!("push channel connected");
            true
        } else {
            tracing::warn!(state = ?self.state, "channel opened in unexpected state");
            false
        }
    }

    /// The channel reported an error. Treated as a closure.
    pub fn handle_error(&mut self, now: I, reason: &str) -> Vec<ConnectionAction<I>> {
        tracing::warn!(%reason, "push channel error");
        self.handle_closed(now, reason)
    }

    /// The channel closed, cleanly or not.
    ///
    /// Schedules exactly one reconnection. Further closures reported for the
    /// same loss are ignored.
    pub fn handle_closed(&mut self, now: I, reason: &str) -> Vec<ConnectionAction<I>> {
        if self.state == ConnectionState::Disconnected {
            tracing::debug!(%reason, "closure already handled");
            return vec![];
        }

        let delay = self.config.reconnect_delay;
        let at = now + delay;
        self.state = ConnectionState::Disconnected;
        self.reconnect_at = Some(at);
        tracing::info!(%reason, ?delay, "push channel closed, reconnect scheduled");

        vec![ConnectionAction::CloseChannel, ConnectionAction::ScheduleReconnect { at, delay }]
    }

    /// Fire the reconnection timer if its deadline has passed.
    pub fn tick(&mut self, now: I) -> Vec<ConnectionAction<I>> {
        match self.reconnect_at {
            Some(at) if now >= at => self.connect(),
            _ => vec![],
        }
    }
}
