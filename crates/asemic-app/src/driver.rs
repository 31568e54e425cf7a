//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from terminals, sockets and
//! clocks. The console binary implements it over a real terminal, a WebSocket
//! and `reqwest`; simulation implements it with queues and virtual time. The
//! generic [`crate::Runtime`] handles all orchestration.

use std::{future::Future, ops::Add, time::Duration};

use chrono::{DateTime, Utc};

use crate::{App, AppAction, Command, CommandId, CommandOutcome, ViewModel};

/// What the push channel reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The handshake completed and the channel is open.
    Opened,

    /// A text frame, in arrival order.
    Frame {
        /// Frame text.
        payload: String,
        /// Arrival time.
        received_at: DateTime<Utc>,
    },

    /// The channel closed.
    Closed {
        /// Close reason, for logs.
        reason: String,
    },

    /// The channel failed. Always followed by the close path.
    Error {
        /// Failure description.
        reason: String,
    },
}

/// Abstracts I/O operations for the application runtime.
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Add<Duration, Output = Self::Instant>;

    /// Wait briefly for operator input and apply it to the App.
    ///
    /// Returns the actions the input produced, or none if nothing arrived
    /// before the driver's tick.
    fn poll_event(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Start opening the push channel. Must not wait for the handshake.
    ///
    /// The outcome arrives through [`Driver::recv_channel`]:
    /// [`ChannelEvent::Opened`] on success, or `Error`/`Closed` if the
    /// handshake fails or times out.
    ///
    /// # Errors
    ///
    /// The attempt could not even start. The runtime treats it as a channel
    /// error and schedules a reconnection.
    fn open_channel(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next buffered channel event, or `None` if nothing is ready or no
    /// channel is open. Must not block.
    fn recv_channel(&mut self) -> impl Future<Output = Option<ChannelEvent>> + Send;

    /// Release the current channel handle, if any.
    fn close_channel(&mut self);

    /// Start executing a command. Must not block; the outcome is reported
    /// through [`Driver::poll_completion`].
    fn submit(&mut self, id: CommandId, command: Command);

    /// Next finished command, if any.
    fn poll_completion(&mut self) -> Option<CommandOutcome>;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Draw the view.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, view: &ViewModel) -> Result<(), Self::Error>;

    /// Deliver a blocking notification to the operator.
    fn notify(&mut self, message: &str);

    /// Stop everything and clean up resources.
    fn stop(&mut self);
}
