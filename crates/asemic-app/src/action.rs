//! Side effects requested by the [`crate::App`] state machine.

use crate::{Command, CommandId, Regions};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Re-render the given view regions.
    Render(Regions),

    /// Quit the application.
    Quit,

    /// Issue a command on the request/response path.
    Submit {
        /// Tracker id to report the outcome under.
        id: CommandId,
        /// Command to execute.
        command: Command,
    },

    /// Blocking operator notification.
    Notify {
        /// Text shown to the operator.
        message: String,
    },
}
