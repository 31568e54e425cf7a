//! Push-channel frame dispatch.
//!
//! Decodes each raw frame and hands the event to the [`StateStore`]. Frames
//! are routed strictly in arrival order by the caller; the router itself keeps
//! only diagnostic counters.

use asemic_proto::PushEvent;
use chrono::{DateTime, Utc};

use crate::{Regions, StateStore};

/// Decodes push frames and applies them to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventRouter {
    applied: u64,
    ignored: u64,
    dropped: u64,
}

impl EventRouter {
    /// Create a router with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one raw frame. Returns the regions the event touched.
    ///
    /// Malformed frames are logged and dropped. Unknown event kinds are
    /// ignored. Neither is an error for the channel.
    pub fn route(
        &mut self,
        store: &mut StateStore,
        frame: &str,
        received_at: DateTime<Utc>,
    ) -> Regions {
        match PushEvent::decode(frame) {
            Ok(PushEvent::Unknown { event }) => {
                tracing::debug!(%event, "ignoring unknown push event");
                self.ignored += 1;
                Regions::NONE
            },
            Ok(event) => {
                tracing::trace!(kind = event.kind(), "applying push event");
                self.applied += 1;
                store.apply(event, received_at)
            },
            Err(e) => {
                tracing::warn!(error = %e, len = frame.len(), "dropping malformed push frame");
                self.dropped += 1;
                Regions::NONE
            },
        }
    }

    /// Events applied to the store.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Well-formed frames of an unknown kind.
    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    /// Frames that failed to decode.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
