//! In-memory mirror of relay state.
//!
//! [`StateStore`] is the only owner of the key set, message log, traffic log
//! and counters. It is rebuilt from a `FullState` event after every
//! reconnection and otherwise changes one event at a time.
//!
//! # Invariants
//!
//! - The key set never holds duplicates.
//! - Both logs are newest first.
//! - The traffic log never exceeds [`TRAFFIC_LOG_CAPACITY`] entries and
//!   always holds the most recent observations.
//! - Only `FullState` can shrink the message log.

use std::collections::VecDeque;

use asemic_proto::{Message, PushEvent, Stats, TrafficRecord};
use chrono::{DateTime, Utc};

use crate::Regions;

/// Maximum retained traffic observations.
pub const TRAFFIC_LOG_CAPACITY: usize = 200;

/// Push channel link status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No channel. A reconnection may be pending.
    #[default]
    Disconnected,
    /// Channel handshake in progress.
    Connecting,
    /// Channel open.
    Connected,
}

/// Authoritative client-side mirror of relay state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateStore {
    keys: Vec<String>,
    messages: VecDeque<Message>,
    traffic: VecDeque<TrafficRecord>,
    stats: Stats,
    synced: bool,
}

impl StateStore {
    /// Create an empty, unsynced store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one push event and return the regions it touched.
    ///
    /// `received_at` stamps traffic observations; other events ignore it.
    pub fn apply(&mut self, event: PushEvent, received_at: DateTime<Utc>) -> Regions {
        match event {
            PushEvent::FullState { keys, messages, stats } => {
                self.replace_keys(keys);
                self.messages.clear();
                // Snapshot is oldest first; replaying it newest-first matches
                // what the same messages would look like arriving one by one.
                for message in messages {
                    self.messages.push_front(message);
                }
                self.traffic.clear();
                self.stats = stats;
                self.synced = true;
                Regions::KEYS | Regions::MESSAGES | Regions::TRAFFIC | Regions::STATS
            },
            PushEvent::NewMessage(message) => {
                self.messages.push_front(message);
                Regions::MESSAGES
            },
            PushEvent::NoisePacket(packet) => {
                self.traffic.push_front(packet.received(received_at));
                self.traffic.truncate(TRAFFIC_LOG_CAPACITY);
                Regions::TRAFFIC
            },
            PushEvent::KeyUpdate(keys) => {
                self.replace_keys(keys);
                Regions::KEYS
            },
            PushEvent::StatsUpdate(stats) => {
                self.stats = stats;
                Regions::STATS
            },
            PushEvent::Unknown { .. } => Regions::NONE,
        }
    }

    /// Mark the mirror stale until the next `FullState`.
    pub fn mark_stale(&mut self) {
        self.synced = false;
    }

    /// True once a `FullState` was applied since the last disconnect.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Active keys in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// True if `key` is in the key set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Message log, newest first.
    pub fn messages(&self) -> &VecDeque<Message> {
        &self.messages
    }

    /// Traffic log, newest first.
    pub fn traffic(&self) -> &VecDeque<TrafficRecord> {
        &self.traffic
    }

    /// Latest counters.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    fn replace_keys(&mut self, keys: Vec<String>) {
        self.keys.clear();
        for key in keys {
            if !self.keys.contains(&key) {
                self.keys.push(key);
            }
        }
    }
}
