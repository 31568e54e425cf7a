//! Fuzz target for the event router and state store
//!
//! # Strategy
//!
//! - Mix well-formed events of every kind with raw garbage frames
//! - Feed them through one router into one store, in order
//!
//! # Invariants
//!
//! - Every frame is counted exactly once (applied, ignored, or dropped)
//! - Garbage never changes the store
//! - Traffic log never exceeds its capacity
//! - Key list never holds duplicates

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use asemic_app::{EventRouter, StateStore, TRAFFIC_LOG_CAPACITY};
use asemic_proto::{NoisePacket, PushEvent, Stats};
use chrono::{DateTime, Utc};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum FrameChoice {
    Keys(Vec<u8>),
    Noise { port: u16, size: u16 },
    Stats { sent: u32, received: u32 },
    Unknown(u8),
    Garbage(String),
}

fn encode(choice: &FrameChoice) -> String {
    let event = match choice {
        FrameChoice::Keys(ids) => {
            PushEvent::KeyUpdate(ids.iter().map(|id| format!("key-{}", id % 8)).collect())
        },
        FrameChoice::Noise { port, size } => PushEvent::NoisePacket(NoisePacket {
            sender: ([10, 0, 0, 1], *port).into(),
            size: u64::from(*size),
        }),
        FrameChoice::Stats { sent, received } => PushEvent::StatsUpdate(Stats {
            packets_sent: u64::from(*sent),
            packets_received: u64::from(*received),
            ..Stats::default()
        }),
        FrameChoice::Unknown(n) => return format!(r#"{{"event":"Future{n}","data":null}}"#),
        FrameChoice::Garbage(text) => return text.clone(),
    };
    event.encode().expect("known events encode")
}

fuzz_target!(|frames: Vec<FrameChoice>| {
    let mut router = EventRouter::new();
    let mut store = StateStore::new();
    let received_at = DateTime::<Utc>::UNIX_EPOCH;

    for (i, choice) in frames.iter().enumerate() {
        let frame = encode(choice);
        let before = (store.keys().to_vec(), store.traffic().len(), store.stats());

        router.route(&mut store, &frame, received_at);

        let total = router.applied() + router.ignored() + router.dropped();
        assert_eq!(total, i as u64 + 1, "frame counted more or less than once");

        if PushEvent::decode(&frame).is_err() {
            let after = (store.keys().to_vec(), store.traffic().len(), store.stats());
            assert_eq!(before, after, "dropped frame changed the store");
        }

        assert!(store.traffic().len() <= TRAFFIC_LOG_CAPACITY);
        let unique: HashSet<_> = store.keys().iter().collect();
        assert_eq!(unique.len(), store.keys().len(), "duplicate key");
    }
});
