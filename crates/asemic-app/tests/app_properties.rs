//! Property-based tests for the state mirror.
//!
//! Checks that the reconciliation rules hold for arbitrary event sequences:
//! folding, snapshot idempotence, traffic retention, key selection and
//! forward compatibility.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use asemic_app::{App, AppEvent, StateStore, TRAFFIC_LOG_CAPACITY};
use asemic_proto::{
    Message, MessageContent, NoisePacket, ObfuscationPattern, PushEvent, Stats, TrafficRecord,
};
use chrono::{DateTime, Utc};
use proptest::prelude::*;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn addr_strategy() -> impl Strategy<Value = SocketAddr> {
    (any::<[u8; 4]>(), 1u16..).prop_map(|(ip, port)| SocketAddr::new(IpAddr::V4(Ipv4Addr::from(ip)), port))
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z&<\"]{1,4}"
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (0i64..2_000_000_000, addr_strategy(), key_strategy(), any::<bool>(), ".{0,16}").prop_map(
        |(secs, sender, key, starfall, text)| Message {
            id: None,
            timestamp: at(secs),
            sender,
            decrypted_with_key: key,
            decrypted_with_pattern: if starfall {
                ObfuscationPattern::Starfall
            } else {
                ObfuscationPattern::Sunshine
            },
            content: MessageContent::Text(text),
        },
    )
}

fn stats_strategy() -> impl Strategy<Value = Stats> {
    any::<[u32; 4]>().prop_map(|[a, b, c, d]| Stats {
        packets_sent: a.into(),
        noise_packets_sent: b.into(),
        packets_received: c.into(),
        messages_decrypted: d.into(),
    })
}

fn full_state_strategy() -> impl Strategy<Value = PushEvent> {
    (
        prop::collection::vec(key_strategy(), 0..6),
        prop::collection::vec(message_strategy(), 0..8),
        stats_strategy(),
    )
        .prop_map(|(keys, messages, stats)| PushEvent::FullState { keys, messages, stats })
}

/// Incremental events plus the occasional unknown kind.
fn incremental_strategy() -> impl Strategy<Value = PushEvent> {
    prop_oneof![
        3 => message_strategy().prop_map(PushEvent::NewMessage),
        3 => (addr_strategy(), any::<u16>())
            .prop_map(|(sender, size)| PushEvent::NoisePacket(NoisePacket { sender, size: size.into() })),
        2 => prop::collection::vec(key_strategy(), 0..6).prop_map(PushEvent::KeyUpdate),
        1 => stats_strategy().prop_map(PushEvent::StatsUpdate),
        1 => "[A-Z][a-zA-Z]{3,10}Thing".prop_map(|event| PushEvent::Unknown { event }),
    ]
}

/// Reference model: each event's documented effect, written naively.
#[derive(Debug, Default)]
struct Model {
    keys: Vec<String>,
    messages: Vec<Message>,
    traffic: Vec<TrafficRecord>,
    stats: Stats,
}

impl Model {
    fn fold(&mut self, event: PushEvent, received_at: DateTime<Utc>) {
        match event {
            PushEvent::FullState { keys, mut messages, stats } => {
                self.keys = dedup(keys);
                messages.reverse();
                self.messages = messages;
                self.traffic.clear();
                self.stats = stats;
            },
            PushEvent::NewMessage(message) => self.messages.insert(0, message),
            PushEvent::NoisePacket(packet) => {
                self.traffic.insert(0, packet.received(received_at));
                self.traffic.truncate(TRAFFIC_LOG_CAPACITY);
            },
            PushEvent::KeyUpdate(keys) => self.keys = dedup(keys),
            PushEvent::StatsUpdate(stats) => self.stats = stats,
            PushEvent::Unknown { .. } => {},
        }
    }
}

fn dedup(keys: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

fn frame(app: &mut App, payload: String) {
    app.handle(AppEvent::Frame { payload, received_at: at(1_700_000_000) });
}

fn key_update(keys: &[String]) -> String {
    PushEvent::KeyUpdate(keys.to_vec()).encode().unwrap()
}

proptest! {
    #[test]
    fn prop_store_equals_fold_after_full_state(
        snapshot in full_state_strategy(),
        events in prop::collection::vec(incremental_strategy(), 0..80),
    ) {
        let mut store = StateStore::new();
        let mut model = Model::default();

        store.apply(snapshot.clone(), at(0));
        model.fold(snapshot, at(0));

        for (i, event) in events.into_iter().enumerate() {
            let received_at = at(i as i64);
            store.apply(event.clone(), received_at);
            model.fold(event, received_at);
        }

        prop_assert_eq!(store.keys(), model.keys.as_slice());
        prop_assert!(store.messages().iter().eq(model.messages.iter()));
        prop_assert!(store.traffic().iter().eq(model.traffic.iter()));
        prop_assert_eq!(store.stats(), model.stats);
        prop_assert!(store.is_synced());
    }

    #[test]
    fn prop_full_state_is_idempotent(
        before in prop::collection::vec(incremental_strategy(), 0..20),
        snapshot in full_state_strategy(),
    ) {
        let mut store = StateStore::new();
        for event in before {
            store.apply(event, at(5));
        }

        store.apply(snapshot.clone(), at(10));
        let once = store.clone();
        store.apply(snapshot.clone(), at(20));
        prop_assert_eq!(&store, &once);

        // Prior history is fully superseded.
        let mut fresh = StateStore::new();
        fresh.apply(snapshot, at(30));
        prop_assert_eq!(&store, &fresh);
    }

    #[test]
    fn prop_traffic_log_keeps_most_recent(count in 0usize..600) {
        let mut store = StateStore::new();
        let sender = SocketAddr::from(([10, 0, 0, 1], 9000));

        for size in 0..count as u64 {
            store.apply(PushEvent::NoisePacket(NoisePacket { sender, size }), at(0));
            prop_assert!(store.traffic().len() <= TRAFFIC_LOG_CAPACITY);
        }

        let retained: Vec<u64> = store.traffic().iter().map(|r| r.size).collect();
        let expected: Vec<u64> =
            (0..count as u64).rev().take(TRAFFIC_LOG_CAPACITY).collect();
        prop_assert_eq!(retained, expected);
    }

    #[test]
    fn prop_selection_survives_key_update_iff_key_remains(
        first in prop::collection::vec(key_strategy(), 1..6),
        pick in any::<prop::sample::Index>(),
        second in prop::collection::vec(key_strategy(), 0..6),
    ) {
        let mut app = App::new("relay:8080".into());
        frame(&mut app, key_update(&first));

        let selected = pick.get(&first).clone();
        app.select_key(&selected);
        prop_assert_eq!(app.compose().selected_key.as_deref(), Some(selected.as_str()));

        frame(&mut app, key_update(&second));

        let expected = second.contains(&selected).then_some(selected.as_str());
        prop_assert_eq!(app.compose().selected_key.as_deref(), expected);
    }

    #[test]
    fn prop_unknown_event_changes_nothing(
        history in prop::collection::vec(incremental_strategy(), 0..20),
        kind in "[A-Z][a-zA-Z]{3,10}Thing",
        data in prop_oneof![Just("{}"), Just("null"), Just("[1,2,3]"), Just(r#"{"keys":["x"]}"#)],
    ) {
        let mut app = App::new("relay:8080".into());
        for event in history {
            if let Ok(payload) = event.encode() {
                frame(&mut app, payload);
            }
        }
        let store = app.store().clone();
        let compose = app.compose().clone();

        let actions = app.handle(AppEvent::Frame {
            payload: format!(r#"{{"event":"{kind}","data":{data}}}"#),
            received_at: at(0),
        });

        prop_assert!(actions.is_empty());
        prop_assert_eq!(app.store(), &store);
        prop_assert_eq!(app.compose(), &compose);
        prop_assert_eq!(app.router().ignored(), 1);
    }
}
