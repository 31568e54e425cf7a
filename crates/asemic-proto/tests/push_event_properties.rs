//! Property tests for push-channel decoding.
//!
//! The decoder sits directly on untrusted network input, so beyond the
//! per-variant unit tests we check it never panics and that every event the
//! relay can emit survives the wire unchanged.

use asemic_proto::{
    Message, MessageContent, NoisePacket, ObfuscationPattern, ProtocolError, PushEvent, Stats,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn stats_strategy() -> impl Strategy<Value = Stats> {
    (any::<u64>(), any::<u64>(), any::<u64>(), any::<u64>()).prop_map(|(a, b, c, d)| Stats {
        packets_sent: a,
        noise_packets_sent: b,
        packets_received: c,
        messages_decrypted: d,
    })
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (0i64..2_000_000_000, any::<[u8; 4]>(), any::<u16>(), "[a-z]{1,8}", ".{0,24}").prop_map(
        |(secs, ip, port, key, text)| Message {
            id: None,
            timestamp: Utc.timestamp_opt(secs, 0).single().unwrap_or_default(),
            sender: (ip, port).into(),
            decrypted_with_key: key,
            decrypted_with_pattern: ObfuscationPattern::Sunshine,
            content: MessageContent::Text(text),
        },
    )
}

fn event_strategy() -> impl Strategy<Value = PushEvent> {
    prop_oneof![
        (
            prop::collection::vec("[a-z&<]{1,6}", 0..4),
            prop::collection::vec(message_strategy(), 0..4),
            stats_strategy()
        )
            .prop_map(|(keys, messages, stats)| PushEvent::FullState { keys, messages, stats }),
        message_strategy().prop_map(PushEvent::NewMessage),
        (any::<[u8; 4]>(), any::<u16>(), any::<u64>()).prop_map(|(ip, port, size)| {
            PushEvent::NoisePacket(NoisePacket { sender: (ip, port).into(), size })
        }),
        prop::collection::vec("[a-z]{1,6}", 0..5).prop_map(PushEvent::KeyUpdate),
        stats_strategy().prop_map(PushEvent::StatsUpdate),
    ]
}

proptest! {
    #[test]
    fn prop_decode_never_panics(frame in ".{0,256}") {
        let _ = PushEvent::decode(&frame);
    }

    #[test]
    fn prop_relay_events_survive_the_wire(event in event_strategy()) {
        let frame = event.encode().unwrap();
        prop_assert_eq!(PushEvent::decode(&frame).unwrap(), event);
    }

    #[test]
    fn prop_unknown_kinds_never_error(kind in "[A-Z][a-zA-Z]{3,12}") {
        prop_assume!(!matches!(
            kind.as_str(),
            "FullState" | "NewMessage" | "NoisePacket" | "KeyUpdate" | "StatsUpdate"
        ));
        let frame = format!(r#"{{"event":"{kind}","data":{{"anything":[1,2,3]}}}}"#);
        prop_assert_eq!(PushEvent::decode(&frame), Ok(PushEvent::Unknown { event: kind }));
    }
}

#[test]
fn decodes_relay_full_state_frame() {
    let frame = r#"{
        "event": "FullState",
        "data": {
            "keys": ["alpha", "a&b"],
            "messages": [
                {
                    "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                    "timestamp": "2024-05-01T12:30:45.123Z",
                    "sender": "192.168.1.20:7070",
                    "content": { "type": "Text", "payload": "hello" },
                    "decrypted_with_key": "alpha",
                    "decrypted_with_pattern": "Sunshine"
                },
                {
                    "timestamp": "2024-05-01T12:31:00Z",
                    "sender": "192.168.1.20:7070",
                    "content": {
                        "type": "File",
                        "payload": { "filename": "report.pdf", "id": "9f1c2b4e-8d3a-4c56-b7e8-0a1b2c3d4e5f" }
                    },
                    "decrypted_with_key": "a&b",
                    "decrypted_with_pattern": "Starfall"
                }
            ],
            "stats": {
                "packets_sent": 10,
                "packets_received": 7,
                "noise_packets_sent": 3,
                "messages_decrypted": 2
            }
        }
    }"#;

    let PushEvent::FullState { keys, messages, stats } = PushEvent::decode(frame).unwrap() else {
        panic!("expected full state");
    };

    assert_eq!(keys, vec!["alpha".to_string(), "a&b".to_string()]);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, MessageContent::Text("hello".into()));
    assert_eq!(messages[1].decrypted_with_pattern, ObfuscationPattern::Starfall);
    assert!(matches!(&messages[1].content, MessageContent::File(f) if f.filename == "report.pdf"));
    assert_eq!(stats.packets_received, 7);
    assert_eq!(stats.noise_packets_sent, 3);
}

#[test]
fn rejects_message_with_bad_sender() {
    let frame = r#"{"event":"NewMessage","data":{
        "timestamp":"2024-05-01T12:30:45Z","sender":"not-an-address",
        "content":{"type":"Text","payload":"x"},
        "decrypted_with_key":"k","decrypted_with_pattern":"Sunshine"}}"#;

    assert!(matches!(
        PushEvent::decode(frame),
        Err(ProtocolError::InvalidPayload { event: "NewMessage", .. })
    ));
}
