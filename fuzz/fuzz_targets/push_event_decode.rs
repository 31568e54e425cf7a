//! Fuzz target for PushEvent::decode
//!
//! Push frames come straight off the network. This fuzzer feeds arbitrary
//! text to the decoder to find:
//! - Parser panics on malformed JSON
//! - Payloads that decode but fail to re-encode
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use asemic_proto::PushEvent;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(event) = PushEvent::decode(frame) {
        if !matches!(event, PushEvent::Unknown { .. }) {
            let encoded = event.encode().expect("decoded event must re-encode");
            assert_eq!(PushEvent::decode(&encoded).ok(), Some(event));
        }
    }
});
