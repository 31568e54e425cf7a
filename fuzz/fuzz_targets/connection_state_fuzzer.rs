//! Fuzz target for the push channel connection manager
//!
//! # Strategy
//!
//! - Random interleaving of opens, errors, closes and clock advances
//! - Virtual clock in milliseconds so deadlines are exact
//!
//! # Invariants
//!
//! - At most one open per tick, and never before the scheduled deadline
//! - A loss while open schedules exactly one reconnect, one delay out
//! - A pending deadline implies Disconnected

#![no_main]

use std::{ops::Add, time::Duration};

use arbitrary::Arbitrary;
use asemic_app::{ConnectionAction, ConnectionConfig, ConnectionManager, ConnectionState};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Millis(u64);

impl Add<Duration> for Millis {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.as_millis() as u64)
    }
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Op {
    Opened,
    Error,
    Closed,
    Advance(u16),
}

fuzz_target!(|input: (u16, Vec<Op>)| {
    let (delay_ms, ops) = input;
    let delay = Duration::from_millis(u64::from(delay_ms));
    let mut manager = ConnectionManager::new(ConnectionConfig { reconnect_delay: delay });
    let mut now = Millis(0);

    assert_eq!(manager.connect().len(), 1);

    for op in ops {
        let was = manager.state();
        let actions = match op {
            Op::Opened => {
                assert_eq!(manager.handle_opened(), was == ConnectionState::Connecting);
                vec![]
            },
            Op::Error => manager.handle_error(now, "fuzz"),
            Op::Closed => manager.handle_closed(now, "fuzz"),
            Op::Advance(ms) => {
                let deadline = manager.next_deadline();
                now = now + Duration::from_millis(u64::from(ms));
                let actions = manager.tick(now);
                let opened = actions.iter().any(|a| matches!(a, ConnectionAction::OpenChannel));
                if opened {
                    assert!(deadline.is_some_and(|d| d <= now), "reconnect before deadline");
                }
                actions
            },
        };

        let opens = actions.iter().filter(|a| matches!(a, ConnectionAction::OpenChannel)).count();
        assert!(opens <= 1);

        let scheduled: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                ConnectionAction::ScheduleReconnect { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        if matches!(op, Op::Error | Op::Closed) && was != ConnectionState::Disconnected {
            assert_eq!(scheduled, vec![now + delay]);
        }

        if manager.next_deadline().is_some() {
            assert_eq!(manager.state(), ConnectionState::Disconnected);
        }
    }
});
