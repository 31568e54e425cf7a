//! Deterministic simulation harness for the relay console.
//!
//! [`SimDriver`] implements [`asemic_app::Driver`] with injected input,
//! scripted channel and relay behaviour, and a virtual clock, so the same
//! [`asemic_app::Runtime`] that drives the terminal can be exercised without
//! a network or real time.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod sim_driver;

pub use sim_driver::{SimDriver, SimDriverError, SimInstant};
