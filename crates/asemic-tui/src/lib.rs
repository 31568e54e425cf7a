//! Terminal operator console for the Asemic relay
//!
//! A thin shell over [`asemic_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`asemic_app::Runtime`].
//!
//! This crate only handles terminal input, rendering, and wiring the network
//! adapters from `asemic-client` into the driver.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod config;
pub mod input;
pub mod terminal;
pub mod ui;

pub use asemic_app::{App, AppAction, AppEvent, Driver, Runtime, ViewModel};
pub use config::Config;
pub use input::{InputState, KeyInput};
pub use terminal::{TerminalDriver, TerminalError};
