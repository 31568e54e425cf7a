//! Asemic operator console entry point.
//!
//! # Usage
//!
//! ```bash
//! # Relay on the default local address
//! asemic-tui
//!
//! # Remote relay, faster reconnects, verbose log
//! asemic-tui --server http://10.0.0.1:8080 --reconnect-ms 1000 --log-level debug
//! ```

use std::{fs::File, sync::Mutex};

use asemic_tui::{Config, Runtime, TerminalDriver};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = File::options().create(true).append(true).open(&config.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    tracing::info!(server = %config.server, "asemic console starting");

    let driver = TerminalDriver::new(&config)?;
    let runtime = Runtime::new(driver, config.server.to_string(), config.connection());

    Ok(runtime.run().await?)
}
