//! Command line and environment configuration.

use std::{path::PathBuf, time::Duration};

use asemic_app::{ConnectionConfig, DEFAULT_RECONNECT_DELAY};
use clap::Parser;
use url::Url;

/// Asemic relay operator console
#[derive(Parser, Debug, Clone)]
#[command(name = "asemic-tui")]
#[command(about = "Terminal operator console for an Asemic relay")]
#[command(version)]
pub struct Config {
    /// Relay base URL; the push channel is derived from it
    #[arg(short, long, env = "ASEMIC_SERVER", default_value = "http://127.0.0.1:8080")]
    pub server: Url,

    /// Delay before reconnecting a lost push channel, in milliseconds
    #[arg(long, env = "ASEMIC_RECONNECT_MS", default_value_t = DEFAULT_RECONNECT_DELAY.as_millis() as u64)]
    pub reconnect_ms: u64,

    /// Directory downloaded attachments are saved into
    #[arg(long, env = "ASEMIC_DOWNLOADS", default_value = ".")]
    pub downloads: PathBuf,

    /// Log file
    #[arg(long, env = "ASEMIC_LOG_FILE", default_value = "asemic-tui.log")]
    pub log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ASEMIC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Connection settings for the runtime.
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig { reconnect_delay: Duration::from_millis(self.reconnect_ms) }
    }
}
