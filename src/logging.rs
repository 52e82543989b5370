// src/logging.rs

//! Logging setup.
//!
//! The level comes from the `--log-level` flag when given, else from
//! `PROCWATCH_LOG`, else defaults to info. Logs go to stderr so the
//! supervised commands keep stdout entirely to themselves.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = cli_level
        .or_else(|| {
            std::env::var("PROCWATCH_LOG")
                .ok()
                .and_then(|s| s.parse::<LogLevel>().ok())
        })
        .map_or(tracing::Level::INFO, tracing::Level::from);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
