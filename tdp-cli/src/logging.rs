//! Logging setup for the CLI.
//!
//! # Environment Variables
//!
//! - `TDP_LOG_LEVEL=trace|debug|info|warn|error` - Set the log level
//! - `TDP_LOG_FORMAT=compact|pretty|json` - Set the output format (default: compact)
//!
//! Without `TDP_LOG_LEVEL`, the level is `warn`, raised by each `-v` flag.
//! Logs go to stderr so that `--json` output stays machine-readable.

use std::env;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log level for a number of `-v` flags, unless `TDP_LOG_LEVEL` overrides it.
pub fn get_log_level(verbosity: u8) -> &'static str {
    if let Ok(level) = env::var("TDP_LOG_LEVEL") {
        match level.to_lowercase().as_str() {
            "trace" => return "trace",
            "debug" => return "debug",
            "info" => return "info",
            "warn" => return "warn",
            "error" => return "error",
            _ => {}
        }
    }
    level_for_verbosity(verbosity)
}

/// Get the configured log format from `TDP_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("TDP_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "json" => "json",
            _ => "compact",
        })
        .unwrap_or("compact")
}

fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init(verbosity: u8) {
    let level = get_log_level(verbosity);
    let filter = EnvFilter::try_new(format!(
        "tdp={},tdp_cli={},tdp_migrate={},tdp_sqlite={}",
        level, level, level, level
    ))
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = match get_log_format() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!(level = level, format = get_log_format(), "Logging initialized");
    }
}
