//! Tracing setup for hosts embedding the middleware.

use crate::error::{MiddlewareError, Result};
use std::env;

/// Environment variable selecting the log output format
pub const LOG_FORMAT_ENV: &str = "RUST_LOG_FORMAT";

/// Install a global tracing subscriber.
///
/// Logs always go to stderr: the MCP stdio transport owns stdout. The level
/// comes from `RUST_LOG`; `RUST_LOG_FORMAT=json` switches to JSON lines.
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env());

    let installed = if json_format_requested() {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    installed.map_err(|e| MiddlewareError::config(format!("Failed to initialize tracing: {}", e)))
}

fn json_format_requested() -> bool {
    env::var(LOG_FORMAT_ENV).unwrap_or_default() == "json"
}
