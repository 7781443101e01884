//! Tracing subscriber set-up for the `qrcrypt` binary.
//!
//! Logs go to stderr so stdout carries nothing but payload output.
//!
//! # Telemetry invariants
//!
//! - **No key material, plaintext, or envelope bytes** appear in any log
//!   field. Keys are identified by fingerprint only.
//! - `RUST_LOG` takes precedence over the configured level.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// `log_format` selects structured JSON (`"json"`) or human-readable text
/// (anything else).
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str, log_format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if log_format == "json" {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
