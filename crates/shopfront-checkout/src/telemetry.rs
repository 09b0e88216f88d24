//! # Telemetry
//!
//! Tracing subscriber setup for binaries built on this crate.
//!
//! Libraries only emit `tracing` events; whoever owns `main` calls
//! [`init_tracing`] once.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info,shopfront=debug";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopfront_core=trace` - Trace the scan filter keystroke by keystroke
/// - Default: `info,shopfront=debug`
///
/// `shopfront` matches both `shopfront_core` and `shopfront_checkout`
/// targets. A second call leaves the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
