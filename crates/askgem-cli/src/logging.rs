//! Tracing setup for the CLI.
//!
//! Logs go to stderr so stdout carries only the rendered HTML. The filter is
//! read from `ASKGEM_LOG` (same syntax as `RUST_LOG`), defaulting to `warn`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ASKGEM_LOG";

/// Installs the global subscriber. Returns false if one was already set.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
