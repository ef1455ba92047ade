//! Structured logging setup
//!
//! Logs go to stderr so `ask` output on stdout stays clean. `RUST_LOG`
//! overrides the level picked from `-q`/`-v`.

use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Verbosity;

/// Build the filter for a verbosity level
pub fn filter_for(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()))
}

/// Install the global subscriber; later calls are no-ops
pub fn init(verbosity: Verbosity) {
    let _ = fmt()
        .with_env_filter(filter_for(verbosity))
        .with_target(matches!(verbosity, Verbosity::VeryVerbose))
        .with_writer(std::io::stderr)
        .try_init();
}
