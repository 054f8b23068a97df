//! Internal diagnostics.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for the service's own diagnostics
//! - Pick the level from `RUST_LOG`, falling back to configuration
//!
//! # Design Decisions
//! - Diagnostics are separate from the product log file: they never reach
//!   delivery sinks, so a sink cannot feed on its own failures

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize the global tracing subscriber. Safe to call more than once.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("logrelay={},tower_http=info", config.log_level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
