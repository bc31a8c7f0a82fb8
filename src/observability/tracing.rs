//! Diagnostic tracing setup.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber for internal diagnostics
//!   (port probing, process spawning, shutdown)
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the profile's `observability.log_level`
//! - Diagnostics go to stderr so they never mix with the operator log on stdout

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("mcsm=warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
