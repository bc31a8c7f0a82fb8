//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor, backup tasks, startup
//!     → logging.rs (operator records: latest.log + console)
//!
//! Internal diagnostics
//!     → tracing.rs (tracing events to stderr, filtered by RUST_LOG)
//! ```
//!
//! # Design Decisions
//! - The operator log is a domain artifact with a fixed line format
//! - Diagnostics use structured `tracing` fields and stay off stdout

pub mod logging;
pub mod tracing;

pub use logging::Logger;
