//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load profile → Init tracing → Open log → Ensure config and artifact
//!     → Read settings → Spawn backup tasks → Run supervisor
//!
//! Shutdown (shutdown.rs):
//!     Supervisor finished or Ctrl+C → broadcast → backup loops exit
//!
//! Signals (signals.rs):
//!     SIGINT → log + trigger shutdown (the child handles its own interrupt)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: nothing is spawned until every fallible setup step has
//!   succeeded
//! - Backup tasks are never joined; process exit ends them

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError, StartupOptions};
