//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for Ctrl+C (SIGINT)
//! - Record it in the operator log and trigger shutdown of background tasks
//!
//! # Design Decisions
//! - The child is not killed here: the terminal delivers the interrupt to the
//!   whole foreground process group, so the server shuts down on its own and
//!   the supervisor keeps relaying its final output

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;
use crate::observability::Logger;

/// Spawn the interrupt watcher.
pub fn spawn_interrupt_handler(shutdown: Shutdown, logger: Logger) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger.warn("Interrupt received, waiting for the server to stop...");
                shutdown.trigger();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt signal");
            }
        }
    })
}
