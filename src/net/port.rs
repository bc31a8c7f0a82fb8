//! Port allocation by probe-then-release.
//!
//! # Responsibilities
//! - Find the first port at or above the configured one that can be bound
//! - Record every probe to the operator log file (not the console)
//!
//! # Design Decisions
//! - The probe listener is dropped before returning; the port is not
//!   reserved, so another process may take it before the server binds
//! - Only "address in use" moves the scan forward; every other socket
//!   error is fatal
//! - The scan has no iteration limit; it only stops at the end of the
//!   port range

use std::io;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::observability::Logger;

/// Error type for port allocation.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("failed to probe {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("no free port on {host} at or above {start}")]
    Exhausted { host: IpAddr, start: u16 },
}

/// Finds usable ports on a host.
pub struct PortAllocator {
    logger: Logger,
}

impl PortAllocator {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Return the first bindable port on `host` at or above `start`.
    pub async fn allocate(&self, host: IpAddr, start: u16) -> Result<u16, PortError> {
        let mut candidate = start;

        loop {
            let addr = SocketAddr::new(host, candidate);
            self.logger.log_file_only(
                "INFO",
                &format!("Testing PORT \"{}\" with HOST \"{}\"", candidate, host),
            );

            match TcpListener::bind(addr).await {
                Ok(probe) => {
                    drop(probe);
                    self.logger.log_file_only(
                        "INFO",
                        &format!("PORT \"{}\" is open, Server IP is now set to {}", candidate, addr),
                    );
                    tracing::debug!(%addr, "Port probe succeeded");
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                    let next = candidate
                        .checked_add(1)
                        .ok_or(PortError::Exhausted { host, start })?;
                    self.logger.log_file_only(
                        "INFO",
                        &format!("PORT \"{}\" is being used, trying PORT {}", candidate, next),
                    );
                    candidate = next;
                }
                Err(source) => return Err(PortError::Bind { addr, source }),
            }
        }
    }
}
