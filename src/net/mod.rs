//! Network endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! server-ip setting  → host.rs (literal, looked-up name, or local address)
//! server-port setting → port.rs (probe upwards until bindable)
//!     → Endpoint (fixed for the rest of the run)
//! ```

pub mod host;
pub mod port;

use std::fmt;
use std::net::{IpAddr, SocketAddr};

pub use host::resolve_host;
pub use port::{PortAllocator, PortError};

/// Address the server is advertised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub host: IpAddr,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", SocketAddr::new(self.host, self.port))
    }
}
