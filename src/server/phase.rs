//! Supervisor phases.
//!
//! # State Transitions
//! ```text
//! BootstrapEula ──────────────▶ BootstrapProperties ──▶ Running ──▶ Terminated
//!       │                                                  ▲
//!       └── (already bootstrapped: eula and properties) ───┘
//! ```
//!
//! No phase is retried. A failure in either bootstrap phase is fatal.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// First run: let the server write its license file, then accept it.
    BootstrapEula,
    /// Second run: let the server materialize `server.properties`.
    BootstrapProperties,
    /// Final run: relay output until the server exits.
    Running,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::BootstrapEula => "bootstrap-eula",
            Phase::BootstrapProperties => "bootstrap-properties",
            Phase::Running => "running",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
