//! Native server supervision subsystem.
//!
//! # Data Flow
//! ```text
//! Settings + Profile
//!     → supervisor.rs (endpoint, memory, launch command)
//!     → process.rs (spawn java child, stdout piped)
//!     → relay.rs (byte lines → de-duplicated LogRecords)
//!         → parser.rs (message + level)
//!     → Logger (SERVER/<level>)
//!
//! Between runs:
//!     eula.rs (accept license)  properties.rs (merge settings)
//! ```

pub mod eula;
pub mod parser;
pub mod phase;
pub mod process;
pub mod properties;
pub mod relay;
pub mod supervisor;

pub use phase::Phase;
pub use process::ServerCommand;
pub use supervisor::{Supervisor, SupervisorError};
