//! Backup subsystem.
//!
//! # Data Flow
//! ```text
//! Settings (read once)
//!     → scheduler.rs (one task per target: world, playerdata)
//!         → every cooldown: archive.rs (tar.gz of the source directory)
//!         → <backups dir>/YYYY-M-D.H.MIN.tar.gz
//! ```
//!
//! # Design Decisions
//! - Schedulers only read world directories; they never touch the
//!   properties or license files, so they need no coordination with the
//!   supervisor
//! - Tasks are not joined at exit; an archive in flight is left as a
//!   `.part` file, never under its final name

pub mod archive;
pub mod scheduler;

pub use scheduler::{BackupError, BackupScheduler, BackupTarget};
