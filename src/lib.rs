//! Minecraft server supervisor library.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.mcsm ──▶ config ──▶ Settings ─────────────┬──────────────────┐
//!   mcsm.toml  ──▶ config ──▶ Profile                │                  │
//!                                │                   ▼                  ▼
//!                                ▼            ┌─────────────┐   ┌──────────────┐
//!                           resources         │   server    │   │    backup    │
//!                       (template, artifact)  │ supervisor  │   │ world, player│
//!                                             │  + relay    │   │  schedulers  │
//!                                             └──────┬──────┘   └──────┬───────┘
//!                                                    │  net (endpoint) │
//!                                                    ▼                 ▼
//!                                             observability::Logger (latest.log)
//! ```
//!
//! `lifecycle` wires the pieces together and owns shutdown.

pub mod backup;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resources;
pub mod server;

pub use config::{ConfigStore, Settings};
pub use lifecycle::Shutdown;
pub use observability::Logger;
pub use server::Supervisor;
