//! Configuration management subsystem.
//!
//! Two independent sources feed the supervisor:
//!
//! # Data Flow
//! ```text
//! mcsm.toml (optional, developer profile)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Profile (flavor, artifact, URLs, log level)
//!
//! config.mcsm (operator settings, fetched from a template on first run)
//!     → store.rs (ensure present, read)
//!     → settings.rs (key=value parsing, typed accessors)
//!     → Settings (read once at startup, shared by reference)
//! ```
//!
//! # Design Decisions
//! - Both sources are immutable once loaded; no reload at runtime
//! - All profile fields have defaults, so the profile file is optional
//! - Operator settings stay loosely typed until a consumer asks for a type

pub mod loader;
pub mod schema;
pub mod settings;
pub mod store;
pub mod validation;

pub use schema::Profile;
pub use settings::{ConfigError, SettingValue, Settings};
pub use store::ConfigStore;
