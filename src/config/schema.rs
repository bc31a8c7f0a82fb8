//! Launcher profile schema.
//!
//! The profile describes which server build the supervisor runs and where
//! its resources come from. All types derive Serde traits for
//! deserialization from TOML, and every field has a default so an absent
//! profile file yields a working Fabric setup.

use serde::{Deserialize, Serialize};

/// Root launcher profile.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Profile {
    /// Server build and launch settings.
    pub server: ServerProfile,

    /// Remote resources.
    pub resources: ResourcesConfig,

    /// Diagnostics settings.
    pub observability: ObservabilityConfig,
}

/// Server flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Vanilla,
    Fabric,
    Forge,
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flavor::Vanilla => write!(f, "Vanilla"),
            Flavor::Fabric => write!(f, "Fabric"),
            Flavor::Forge => write!(f, "Forge"),
        }
    }
}

/// Server build and launch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerProfile {
    /// Server flavor, shown in the startup banner.
    pub flavor: Flavor,

    /// Game version, shown in the startup banner.
    pub version: String,

    /// Artifact file name inside the server root (e.g., "fabric-1.18.1.jar").
    pub artifact: String,

    /// Where to download the artifact from when it is missing.
    pub artifact_url: String,

    /// Archive (zip or tar.gz) holding the artifact and its libraries.
    /// When set, it is unpacked into the server root instead of
    /// downloading `artifact_url`. Forge servers ship this way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_url: Option<String>,

    /// Java executable used to launch the artifact.
    pub java: String,
}

impl Default for ServerProfile {
    fn default() -> Self {
        Self {
            flavor: Flavor::Fabric,
            version: "1.18.1".to_string(),
            artifact: "fabric-1.18.1.jar".to_string(),
            artifact_url:
                "https://meta.fabricmc.net/v2/versions/loader/1.18.1/0.12.12/0.10.2/server/jar"
                    .to_string(),
            bundle_url: None,
            java: "java".to_string(),
        }
    }
}

/// Remote resource locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Plain-text template written to `config.mcsm` when it is missing.
    pub config_template_url: String,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            config_template_url:
                "https://raw.githubusercontent.com/MrKelpy/MCSMs/master/resources/CONFIG_TEMPLATE3.0.txt"
                    .to_string(),
        }
    }
}

/// Diagnostics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "mcsm=warn".to_string(),
        }
    }
}
