//! The `config.mcsm` file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings::{ConfigError, Settings};
use crate::observability::Logger;
use crate::resources::{fetch_template, ResourceError};

/// File name of the operator settings inside the server root.
pub const CONFIG_FILE: &str = "config.mcsm";

/// Location of the operator settings file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `config.mcsm` inside `root`.
    pub fn in_root(root: &Path) -> Self {
        Self::new(root.join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file from the template at `template_url` if it is missing.
    ///
    /// Returns `true` when the file was created. An existing file is never
    /// touched.
    pub async fn ensure_exists(
        &self,
        client: &reqwest::Client,
        template_url: &str,
        logger: &Logger,
    ) -> Result<bool, ResourceError> {
        if self.path.is_file() {
            return Ok(false);
        }

        logger.info(&format!("Creating config.mcsm file at {}", self.path.display()));
        let template = fetch_template(client, template_url).await?;

        let io_error = |source| ResourceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&self.path, template).map_err(io_error)?;

        Ok(true)
    }

    /// Read and parse the settings.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let content = fs::read_to_string(&self.path)?;
        let settings = Settings::parse(&content)?;
        tracing::debug!(path = %self.path.display(), entries = settings.len(), "Settings loaded");
        Ok(settings)
    }
}
