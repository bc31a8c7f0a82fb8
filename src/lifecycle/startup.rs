//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the profile and install diagnostics
//! - Open the operator log and acquire missing resources
//! - Start the backup tasks and hand control to the supervisor
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Backup tasks start before the server so the first cycle runs at once

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backup::{BackupError, BackupScheduler, BackupTarget};
use crate::config::loader::{load_profile_or_default, ProfileError};
use crate::config::{ConfigError, ConfigStore};
use crate::lifecycle::signals::spawn_interrupt_handler;
use crate::lifecycle::Shutdown;
use crate::observability::{self, Logger};
use crate::resources::{ensure_artifact, http_client, ResourceError};
use crate::server::{Supervisor, SupervisorError};

/// Name of the operator log directory inside the server root.
pub const LOGS_DIR: &str = "mcsm_logs";

/// Name of the optional profile inside the server root.
pub const PROFILE_FILE: &str = "mcsm.toml";

/// Top-level error; every variant is fatal.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("backups: {0}")]
    Backup(#[from] BackupError),

    #[error("failed to prepare {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Where to run.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    /// Server root; the child runs with this as its working directory.
    pub root: PathBuf,
    /// Profile file; defaults to `<root>/mcsm.toml`.
    pub profile: Option<PathBuf>,
}

impl StartupOptions {
    pub fn logs_dir(&self) -> PathBuf {
        logs_dir(&self.root)
    }

    fn profile_path(&self) -> PathBuf {
        self.profile
            .clone()
            .unwrap_or_else(|| self.root.join(PROFILE_FILE))
    }
}

/// Operator log directory for `root`.
pub fn logs_dir(root: &Path) -> PathBuf {
    root.join(LOGS_DIR)
}

/// Run the supervisor to completion.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let profile = load_profile_or_default(&options.profile_path())?;
    observability::tracing::init(&profile.observability);

    tracing::info!(
        root = %options.root.display(),
        flavor = %profile.server.flavor,
        version = %profile.server.version,
        "mcsm starting"
    );

    let root = options.root.as_path();
    std::fs::create_dir_all(root).map_err(|source| StartupError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let logs = options.logs_dir();
    let logger = Logger::open(&logs).map_err(|source| StartupError::Io { path: logs, source })?;

    let client = http_client()?;
    let store = ConfigStore::in_root(root);
    store
        .ensure_exists(&client, &profile.resources.config_template_url, &logger)
        .await?;
    ensure_artifact(&client, &profile.server, root, &logger).await?;

    let settings = store.load()?;

    let shutdown = Shutdown::new();
    spawn_interrupt_handler(shutdown.clone(), logger.clone());

    let schedulers = [BackupTarget::World, BackupTarget::Playerdata]
        .into_iter()
        .map(|target| BackupScheduler::new(target, root, &settings, logger.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    for scheduler in schedulers {
        tokio::spawn(scheduler.run(shutdown.subscribe()));
    }

    let mut supervisor = Supervisor::new(&profile.server, root, settings, logger.clone()).await?;
    let result = supervisor.run().await;

    shutdown.trigger();
    logger.flush();
    tracing::info!(phase = %supervisor.phase(), "Supervisor finished");

    result?;
    Ok(())
}
