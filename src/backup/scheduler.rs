//! Periodic backup loop.
//!
//! # Responsibilities
//! - Read the target's settings once, at construction
//! - Archive the source directory every cooldown until cancelled
//!
//! # Design Decisions
//! - Cooldown is measured between the end of one archive and the start of
//!   the next; a slow archive never causes overlapping cycles
//! - Cancellation is checked at the top of every cycle and during the sleep
//! - A failed cycle is logged and ends the loop; there is no retry policy

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::backup::archive::{archive_name, create_archive};
use crate::config::{ConfigError, Settings};
use crate::observability::Logger;

/// Cooldown used when the settings do not name one.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3600);

/// Error type for backups.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to prepare backup directory {path}: {source}")]
    Directory { path: PathBuf, source: io::Error },

    #[error("failed to archive {origin} into {output}: {source}")]
    Archive {
        origin: PathBuf,
        output: PathBuf,
        source: io::Error,
    },

    #[error("archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// What a scheduler backs up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupTarget {
    /// The whole world directory, minus its lock file.
    World,
    /// Only `world/playerdata`.
    Playerdata,
}

impl BackupTarget {
    /// Prefix of this target's settings (`<prefix>`, `<prefix>-path`, ...).
    pub fn setting_prefix(self) -> &'static str {
        match self {
            BackupTarget::World => "backups",
            BackupTarget::Playerdata => "playerdata-backups",
        }
    }

    pub fn source(self, root: &Path) -> PathBuf {
        match self {
            BackupTarget::World => root.join("world"),
            BackupTarget::Playerdata => root.join("world").join("playerdata"),
        }
    }

    pub fn default_destination(self, root: &Path) -> PathBuf {
        let leaf = match self {
            BackupTarget::World => "Server",
            BackupTarget::Playerdata => "Playerdata",
        };
        root.join("MCSM-Backups").join(leaf)
    }

    /// Live files skipped when archiving, relative to the source.
    pub fn excluded(self) -> &'static [&'static str] {
        match self {
            BackupTarget::World => &["session.lock"],
            BackupTarget::Playerdata => &[],
        }
    }

    fn label(self) -> &'static str {
        match self {
            BackupTarget::World => "Backup",
            BackupTarget::Playerdata => "Playerdata Backup",
        }
    }

    fn setting(self, suffix: &str) -> String {
        format!("{}-{}", self.setting_prefix(), suffix)
    }
}

/// Periodically archives one backup target.
pub struct BackupScheduler {
    target: BackupTarget,
    enabled: bool,
    notify: bool,
    cooldown: Duration,
    source: PathBuf,
    destination: PathBuf,
    logger: Logger,
}

impl BackupScheduler {
    /// Read the target's settings and prepare its backup directory.
    pub fn new(
        target: BackupTarget,
        root: &Path,
        settings: &Settings,
        logger: Logger,
    ) -> Result<Self, BackupError> {
        let enabled = settings.flag(target.setting_prefix(), true)?;
        let notify = settings.flag(&target.setting("notify"), false)?;
        let cooldown = settings.seconds(&target.setting("cooldown"), DEFAULT_COOLDOWN)?;

        let destination = match settings.text(&target.setting("path")).map(PathBuf::from) {
            Some(path) if path.is_dir() => path,
            _ => {
                let fallback = target.default_destination(root);
                logger.log(
                    "BACKUPS/WARN",
                    &format!(
                        "{}s path is unspecified or does not exist. Defaulted to {}.",
                        target.label(),
                        fallback.display()
                    ),
                );
                fallback
            }
        };
        std::fs::create_dir_all(&destination).map_err(|source| BackupError::Directory {
            path: destination.clone(),
            source,
        })?;

        Ok(Self {
            target,
            enabled,
            notify,
            cooldown,
            source: target.source(root),
            destination,
            logger,
        })
    }

    pub fn target(&self) -> BackupTarget {
        self.target
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Run until cancelled. Returns at once when the target is disabled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.enabled {
            self.logger.log(
                "BACKUPS/INFO",
                &format!(
                    "The {} setting is set to False, so no backups will be made. \
                     You can change this by setting \"{}\" to True.",
                    self.target.setting_prefix(),
                    self.target.setting_prefix().to_uppercase()
                ),
            );
            return;
        }

        tracing::info!(
            source = %self.source.display(),
            destination = %self.destination.display(),
            cooldown_secs = self.cooldown.as_secs_f64(),
            "Backup scheduler starting"
        );

        loop {
            match shutdown.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => break,
            }

            match self.cycle().await {
                Ok(Some(saved)) if self.notify => self.logger.log(
                    "BACKUPS/INFO",
                    &format!("{} created. Saved at '{}'.", self.target.label(), saved.display()),
                ),
                Ok(_) => {}
                Err(e) => {
                    self.logger.log(
                        "BACKUPS/ERROR",
                        &format!(
                            "{} failed: {}. No further {}s will be made this session.",
                            self.target.label(),
                            e,
                            self.target.label().to_lowercase()
                        ),
                    );
                    return;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.cooldown) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!(backup = ?self.target, "Backup scheduler received shutdown signal, exiting loop");
    }

    /// Archive once. Returns `None` when the source does not exist yet.
    pub async fn cycle(&self) -> Result<Option<PathBuf>, BackupError> {
        if !self.source.is_dir() {
            tracing::debug!(source = %self.source.display(), "Backup source not created yet, skipping cycle");
            return Ok(None);
        }

        let output = self.destination.join(archive_name(&Local::now()));
        let source = self.source.clone();
        let excluded = self.target.excluded();
        let archive_path = output.clone();

        tokio::task::spawn_blocking(move || create_archive(&source, &archive_path, excluded))
            .await?
            .map_err(|source| BackupError::Archive {
                origin: self.source.clone(),
                output: output.clone(),
                source,
            })?;

        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(config: &str) -> (tempfile::TempDir, Settings, Logger) {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::open_with_console(&dir.path().join("mcsm_logs"), false).unwrap();
        (dir, Settings::parse(config).unwrap(), logger)
    }

    fn log_of(dir: &tempfile::TempDir) -> String {
        std::fs::read_to_string(dir.path().join("mcsm_logs").join("latest.log")).unwrap()
    }

    #[test]
    fn test_targets() {
        let root = Path::new("/srv/mc");
        assert_eq!(BackupTarget::World.source(root), root.join("world"));
        assert_eq!(
            BackupTarget::Playerdata.source(root),
            root.join("world").join("playerdata")
        );
        assert_eq!(BackupTarget::World.excluded(), &["session.lock"]);
        assert!(BackupTarget::Playerdata.excluded().is_empty());
        assert_eq!(
            BackupTarget::Playerdata.default_destination(root),
            root.join("MCSM-Backups").join("Playerdata")
        );
    }

    #[test]
    fn test_settings_are_read_per_target() {
        let (dir, settings, logger) = setup(
            "backups-cooldown=12.5\nplayerdata-backups-cooldown=2\nplayerdata-backups=False\n",
        );

        let world = BackupScheduler::new(BackupTarget::World, dir.path(), &settings, logger.clone()).unwrap();
        let players = BackupScheduler::new(BackupTarget::Playerdata, dir.path(), &settings, logger).unwrap();

        assert_eq!(world.cooldown(), Duration::from_millis(12_500));
        assert!(world.enabled);
        assert_eq!(players.cooldown(), Duration::from_secs(2));
        assert!(!players.enabled);
    }

    #[test]
    fn test_missing_path_falls_back_with_warning() {
        let (dir, settings, logger) = setup("backups-path=/definitely/not/here\n");
        let scheduler = BackupScheduler::new(BackupTarget::World, dir.path(), &settings, logger).unwrap();

        assert_eq!(scheduler.destination(), dir.path().join("MCSM-Backups").join("Server"));
        assert!(scheduler.destination().is_dir());
        assert!(log_of(&dir).contains("[MCSM/BACKUPS/WARN] Backups path is unspecified or does not exist."));
    }

    #[test]
    fn test_existing_path_is_used() {
        let (dir, _, logger) = setup("");
        let custom = dir.path().join("elsewhere");
        std::fs::create_dir_all(&custom).unwrap();
        let settings = Settings::parse(&format!("backups-path={}\n", custom.display())).unwrap();

        let scheduler = BackupScheduler::new(BackupTarget::World, dir.path(), &settings, logger).unwrap();
        assert_eq!(scheduler.destination(), custom);
    }

    #[test]
    fn test_invalid_cooldown_is_rejected() {
        let (dir, settings, logger) = setup("backups-cooldown=soon\n");
        let result = BackupScheduler::new(BackupTarget::World, dir.path(), &settings, logger);
        assert!(matches!(result, Err(BackupError::Config(_))));
    }

    #[tokio::test]
    async fn test_disabled_returns_immediately() {
        let (dir, settings, logger) = setup("backups=False\n");
        let scheduler = BackupScheduler::new(BackupTarget::World, dir.path(), &settings, logger).unwrap();
        let (_tx, rx) = broadcast::channel(1);

        tokio::time::timeout(Duration::from_secs(5), scheduler.run(rx))
            .await
            .expect("disabled scheduler should not loop");
        assert!(log_of(&dir).contains("[MCSM/BACKUPS/INFO] The backups setting is set to False"));
    }

    #[tokio::test]
    async fn test_cycle_skips_missing_source() {
        let (dir, settings, logger) = setup("");
        let scheduler = BackupScheduler::new(BackupTarget::World, dir.path(), &settings, logger).unwrap();
        assert!(scheduler.cycle().await.unwrap().is_none());
    }
}
