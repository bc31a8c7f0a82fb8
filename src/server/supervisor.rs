//! Server lifecycle supervisor.
//!
//! # Responsibilities
//! - Fix the effective endpoint and memory allocation once, at construction
//! - Drive the child through the bootstrap runs and the final run
//! - Merge operator settings into `server.properties` before the final run
//! - Relay classified child output to the operator log
//!
//! # Design Decisions
//! - Phase 2 ends on a log substring (`Loading properties`); the server
//!   offers no other signal, so the wording is part of the contract
//! - Exit statuses are reported, never retried

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;
use tokio::process::ChildStdout;

use crate::config::schema::ServerProfile;
use crate::config::settings::{self, ConfigError, SettingValue, Settings};
use crate::net::{resolve_host, Endpoint, PortAllocator, PortError};
use crate::observability::Logger;
use crate::server::eula::{self, Acceptance, EULA_FILE};
use crate::server::phase::Phase;
use crate::server::process::{ServerCommand, ServerProcess};
use crate::server::properties::{self, PROPERTIES_FILE};
use crate::server::relay::OutputRelay;

/// Substring the server logs while reading its properties file.
pub const PROPERTIES_SENTINEL: &str = "Loading properties";

/// Below this allocation a performance warning is logged.
pub const LOW_MEMORY_THRESHOLD_MB: u32 = 3072;

/// Port used when the settings do not name one.
pub const DEFAULT_SERVER_PORT: u16 = 25565;

const EULA_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Error type for the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("bootstrap integrity failure during {phase}: {detail}")]
    BootstrapIntegrity { phase: Phase, detail: String },

    #[error("failed to start server process {program:?}: {source}")]
    Spawn {
        program: std::ffi::OsString,
        source: io::Error,
    },

    #[error("I/O error during {phase}: {source}")]
    Io { phase: Phase, source: io::Error },

    #[error("invalid server-ip {value:?}: {source}")]
    Address {
        value: String,
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Port(#[from] PortError),
}

/// Owns the native server process for the whole run.
pub struct Supervisor {
    data_dir: PathBuf,
    settings: Settings,
    endpoint: Endpoint,
    allocated_ram: u32,
    profile: ServerProfile,
    command: ServerCommand,
    logger: Logger,
    phase: Phase,
}

impl Supervisor {
    /// Resolve the endpoint and memory allocation from `settings`.
    ///
    /// The resolved address and port are written back into the settings so
    /// the properties merge advertises them.
    pub async fn new(
        profile: &ServerProfile,
        data_dir: &Path,
        mut settings: Settings,
        logger: Logger,
    ) -> Result<Self, SupervisorError> {
        let configured_ip = settings.text(settings::SERVER_IP);
        let host = resolve_host(configured_ip.as_deref())
            .await
            .map_err(|source| SupervisorError::Address {
                value: configured_ip.clone().unwrap_or_default(),
                source,
            })?;

        let requested = settings.port().unwrap_or(DEFAULT_SERVER_PORT);
        let port = PortAllocator::new(logger.clone())
            .allocate(host, requested)
            .await?;

        settings.set(settings::SERVER_IP, SettingValue::Text(host.to_string()));
        settings.set(settings::SERVER_PORT, SettingValue::Int(port.into()));

        let allocated_ram = settings.allocated_ram()?;
        let command = ServerCommand::java(
            &profile.java,
            allocated_ram,
            &data_dir.join(&profile.artifact),
        );

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            settings,
            endpoint: Endpoint { host, port },
            allocated_ram,
            profile: profile.clone(),
            command,
            logger,
            phase: Phase::BootstrapEula,
        })
    }

    /// Replace the launch command.
    pub fn with_command(mut self, command: ServerCommand) -> Self {
        self.command = command;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Effective settings, including the resolved address and port.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Drive the state machine to `Terminated`.
    ///
    /// Returns the final run's exit status, or `None` if the supervisor had
    /// already terminated.
    pub async fn run(&mut self) -> Result<Option<ExitStatus>, SupervisorError> {
        let mut exit = None;

        while self.phase != Phase::Terminated {
            let next = match self.phase {
                Phase::BootstrapEula => self.bootstrap_eula().await?,
                Phase::BootstrapProperties => self.bootstrap_properties().await?,
                Phase::Running => {
                    let status = self.run_server().await?;
                    self.report_exit(status);
                    exit = Some(status);
                    Phase::Terminated
                }
                Phase::Terminated => Phase::Terminated,
            };
            tracing::debug!(from = %self.phase, to = %next, "Phase transition");
            self.phase = next;
        }

        Ok(exit)
    }

    async fn bootstrap_eula(&mut self) -> Result<Phase, SupervisorError> {
        let eula_path = self.data_dir.join(EULA_FILE);

        if eula_path.is_file() {
            self.record_acceptance(&eula_path)?;
            return Ok(if self.data_dir.join(PROPERTIES_FILE).is_file() {
                Phase::Running
            } else {
                Phase::BootstrapProperties
            });
        }

        print_separator();
        self.logger.info("Initializing Server... (Phase 1)");

        let mut process = self.spawn()?;
        let mut relay = OutputRelay::new(self.stdout(&mut process)?);

        tokio::select! {
            drained = relay.drain() => {
                drained.map_err(|source| self.io_error(source))?;
                process.wait().await.map_err(|source| self.io_error(source))?;
            }
            _ = wait_for_eula(&eula_path) => {
                tracing::debug!("License file written, stopping phase 1 run");
                process.terminate().await.map_err(|source| self.io_error(source))?;
            }
        }

        if !eula_path.is_file() {
            return Err(self.integrity(format!(
                "{} was not created by the server",
                eula_path.display()
            )));
        }
        self.record_acceptance(&eula_path)?;

        Ok(Phase::BootstrapProperties)
    }

    async fn bootstrap_properties(&mut self) -> Result<Phase, SupervisorError> {
        self.logger.info("Initializing Server... (Phase 2)");

        let mut process = self.spawn()?;
        let mut relay = OutputRelay::new(self.stdout(&mut process)?);
        let mut sentinel_seen = false;

        while let Some(record) = relay
            .next_record()
            .await
            .map_err(|source| self.io_error(source))?
        {
            if record.message.contains(PROPERTIES_SENTINEL) {
                sentinel_seen = true;
                break;
            }
            record.forward(&self.logger);
        }

        if sentinel_seen {
            process.terminate().await.map_err(|source| self.io_error(source))?;
        } else {
            let status = process.wait().await.map_err(|source| self.io_error(source))?;
            return Err(self.integrity(format!(
                "server exited ({}) before reporting \"{}\"",
                status, PROPERTIES_SENTINEL
            )));
        }

        let properties_path = self.data_dir.join(PROPERTIES_FILE);
        if !properties_path.is_file() {
            return Err(self.integrity(format!(
                "{} was not created by the server",
                properties_path.display()
            )));
        }

        Ok(Phase::Running)
    }

    async fn run_server(&mut self) -> Result<ExitStatus, SupervisorError> {
        let properties_path = self.data_dir.join(PROPERTIES_FILE);
        if !properties_path.is_file() {
            return Err(self.integrity(format!("{} is missing", properties_path.display())));
        }

        self.logger.log("SERVER", "Starting Server...");
        print_separator();
        println!("{}", self.banner());
        print_separator();

        let changed = properties::merge(&properties_path, &self.settings)
            .map_err(|source| self.io_error(source))?;
        tracing::debug!(changed, "Merged settings into server.properties");

        if let Some(warning) = low_memory_warning(self.allocated_ram) {
            self.logger.warn(&warning);
        }

        let mut process = self.spawn()?;
        let mut relay = OutputRelay::new(self.stdout(&mut process)?);

        while let Some(record) = relay
            .next_record()
            .await
            .map_err(|source| self.io_error(source))?
        {
            record.forward(&self.logger);
        }

        process.wait().await.map_err(|source| self.io_error(source))
    }

    fn record_acceptance(&self, path: &Path) -> Result<(), SupervisorError> {
        match eula::accept(path).map_err(|source| self.io_error(source))? {
            Acceptance::Recorded => self.logger.info("Agreed to Mojang's EULA."),
            Acceptance::AlreadyAccepted => {
                tracing::debug!(path = %path.display(), "License already accepted")
            }
        }
        Ok(())
    }

    fn report_exit(&self, status: ExitStatus) {
        if status.success() {
            self.logger.log("SERVER", "Server stopped.");
        } else {
            self.logger
                .warn(&format!("Server process exited with {}.", status));
        }
    }

    /// Operator-facing startup banner.
    pub fn banner(&self) -> String {
        format!(
            "Minecraft Server Maker\n\
             Running {}\n\
             IP Address: {}\n\
             Version: {} {}\n\
             Allocated RAM: {}MB ({} GB)\n\
             > REQUIRES LAN CONNECTION <",
            self.settings.server_name(),
            self.endpoint,
            self.profile.flavor,
            self.profile.version,
            self.allocated_ram,
            f64::from(self.allocated_ram) / 1024.0,
        )
    }

    fn spawn(&self) -> Result<ServerProcess, SupervisorError> {
        self.command
            .spawn(&self.data_dir)
            .map_err(|source| SupervisorError::Spawn {
                program: self.command.program.clone(),
                source,
            })
    }

    fn stdout(&self, process: &mut ServerProcess) -> Result<ChildStdout, SupervisorError> {
        process.take_stdout().ok_or_else(|| {
            self.io_error(io::Error::new(io::ErrorKind::BrokenPipe, "stdout already taken"))
        })
    }

    fn io_error(&self, source: io::Error) -> SupervisorError {
        SupervisorError::Io {
            phase: self.phase,
            source,
        }
    }

    fn integrity(&self, detail: String) -> SupervisorError {
        SupervisorError::BootstrapIntegrity {
            phase: self.phase,
            detail,
        }
    }
}

/// Warning logged when the allocation is below [`LOW_MEMORY_THRESHOLD_MB`].
pub fn low_memory_warning(allocated_ram_mb: u32) -> Option<String> {
    (allocated_ram_mb < LOW_MEMORY_THRESHOLD_MB).then(|| {
        format!(
            "The allocated ram is set to {}MB. Running a server with less than 3GB \
             of memory might cause performance issues.",
            allocated_ram_mb
        )
    })
}

/// Resolves once the license file exists and holds the `eula=` line.
async fn wait_for_eula(path: &Path) {
    loop {
        if let Ok(content) = tokio::fs::read_to_string(path).await {
            if content.contains("eula=") {
                return;
            }
        }
        tokio::time::sleep(EULA_POLL_INTERVAL).await;
    }
}

fn print_separator() {
    println!("{}", "-".repeat(125));
}
