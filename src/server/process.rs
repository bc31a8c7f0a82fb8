//! Child process invocation.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, ChildStdout, Command};

/// How to start the native server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl ServerCommand {
    /// `<java> -Xmx<ram>M -Xms<ram>M -jar <artifact> nogui`
    pub fn java(java: impl Into<OsString>, allocated_ram_mb: u32, artifact: &Path) -> Self {
        Self {
            program: java.into(),
            args: vec![
                format!("-Xmx{}M", allocated_ram_mb).into(),
                format!("-Xms{}M", allocated_ram_mb).into(),
                "-jar".into(),
                artifact.as_os_str().to_owned(),
                "nogui".into(),
            ],
        }
    }

    /// Spawn the server in `working_dir` with stdout captured.
    ///
    /// The child is killed if the returned handle is dropped before it exits.
    pub fn spawn(&self, working_dir: &Path) -> io::Result<ServerProcess> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdout not captured"))?;

        tracing::debug!(
            pid = child.id(),
            program = ?self.program,
            args = ?self.args,
            cwd = %working_dir.display(),
            "Server process spawned"
        );

        Ok(ServerProcess {
            child,
            stdout: Some(stdout),
        })
    }
}

/// A running server process.
pub struct ServerProcess {
    child: Child,
    stdout: Option<ChildStdout>,
}

impl ServerProcess {
    /// Take the captured stdout stream. Returns `None` after the first call.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the process to exit on its own.
    pub async fn wait(&mut self) -> io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }

    /// Stop the process and reap it.
    pub async fn terminate(&mut self) -> io::Result<()> {
        match self.child.kill().await {
            Ok(()) => Ok(()),
            // Already exited between the last read and the kill.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e),
        }
    }
}
