//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use mcsm::server::ServerCommand;
use mcsm::Logger;

/// Fake native server. Behaves like the real one across the three runs:
/// writes the license file and exits, then writes the properties file and
/// announces it, then serves until it exits on its own.
pub const FAKE_SERVER: &str = r#"
if [ ! -f eula.txt ]; then
  echo "[12:00:00] [main/WARN]: Failed to load eula.txt"
  printf 'a=1\neula=false' > eula.txt
  exit 0
fi
if [ ! -f server.properties ]; then
  echo "[12:00:01] [main/INFO]: Preparing world"
  printf 'server-port=1\nmotd=hello\n' > server.properties
  echo "[12:00:02] [Server thread/INFO]: Loading properties"
  exec sleep 30
fi
echo "[12:00:03] [Server thread/INFO]: Done!"
echo "[12:00:03] [Server thread/INFO]: Done!"
echo "[12:00:04] [Server thread/WARN]: Can't keep up!"
exit 0
"#;

/// A scratch server root with its own log and a scripted server.
pub struct ServerRoot {
    pub dir: TempDir,
    pub logger: Logger,
}

impl ServerRoot {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::open_with_console(&dir.path().join("mcsm_logs"), false).unwrap();
        Self { dir, logger }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).unwrap()
    }

    pub fn log(&self) -> String {
        self.logger.flush();
        fs::read_to_string(self.logger.path()).unwrap()
    }

    /// Command running `script` with `sh`. The script lives outside the root
    /// so it never shows up in backups or directory listings.
    pub fn script_command(&self, script: &str) -> (ServerCommand, TempDir) {
        let holder = tempfile::tempdir().unwrap();
        let path = holder.path().join("server.sh");
        fs::write(&path, script).unwrap();
        let command = ServerCommand {
            program: "sh".into(),
            args: vec![path.into_os_string()],
        };
        (command, holder)
    }
}

/// A port that was free a moment ago.
pub async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Start a mock HTTP server that answers every request with `status` and
/// `body`.
pub async fn start_mock_backend(status: u16, body: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    _ => "500 Internal Server Error",
                };
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status_text,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Client that ignores proxy environment variables.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
