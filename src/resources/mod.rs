//! Resource acquisition.
//!
//! # Responsibilities
//! - Fetch the operator config template when `config.mcsm` is missing
//! - Download the server artifact when it is missing, either directly or as
//!   part of a resource bundle unpacked into the server root
//!
//! # Design Decisions
//! - No retries or backoff: a failed fetch is fatal at startup
//! - Downloads stream into a `.part` file that is renamed on completion, so
//!   an interrupted download never looks like a valid artifact

pub mod bundle;
pub mod download;
pub mod template;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use bundle::install_bundle;
pub use download::{download, ensure_artifact};
pub use template::fetch_template;

/// Error type for resource acquisition.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to unpack {path}: {source}")]
    Unpack { path: PathBuf, source: io::Error },

    #[error("{artifact} not found after unpacking {url}")]
    ArtifactMissing { artifact: String, url: String },

    #[error("unpack task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// HTTP client used for every resource request.
pub fn http_client() -> Result<reqwest::Client, ResourceError> {
    reqwest::Client::builder()
        .user_agent(concat!("mcsm/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ResourceError::Client)
}

/// Send a GET request and require a success status.
async fn get(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, ResourceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ResourceError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ResourceError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(response)
}
