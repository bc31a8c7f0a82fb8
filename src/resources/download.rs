//! Server artifact download with progress reporting.

use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::config::schema::ServerProfile;
use crate::observability::Logger;
use crate::resources::{get, install_bundle, ResourceError};

const BAR_WIDTH: usize = 50;

/// Download the profile's artifact into `root` unless it is already there.
///
/// With a `bundle_url` the bundle is unpacked into `root` and must contain
/// the artifact. Returns the artifact path.
pub async fn ensure_artifact(
    client: &reqwest::Client,
    profile: &ServerProfile,
    root: &Path,
    logger: &Logger,
) -> Result<PathBuf, ResourceError> {
    let artifact = root.join(&profile.artifact);
    if artifact.is_file() {
        tracing::debug!(path = %artifact.display(), "Server artifact present");
        return Ok(artifact);
    }

    logger.info(&format!(
        "Server artifact {} not detected. Downloading...",
        profile.artifact
    ));

    if let Some(bundle_url) = &profile.bundle_url {
        install_bundle(client, bundle_url, root, logger).await?;
        if !artifact.is_file() {
            return Err(ResourceError::ArtifactMissing {
                artifact: profile.artifact.clone(),
                url: bundle_url.clone(),
            });
        }
        return Ok(artifact);
    }

    logger.info(&format!("URL: {}", profile.artifact_url));

    let bytes = download(client, &profile.artifact_url, &artifact).await?;
    logger.info(&format!(
        "Downloaded {} ({:.1} MB).",
        profile.artifact,
        bytes as f64 / (1024.0 * 1024.0)
    ));

    Ok(artifact)
}

/// Stream `url` into `destination`. Returns the number of bytes written.
pub async fn download(
    client: &reqwest::Client,
    url: &str,
    destination: &Path,
) -> Result<u64, ResourceError> {
    let partial = partial_path(destination);
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ResourceError::Io { path, source }
    };

    let mut response = get(client, url).await?;
    let total = response.content_length();

    let mut file = tokio::fs::File::create(&partial)
        .await
        .map_err(io_error(&partial))?;
    let mut written: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| ResourceError::Http {
            url: url.to_string(),
            source,
        })?
    {
        file.write_all(&chunk).await.map_err(io_error(&partial))?;
        written += chunk.len() as u64;
        print_progress(written, total);
    }
    file.flush().await.map_err(io_error(&partial))?;
    drop(file);
    println!();

    tokio::fs::rename(&partial, destination)
        .await
        .map_err(io_error(destination))?;

    Ok(written)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// One progress line. Without a known total only the byte count is shown.
pub fn render_progress(written: u64, total: Option<u64>) -> String {
    let megabytes = written as f64 / (1024.0 * 1024.0);
    match total.filter(|t| *t > 0) {
        Some(total) => {
            let fraction = (written as f64 / total as f64).min(1.0);
            let filled = (fraction * BAR_WIDTH as f64) as usize;
            format!(
                "PROGRESS: [{}{}] {:.1}% ({:.1} MB)",
                "#".repeat(filled),
                " ".repeat(BAR_WIDTH - filled),
                fraction * 100.0,
                megabytes
            )
        }
        None => format!("PROGRESS: {:.1} MB", megabytes),
    }
}

fn print_progress(written: u64, total: Option<u64>) {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "\r{}", render_progress(written, total));
    let _ = stdout.flush();
}
