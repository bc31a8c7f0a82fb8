//! Resource bundles: an archive holding the server artifact together with
//! the libraries it loads at runtime.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::observability::Logger;
use crate::resources::{download, ResourceError};

/// Name the bundle is downloaded under inside the server root. Removed once
/// unpacked.
pub const BUNDLE_FILE: &str = "RESOURCES.bundle";

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Download the bundle at `url` and unpack it into `root`.
pub async fn install_bundle(
    client: &reqwest::Client,
    url: &str,
    root: &Path,
    logger: &Logger,
) -> Result<(), ResourceError> {
    let archive = root.join(BUNDLE_FILE);

    logger.info("Downloading resource files...");
    logger.info(&format!("URL: {}", url));
    download(client, url, &archive).await?;

    let (source, into) = (archive.clone(), root.to_path_buf());
    let unpacked = tokio::task::spawn_blocking(move || unpack(&source, &into)).await?;
    let removed = std::fs::remove_file(&archive);

    unpacked.map_err(|source| ResourceError::Unpack {
        path: archive.clone(),
        source,
    })?;
    removed.map_err(|source| ResourceError::Io {
        path: archive,
        source,
    })?;

    logger.info("Resource files unpacked.");
    Ok(())
}

/// Unpack a zip or gzip-compressed tar archive into `into`, detected by its
/// leading bytes.
pub fn unpack(archive: &Path, into: &Path) -> io::Result<()> {
    let mut magic = [0u8; 4];
    let read = File::open(archive)?.read(&mut magic)?;
    let magic = &magic[..read];

    if magic.starts_with(&ZIP_MAGIC) {
        let mut zip = zip::ZipArchive::new(File::open(archive)?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        zip.extract(into)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    } else if magic.starts_with(&GZIP_MAGIC) {
        tar::Archive::new(GzDecoder::new(File::open(archive)?)).unpack(into)
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} is neither a zip nor a tar.gz archive", archive.display()),
        ))
    }
}
