//! Compressed directory snapshots.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use flate2::write::GzEncoder;
use flate2::Compression;

/// Archive name for `now`: `YYYY-M-D.H.MIN.tar.gz`, unpadded.
///
/// Two cycles within the same minute share a name.
pub fn archive_name(now: &DateTime<Local>) -> String {
    format!("{}.tar.gz", now.format("%Y-%-m-%-d.%-H.%-M"))
}

/// Write a gzip-compressed tarball of `source` to `output`.
///
/// Entry names are relative to `source`. Paths listed in `exclude`
/// (relative to `source`) are skipped. The archive is built in
/// `<output>.part` and renamed over `output` once complete; on failure the
/// partial file is removed and `output` is left as it was.
///
/// Files may change while they are read. Each entry holds exactly the size
/// seen when the file was opened: growth is cut off, shrinkage is padded
/// with zeros.
pub fn create_archive(source: &Path, output: &Path, exclude: &[&str]) -> io::Result<()> {
    if !source.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", source.display()),
        ));
    }

    let partial = partial_path(output);
    if let Err(e) = write_archive(source, &partial, exclude) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    if output.is_file() {
        fs::remove_file(output)?;
    }
    fs::rename(&partial, output)
}

fn write_archive(source: &Path, partial: &Path, exclude: &[&str]) -> io::Result<()> {
    let encoder = GzEncoder::new(BufWriter::new(File::create(partial)?), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    append_tree(&mut builder, source, source, exclude)?;

    builder.into_inner()?.finish()?.flush()
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    output.with_file_name(name)
}

fn append_tree<W: Write>(
    builder: &mut tar::Builder<W>,
    root: &Path,
    dir: &Path,
    exclude: &[&str],
) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if exclude.iter().any(|excluded| relative == Path::new(excluded)) {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            builder.append_dir(relative, &path)?;
            append_tree(builder, root, &path, exclude)?;
        } else if file_type.is_symlink() {
            builder.append_path_with_name(&path, relative)?;
        } else if file_type.is_file() {
            append_file(builder, &path, relative)?;
        }
    }

    Ok(())
}

/// Append a regular file as a snapshot of its size at open time.
fn append_file<W: Write>(
    builder: &mut tar::Builder<W>,
    path: &Path,
    relative: &Path,
) -> io::Result<()> {
    let file = match File::open(path) {
        Ok(file) => file,
        // Deleted between listing and opening.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    let metadata = file.metadata()?;
    let len = metadata.len();

    let mut header = tar::Header::new_gnu();
    header.set_metadata(&metadata);
    header.set_size(len);

    let contents = file.take(len).chain(io::repeat(0)).take(len);
    builder.append_data(&mut header, relative, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flate2::read::GzDecoder;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn entries(archive: &Path) -> BTreeSet<String> {
        let mut tarball = tar::Archive::new(GzDecoder::new(File::open(archive).unwrap()));
        tarball
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().trim_end_matches('/').to_string())
            .collect()
    }

    fn world(dir: &Path) -> std::path::PathBuf {
        let world = dir.join("world");
        fs::create_dir_all(world.join("playerdata")).unwrap();
        fs::write(world.join("level.dat"), b"level").unwrap();
        fs::write(world.join("session.lock"), b"lock").unwrap();
        fs::write(world.join("playerdata").join("steve.dat"), b"steve").unwrap();
        world
    }

    #[test]
    fn test_archive_name_is_unpadded() {
        let now = Local.with_ymd_and_hms(2022, 1, 5, 7, 3, 59).unwrap();
        assert_eq!(archive_name(&now), "2022-1-5.7.3.tar.gz");

        let later = Local.with_ymd_and_hms(2021, 12, 26, 18, 45, 0).unwrap();
        assert_eq!(archive_name(&later), "2021-12-26.18.45.tar.gz");
    }

    #[test]
    fn test_lock_file_is_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let source = world(dir.path());
        let output = dir.path().join("backup.tar.gz");

        create_archive(&source, &output, &["session.lock"]).unwrap();

        let names = entries(&output);
        assert!(names.contains("level.dat"));
        assert!(names.contains("playerdata/steve.dat"));
        assert!(!names.contains("session.lock"));
    }

    #[test]
    fn test_same_name_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let source = world(dir.path());
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups).unwrap();

        let now = Local.with_ymd_and_hms(2022, 3, 4, 10, 20, 0).unwrap();
        let output = backups.join(archive_name(&now));

        create_archive(&source, &output, &[]).unwrap();
        fs::write(source.join("level.dat"), b"second cycle").unwrap();
        create_archive(&source, &output, &[]).unwrap();

        assert_eq!(fs::read_dir(&backups).unwrap().count(), 1);

        let mut tarball = tar::Archive::new(GzDecoder::new(File::open(&output).unwrap()));
        let mut level = String::new();
        for entry in tarball.entries().unwrap() {
            let mut entry = entry.unwrap();
            if entry.path().unwrap() == Path::new("level.dat") {
                entry.read_to_string(&mut level).unwrap();
            }
        }
        assert_eq!(level, "second cycle");
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = create_archive(&dir.path().join("nope"), &dir.path().join("out.tar.gz"), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_file_growing_during_archive() {
        let dir = tempfile::tempdir().unwrap();
        let source = world(dir.path());
        let region = source.join("r.0.0.mca");
        fs::write(&region, vec![7u8; 16 * 1024 * 1024]).unwrap();
        let output = dir.path().join("live.tar.gz");

        let stop = Arc::new(AtomicBool::new(false));
        let writer = {
            let stop = Arc::clone(&stop);
            let region = region.clone();
            std::thread::spawn(move || {
                let mut file = fs::OpenOptions::new().append(true).open(&region).unwrap();
                while !stop.load(Ordering::Relaxed) {
                    file.write_all(&[1u8; 4096]).unwrap();
                }
            })
        };

        let result = create_archive(&source, &output, &["session.lock"]);
        stop.store(true, Ordering::Relaxed);
        writer.join().unwrap();
        result.unwrap();

        let mut tarball = tar::Archive::new(GzDecoder::new(File::open(&output).unwrap()));
        let mut region_len = None;
        let mut names = BTreeSet::new();
        for entry in tarball.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            assert_eq!(data.len() as u64, entry.header().size().unwrap());
            if name == "r.0.0.mca" {
                assert!(data[..16 * 1024 * 1024].iter().all(|b| *b == 7));
                region_len = Some(data.len());
            }
            names.insert(name);
        }

        assert!(region_len.unwrap() >= 16 * 1024 * 1024);
        assert!(names.contains("level.dat"));
        assert!(!dir.path().join("live.tar.gz.part").exists());
    }

    #[test]
    fn test_failed_archive_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = world(dir.path());
        let output = dir.path().join("missing-dir").join("out.tar.gz");

        assert!(create_archive(&source, &output, &[]).is_err());
        assert!(!output.exists());
        assert!(!dir.path().join("missing-dir").join("out.tar.gz.part").exists());

        let kept = dir.path().join("kept.tar.gz");
        create_archive(&source, &kept, &[]).unwrap();
        let before = fs::read(&kept).unwrap();
        assert!(create_archive(&dir.path().join("gone"), &kept, &[]).is_err());
        assert_eq!(fs::read(&kept).unwrap(), before);
    }
}
