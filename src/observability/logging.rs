//! Operator log sink.
//!
//! # Responsibilities
//! - Format leveled records as `[D/M/YYYY H:MM][MCSM/LEVEL] message`
//! - Append every record to `latest.log`, echoing to the console unless the
//!   record is file-only
//! - Rotate the previous session's `latest.log` into a gzip archive on open
//!
//! # Design Decisions
//! - One process-wide sink behind a cloneable handle; every task receives a
//!   clone of the same handle
//! - A single mutex guards the file write and the console echo together, so
//!   records from concurrent tasks never interleave
//! - Write failures are reported through `tracing` and never propagate

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use flate2::write::GzEncoder;
use flate2::Compression;

/// Name of the live log file inside the logs directory.
pub const LATEST_LOG: &str = "latest.log";

const SESSION_HEADER: &str = "LOGGING SESSION #";

/// Cloneable handle to the operator log.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    console: bool,
    file: Mutex<BufWriter<File>>,
}

impl Logger {
    /// Open a new logging session in `logs_dir`, rotating any previous one.
    pub fn open(logs_dir: &Path) -> io::Result<Self> {
        Self::open_with_console(logs_dir, true)
    }

    /// Like [`Logger::open`], with console echo configurable.
    pub fn open_with_console(logs_dir: &Path, console: bool) -> io::Result<Self> {
        fs::create_dir_all(logs_dir)?;
        let path = logs_dir.join(LATEST_LOG);

        if path.is_file() {
            let archived = rotate(&path)?;
            tracing::debug!(archive = %archived.display(), "Rotated previous log session");
        }

        let mut file = BufWriter::new(File::create(&path)?);
        writeln!(file, "{}{}", SESSION_HEADER, session_id(&Local::now()))?;
        file.flush()?;

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                console,
                file: Mutex::new(file),
            }),
        })
    }

    /// Path of the live log file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Record a message to the log file and the console.
    pub fn log(&self, level: &str, message: &str) {
        self.write(level, message, self.inner.console);
    }

    /// Record a message to the log file only.
    pub fn log_file_only(&self, level: &str, message: &str) {
        self.write(level, message, false);
    }

    pub fn info(&self, message: &str) {
        self.log("INFO", message);
    }

    pub fn warn(&self, message: &str) {
        self.log("WARN", message);
    }

    /// Flush buffered records. Called once at normal exit.
    pub fn flush(&self) {
        let mut file = match self.inner.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = file.flush() {
            tracing::warn!(error = %e, "Failed to flush operator log");
        }
    }

    fn write(&self, level: &str, message: &str, console: bool) {
        let line = format_record(&Local::now(), level, message);

        let mut file = match self.inner.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(file, "{}", line).and_then(|_| file.flush()) {
            tracing::warn!(error = %e, path = %self.inner.path.display(), "Failed to write operator log");
        }
        if console {
            println!("{}", line);
        }
    }
}

/// Format one record.
pub fn format_record(now: &DateTime<Local>, level: &str, message: &str) -> String {
    format!(
        "[{}][MCSM/{}] {}",
        now.format("%-d/%-m/%Y %-H:%M"),
        level,
        message.trim()
    )
}

/// Append a crude fatal record to `latest.log`, bypassing any open session.
///
/// Used by the top-level error handler when the process is about to abort.
/// Its own failures are ignored.
pub fn write_fatal(logs_dir: &Path, text: &str) {
    let _ = fs::create_dir_all(logs_dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(logs_dir.join(LATEST_LOG));
    if let Ok(mut file) = file {
        let _ = writeln!(file, "[FATAL ERROR] {}", text);
    }
}

fn session_id(now: &DateTime<Local>) -> String {
    now.format("%Y.%-m.%-d.%-H.%-M.%-S").to_string()
}

/// Compress `latest` into `<session>.log.gz` next to it and remove it.
fn rotate(latest: &Path) -> io::Result<PathBuf> {
    let session = read_session_id(latest)?.unwrap_or_else(|| {
        let modified = fs::metadata(latest)
            .and_then(|m| m.modified())
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());
        session_id(&modified)
    });

    let dir = latest.parent().unwrap_or_else(|| Path::new("."));
    let mut target = dir.join(format!("{}.log.gz", session));
    let mut suffix = 1;
    while target.exists() {
        target = dir.join(format!("{}-{}.log.gz", session, suffix));
        suffix += 1;
    }

    let mut source = File::open(latest)?;
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(&target)?), Compression::default());
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?.flush()?;
    drop(source);

    fs::remove_file(latest)?;
    Ok(target)
}

fn read_session_id(path: &Path) -> io::Result<Option<String>> {
    let mut first = String::new();
    BufReader::new(File::open(path)?).read_line(&mut first)?;
    Ok(first
        .trim()
        .strip_prefix(SESSION_HEADER)
        .filter(|id| !id.is_empty() && !id.contains(['/', '\\']))
        .map(str::to_string))
}
