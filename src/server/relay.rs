//! Child output relay.
//!
//! Turns the child's stdout byte stream into [`LogRecord`]s, one per
//! distinct line. A line byte-identical to the one right before it is
//! dropped; only adjacent repeats are suppressed.
//!
//! Lines longer than [`MAX_LINE_BYTES`] are split into several records.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::observability::Logger;
use crate::server::parser;

/// Longest line read as one record.
pub const MAX_LINE_BYTES: u64 = 64 * 1024;

/// One classified output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// The line as received, without its terminator.
    pub raw: String,
    pub message: String,
    pub level: String,
    /// Position among forwarded records, starting at 1.
    pub sequence: u64,
}

impl LogRecord {
    /// Level under which the record is written to the operator log.
    pub fn log_level(&self) -> String {
        format!("SERVER/{}", self.level)
    }

    /// Write the record to the operator log.
    pub fn forward(&self, logger: &Logger) {
        logger.log(&self.log_level(), &self.message);
    }
}

/// Reads classified records from a child output stream.
pub struct OutputRelay<R> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
    previous: Option<Vec<u8>>,
    sequence: u64,
}

impl<R: AsyncRead + Unpin> OutputRelay<R> {
    pub fn new(stream: R) -> Self {
        Self {
            reader: BufReader::new(stream),
            buffer: Vec::new(),
            previous: None,
            sequence: 0,
        }
    }

    /// Next distinct record, or `None` once the stream ends.
    pub async fn next_record(&mut self) -> io::Result<Option<LogRecord>> {
        loop {
            self.buffer.clear();
            let read = (&mut self.reader)
                .take(MAX_LINE_BYTES)
                .read_until(b'\n', &mut self.buffer)
                .await?;
            if read == 0 {
                return Ok(None);
            }

            let line = strip_terminator(&self.buffer);
            if self.previous.as_deref() == Some(line) {
                continue;
            }
            self.previous = Some(line.to_vec());
            self.sequence += 1;

            let raw = String::from_utf8_lossy(line).into_owned();
            let (message, level) = parser::parse(raw.trim());
            return Ok(Some(LogRecord {
                message: message.to_string(),
                level: level.to_string(),
                raw,
                sequence: self.sequence,
            }));
        }
    }

    /// Read and discard everything until the stream ends.
    pub async fn drain(&mut self) -> io::Result<()> {
        while self.next_record().await?.is_some() {}
        Ok(())
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
