//! License-acceptance file handling.

use std::fs;
use std::io;
use std::path::Path;

/// File the native server writes on first start.
pub const EULA_FILE: &str = "eula.txt";

/// Line marking the license as accepted.
pub const ACCEPTED: &str = "eula=true";

/// Outcome of [`accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// The file already ended with the acceptance line.
    AlreadyAccepted,
    /// The file was rewritten.
    Recorded,
}

/// Rewrite `content` so its last line is the acceptance marker.
///
/// Trailing whitespace-only lines are dropped first, then the final line is
/// replaced. Every earlier line is kept byte for byte. The result has no
/// trailing newline. Returns `None` when the last line already accepts and
/// nothing follows it.
pub fn accepted_content(content: &str) -> Option<String> {
    let mut lines: Vec<&str> = content.split_inclusive('\n').collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    if lines.last().map(|line| line.trim_end_matches(['\r', '\n'])) == Some(ACCEPTED)
        && lines.len() == content.split_inclusive('\n').count()
    {
        return None;
    }

    lines.pop();
    let mut rewritten: String = lines.concat();
    rewritten.push_str(ACCEPTED);
    Some(rewritten)
}

/// Record acceptance in the file at `path`.
pub fn accept(path: &Path) -> io::Result<Acceptance> {
    let content = fs::read_to_string(path)?;
    match accepted_content(&content) {
        None => Ok(Acceptance::AlreadyAccepted),
        Some(rewritten) => {
            fs::write(path, rewritten)?;
            Ok(Acceptance::Recorded)
        }
    }
}
