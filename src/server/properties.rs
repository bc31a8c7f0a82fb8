//! Native `server.properties` merging.
//!
//! Lines whose key matches an operator setting get the setting's value.
//! Comments, unknown keys, line order and line endings are preserved, so
//! merging is idempotent.

use std::fs;
use std::io;
use std::path::Path;

use crate::config::Settings;

/// Properties file the native server reads on every start.
pub const PROPERTIES_FILE: &str = "server.properties";

/// Merge `settings` into properties text. Returns the new text and the
/// number of lines whose value changed.
pub fn merge_content(content: &str, settings: &Settings) -> (String, usize) {
    let mut merged = String::with_capacity(content.len());
    let mut changed = 0;

    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\r', '\n']);
        let ending = &line[body.len()..];

        let replacement = property_key(body).and_then(|key| {
            let value = settings.get(key.trim())?.as_text().into_owned();
            Some(format!("{}={}", key, value))
        });

        match replacement {
            Some(updated) => {
                if updated != body {
                    changed += 1;
                }
                merged.push_str(&updated);
                merged.push_str(ending);
            }
            None => merged.push_str(line),
        }
    }

    (merged, changed)
}

/// Merge `settings` into the properties file at `path`, in place.
pub fn merge(path: &Path, settings: &Settings) -> io::Result<usize> {
    let content = fs::read_to_string(path)?;
    let (merged, changed) = merge_content(&content, settings);
    if merged != content {
        fs::write(path, merged)?;
    }
    Ok(changed)
}

/// Key of a `key=value` line; `None` for comments and lines without `=`.
fn property_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') || trimmed.starts_with('!') {
        return None;
    }
    line.split_once('=').map(|(key, _)| key)
}
