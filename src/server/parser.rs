//! Native server log line parsing.
//!
//! The server prefixes each message with bracketed metadata ending in `]:`:
//!
//! ```text
//! [12:00:00] [Server thread/INFO]: Done (3.2s)!
//! └──── metadata ────────────────┘ └─ message ─┘
//! ```
//!
//! The level is the rightmost `/` segment of the last bracket group.
//! Lines without the delimiter (stack traces, banners) are passed through
//! at `INFO`.

/// Level assigned to lines that carry no metadata.
pub const DEFAULT_LEVEL: &str = "INFO";

const DELIMITER: &str = "]:";

/// Split a raw output line into `(message, level)`.
pub fn parse(raw: &str) -> (&str, &str) {
    let Some(split) = raw.find(DELIMITER) else {
        return (raw, DEFAULT_LEVEL);
    };

    let message = raw[split + DELIMITER.len()..].trim();
    let prefix = &raw[..split];
    let group = match prefix.rfind('[') {
        Some(open) => &prefix[open + 1..],
        None => prefix,
    };

    let level = group
        .split('/')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .last()
        .unwrap_or(DEFAULT_LEVEL);

    (message, level)
}
