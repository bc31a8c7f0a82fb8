//! Operator settings (`config.mcsm`).
//!
//! # Format
//! ```text
//! # comment
//! // comment
//! server_name=My Server
//! server-port=25565
//! ```
//! One `key=value` per line. The key is the leftmost `=` segment, the value
//! the rightmost one. Keys are case-insensitive and the last occurrence wins.
//!
//! # Design Decisions
//! - Only `server-port` is typed at parse time; everything else stays text
//!   and is interpreted by the typed accessors on demand
//! - An empty value means "unset"; callers substitute computed defaults

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Key holding the advertised server port.
pub const SERVER_PORT: &str = "server-port";
/// Key holding the bind address; empty means "resolve the local address".
pub const SERVER_IP: &str = "server-ip";
/// Key holding the heap size in megabytes.
pub const ALLOCATED_RAM: &str = "allocated_ram";
/// Key holding the human-readable server name.
pub const SERVER_NAME: &str = "server_name";

pub const DEFAULT_ALLOCATED_RAM_MB: u32 = 4096;
pub const DEFAULT_SERVER_NAME: &str = "Minecraft Server";

/// Error produced while reading or interpreting operator settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected `key=value`, got {content:?}")]
    MissingSeparator { line: usize, content: String },

    #[error("setting `{key}` has invalid value {value:?}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// A single setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Int(i64),
    Text(String),
}

impl SettingValue {
    /// Text view of the value. Integers are rendered in decimal.
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            SettingValue::Int(n) => n.to_string().into(),
            SettingValue::Text(s) => s.as_str().into(),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Int(n) => write!(f, "{}", n),
            SettingValue::Text(s) => f.write_str(s),
        }
    }
}

/// Flat, case-insensitive mapping of operator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, SettingValue>,
}

impl Settings {
    /// Parse the contents of a settings file.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();

        for (index, line) in significant_lines(content) {
            let Some((key, _)) = line.split_once('=') else {
                return Err(ConfigError::MissingSeparator {
                    line: index + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim().to_lowercase();
            let raw = line.rsplit('=').next().unwrap_or_default().trim();

            let value = if key == SERVER_PORT {
                SettingValue::Int(parse_port(raw)?.into())
            } else {
                SettingValue::Text(raw.to_string())
            };
            values.insert(key, value);
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(&key.to_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value. Used to record computed overrides such as
    /// the resolved address and allocated port.
    pub fn set(&mut self, key: &str, value: SettingValue) {
        self.values.insert(key.to_lowercase(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text value of `key`, or `None` when it is missing or empty.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.as_text().into_owned())
            .filter(|v| !v.is_empty())
    }

    /// Boolean flag. Accepts `true`/`false` in any case; missing or empty
    /// falls back to `default`.
    pub fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.text(key) {
            None => Ok(default),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
            Some(v) => Err(invalid(key, v, "True or False")),
        }
    }

    /// Unsigned integer value, or `default` when unset.
    pub fn unsigned(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        match self.text(key) {
            None => Ok(default),
            Some(v) => v
                .parse()
                .map_err(|_| invalid(key, v, "a whole, non-negative number")),
        }
    }

    /// Fractional seconds, or `default` when unset.
    pub fn seconds(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        match self.text(key) {
            None => Ok(default),
            Some(v) => v
                .parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or_else(|| invalid(key, v, "a non-negative number of seconds")),
        }
    }

    /// Configured server port, if any.
    pub fn port(&self) -> Option<u16> {
        match self.get(SERVER_PORT)? {
            SettingValue::Int(n) => u16::try_from(*n).ok(),
            SettingValue::Text(s) => s.parse().ok(),
        }
    }

    pub fn allocated_ram(&self) -> Result<u32, ConfigError> {
        self.unsigned(ALLOCATED_RAM, DEFAULT_ALLOCATED_RAM_MB)
    }

    pub fn server_name(&self) -> String {
        self.text(SERVER_NAME)
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string())
    }
}

/// Lines that carry a setting, paired with their zero-based line index.
///
/// Comment (`#`, `//`) and blank lines are dropped; order is preserved.
pub fn significant_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.parse()
        .map_err(|_| invalid(SERVER_PORT, raw.to_string(), "a port number between 0 and 65535"))
}

fn invalid(key: &str, value: String, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value,
        expected,
    }
}
