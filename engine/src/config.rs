//! Import configuration.
//!
//! Options come from defaults, then environment variables (a `.env` file is
//! loaded by the binary through dotenvy), then CLI flags.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `ROWMAP_DELIMITER` | Single delimiter character, `\t` for tab |
//! | `ROWMAP_ENCODING` | Input encoding label (`utf-8`, `windows-1252`, ...) |
//! | `ROWMAP_HAS_HEADERS` | `true`/`false`, whether the first line is a header |
//! | `ROWMAP_MAX_REPORTED_ERRORS` | How many skipped rows are logged individually |

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::mapping::MappingNode;

pub const ENV_DELIMITER: &str = "ROWMAP_DELIMITER";
pub const ENV_ENCODING: &str = "ROWMAP_ENCODING";
pub const ENV_HAS_HEADERS: &str = "ROWMAP_HAS_HEADERS";
pub const ENV_MAX_REPORTED_ERRORS: &str = "ROWMAP_MAX_REPORTED_ERRORS";

/// Options for reading and importing a CSV file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Delimiter (auto-detect if None)
    pub delimiter: Option<char>,

    /// First line is a header row
    pub has_headers: bool,

    /// Input encoding (auto-detect if None)
    pub encoding: Option<String>,

    /// Skipped rows logged one by one before summarizing
    pub max_reported_errors: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_headers: true,
            encoding: None,
            max_reported_errors: 5,
        }
    }
}

impl ImportOptions {
    /// Defaults overridden by `ROWMAP_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(value) = lookup(ENV_DELIMITER) {
            options.delimiter = Some(parse_delimiter(ENV_DELIMITER, &value)?);
        }
        if let Some(value) = lookup(ENV_ENCODING) {
            let value = value.trim();
            if !value.is_empty() {
                options.encoding = Some(value.to_string());
            }
        }
        if let Some(value) = lookup(ENV_HAS_HEADERS) {
            options.has_headers = parse_bool(ENV_HAS_HEADERS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_REPORTED_ERRORS) {
            options.max_reported_errors =
                value.trim().parse().map_err(|e: std::num::ParseIntError| {
                    invalid(ENV_MAX_REPORTED_ERRORS, &value, e.to_string())
                })?;
        }

        Ok(options)
    }
}

fn invalid(key: &'static str, value: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        message: message.into(),
    }
}

/// Parse a delimiter setting. Accepts one character or the escape `\t`.
pub fn parse_delimiter(key: &'static str, value: &str) -> ConfigResult<char> {
    if value == "\\t" {
        return Ok('\t');
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(invalid(key, value, "expected a single ASCII character")),
    }
}

fn parse_bool(key: &'static str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

/// Load a mapping tree from a JSON file.
pub fn load_mapping<P: AsRef<Path>>(path: P) -> ConfigResult<MappingNode> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(MappingNode::from_json(&content)?)
}
