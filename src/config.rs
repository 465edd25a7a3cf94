//! Run settings and variable override sources.
//! Overrides can come from `key:value` command-line pairs, a JSON or YAML file,
//! or JSON read from stdin.

use crate::diagnostics::Level;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// What the renderer does after reporting a reference to an undeclared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Expand the token to empty text and keep rendering.
    #[default]
    Continue,
    /// Abandon the file being rendered; the run continues with the next entry.
    SkipFile,
}

/// Configuration of a generation or export run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Write into an existing, non-empty destination directory.
    pub overwrite: bool,
    /// Raise on Error-level diagnostics instead of recording them.
    pub raise_errors: bool,
    /// Diagnostics below this level are dropped.
    pub log_level: Level,
    pub unresolved: UnresolvedPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            overwrite: false,
            raise_errors: false,
            log_level: Level::Info,
            unresolved: UnresolvedPolicy::Continue,
        }
    }
}

/// Variable overrides, in the order they were supplied.
pub type Overrides = IndexMap<String, String>;

/// Splits a `key:value` argument at its first colon.
///
/// # Errors
/// * `Error::ConfigError` if there is no colon or the key is empty
pub fn parse_override(arg: &str) -> Result<(String, String)> {
    match arg.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::ConfigError(format!(
            "Invalid variable override '{}', expected <key>:<value>",
            arg
        ))),
    }
}

/// A value in an overrides document. Scalars are stringified.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OverrideValue {
    Text(String),
    Flag(bool),
    Number(serde_json::Number),
    Empty(()),
    Nested(IgnoredAny),
}

/// Parses an overrides document. JSON is tried first, then YAML.
///
/// # Arguments
/// * `content` - Raw document contents
///
/// # Returns
/// * `Result<Overrides>` - Flat map of variable names to string values
///
/// # Errors
/// * `Error::ConfigError` if the document is neither JSON nor YAML, or holds
///   nested values
pub fn parse_overrides(content: &str) -> Result<Overrides> {
    if content.trim().is_empty() {
        return Ok(Overrides::new());
    }
    let raw: IndexMap<String, OverrideValue> = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid overrides format: {}", e)))?,
    };

    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                OverrideValue::Text(s) => s,
                OverrideValue::Flag(b) => b.to_string(),
                OverrideValue::Number(n) => n.to_string(),
                OverrideValue::Empty(()) => String::new(),
                OverrideValue::Nested(_) => {
                    return Err(Error::ConfigError(format!(
                        "Variable '{}' must be a scalar value",
                        key
                    )))
                }
            };
            Ok((key, value))
        })
        .collect()
}

pub fn load_overrides_file<P: AsRef<Path>>(path: P) -> Result<Overrides> {
    let path = path.as_ref();
    debug!("Loading variable overrides from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(Error::IoError)?;
    parse_overrides(&content)
}

pub fn load_overrides_from_stdin() -> Result<Overrides> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_overrides(&buffer)
}

/// Merges override sources; later sources win.
pub fn merge_overrides<I>(sources: I) -> Overrides
where
    I: IntoIterator<Item = Overrides>,
{
    let mut merged = Overrides::new();
    for source in sources {
        merged.extend(source);
    }
    merged
}
