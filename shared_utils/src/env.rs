//! Environment variable lookup with structured errors.
//!
//! Every helper reads through a [`VarSource`] so callers can resolve their
//! configuration from the real process environment ([`ProcessEnv`]) or from
//! an in-memory map in tests. Values are trimmed, and a variable that is set
//! to an empty string is treated as unset.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::config::ConfigError;

/// A source of configuration variables.
pub trait VarSource {
    /// Returns the raw value of `name`, or `None` when it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Returns the trimmed value of `name`, treating empty values as unset.
pub fn lookup(source: &impl VarSource, name: &str) -> Option<String> {
    source
        .var(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`lookup`], but a missing value is a [`ConfigError::MissingEnvVar`].
pub fn require(source: &impl VarSource, name: &str) -> Result<String, ConfigError> {
    lookup(source, name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// Returns the first of `names` that is set.
///
/// The error names every candidate, e.g. `BQ_PROJECT or GOOGLE_CLOUD_PROJECT`.
pub fn require_any(source: &impl VarSource, names: &[&str]) -> Result<String, ConfigError> {
    names
        .iter()
        .find_map(|name| lookup(source, name))
        .ok_or_else(|| ConfigError::MissingEnvVar(names.join(" or ")))
}

/// Returns the value of `name` or `default` when unset.
pub fn lookup_or(source: &impl VarSource, name: &str, default: &str) -> String {
    lookup(source, name).unwrap_or_else(|| default.to_string())
}

/// Parses `name` with [`FromStr`], falling back to `default` when unset.
pub fn parse_or<T>(source: &impl VarSource, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(source, name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(name, format!("{raw:?}: {e}"))),
        None => Ok(default),
    }
}
