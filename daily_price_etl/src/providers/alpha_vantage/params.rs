use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::models::symbol::Symbol;

/// The only API function this provider calls.
pub const FUNCTION_DAILY: &str = "TIME_SERIES_DAILY";

/// How much history the upstream returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSize {
    /// The latest ~100 trading days.
    #[default]
    Compact,
    /// Twenty-plus years of history. Understood, but refused by configuration.
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            other => Err(format!("unknown output size {other:?}, expected \"compact\"")),
        }
    }
}

/// Builds the query string pairs for one daily-series request.
pub fn construct_params(
    symbol: &Symbol,
    api_key: &SecretString,
    output_size: OutputSize,
) -> Vec<(&'static str, String)> {
    vec![
        ("function", FUNCTION_DAILY.to_string()),
        ("symbol", symbol.to_string()),
        ("apikey", api_key.expose_secret().to_string()),
        ("outputsize", output_size.as_str().to_string()),
    ]
}
