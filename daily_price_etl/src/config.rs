//! Run configuration, resolved once from the environment.
//!
//! [`EtlConfig::from_env`] reads every variable up front and fails with a
//! [`ConfigError`] before any component is built, so a misconfigured run never
//! reaches the network. Components receive the pieces they need by value or
//! reference; nothing below this module reads the environment.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use shared_utils::config::ConfigError;
use shared_utils::env::{self, ProcessEnv, VarSource};

use crate::io::bigquery::auth::DEFAULT_METADATA_HOST;
use crate::io::bigquery::{CredentialsSource, DEFAULT_API_URL};
use crate::models::symbol::{Symbol, parse_symbol_list};
use crate::models::table::TableRef;
use crate::pipeline::RunPolicy;
use crate::providers::alpha_vantage::{DEFAULT_BASE_URL, OutputSize};

pub const DEFAULT_DATASET: &str = "stock_etl";
pub const DEFAULT_TABLE: &str = "daily_prices";
pub const DEFAULT_SYMBOLS: &str = "AAPL";

/// Market-data API settings.
#[derive(Debug)]
pub struct ApiConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub output_size: OutputSize,
}

/// Destination store settings.
#[derive(Debug)]
pub struct StoreConfig {
    pub table: TableRef,
    pub api_url: String,
    pub credentials: CredentialsSource,
}

#[derive(Debug)]
pub struct EtlConfig {
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub symbols: Vec<Symbol>,
    pub policy: RunPolicy,
}

impl EtlConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(source: &impl VarSource) -> Result<Self, ConfigError> {
        let api_key = env::require(source, "ALPHAVANTAGE_KEY")?;
        let project = env::require_any(source, &["BQ_PROJECT", "GOOGLE_CLOUD_PROJECT"])?;
        let dataset = env::lookup_or(source, "BQ_DATASET", DEFAULT_DATASET);
        let table = env::lookup_or(source, "BQ_TABLE", DEFAULT_TABLE);

        let symbols = parse_symbol_list(&env::lookup_or(source, "SYMBOLS", DEFAULT_SYMBOLS))
            .map_err(|e| ConfigError::invalid("SYMBOLS", e.to_string()))?;

        let output_size = env::parse_or(source, "OUTPUTSIZE", OutputSize::Compact)?;
        if output_size == OutputSize::Full {
            return Err(ConfigError::invalid(
                "OUTPUTSIZE",
                "full-history mode is not allowed; use \"compact\"",
            ));
        }

        let max_attempts: u32 =
            env::parse_or(source, "MAX_ATTEMPTS", RunPolicy::DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::invalid("MAX_ATTEMPTS", "must be at least 1"));
        }
        let policy = RunPolicy {
            pacing: seconds(source, "SLEEP_BETWEEN_SYMBOLS_SEC", RunPolicy::DEFAULT_PACING)?,
            max_attempts,
            backoff: seconds(source, "BACKOFF_SEC", RunPolicy::DEFAULT_BACKOFF)?,
        };

        Ok(Self {
            api: ApiConfig {
                api_key: SecretString::new(api_key.into()),
                base_url: env::lookup_or(source, "ALPHAVANTAGE_URL", DEFAULT_BASE_URL),
                output_size,
            },
            store: StoreConfig {
                table: TableRef::new(project, dataset, table),
                api_url: env::lookup_or(source, "BQ_API_URL", DEFAULT_API_URL),
                credentials: credentials(source),
            },
            symbols,
            policy,
        })
    }
}

fn seconds(
    source: &impl VarSource,
    name: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    env::parse_or(source, name, default.as_secs()).map(Duration::from_secs)
}

fn credentials(source: &impl VarSource) -> CredentialsSource {
    if let Some(token) = env::lookup(source, "BQ_ACCESS_TOKEN") {
        return CredentialsSource::AccessToken(SecretString::new(token.into()));
    }
    if let Some(path) = env::lookup(source, "GOOGLE_APPLICATION_CREDENTIALS") {
        return CredentialsSource::KeyFile(PathBuf::from(path));
    }
    CredentialsSource::MetadataServer {
        host: env::lookup_or(source, "GCE_METADATA_HOST", DEFAULT_METADATA_HOST),
    }
}
