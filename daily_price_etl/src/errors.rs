use shared_utils::config::ConfigError;
use thiserror::Error;

use crate::io::sink::LoadError;
use crate::providers::{ProviderError, SignalKind, TransportError, UpstreamSignalError};
use crate::transform::MalformedRecordError;

/// The unified error type for the `daily_price_etl` crate.
///
/// Every failure of a run surfaces as one of these variants. Only
/// [`Error::UpstreamSignal`] with [`SignalKind::Throttle`] is ever retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration; raised before any network call.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The price request failed at the HTTP layer.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The upstream answered, but with a rejection instead of data.
    #[error("Upstream signal: {0}")]
    UpstreamSignal(#[from] UpstreamSignalError),

    /// A numeric field or date did not parse.
    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] MalformedRecordError),

    /// The destination store rejected the write.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

impl Error {
    /// Stable snake_case name of the variant, used in the final log line.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Transport(_) => "transport",
            Error::UpstreamSignal(_) => "upstream_signal",
            Error::MalformedRecord(_) => "malformed_record",
            Error::Load(_) => "load",
        }
    }

    pub fn signal_kind(&self) -> Option<SignalKind> {
        match self {
            Error::UpstreamSignal(signal) => Some(signal.kind),
            _ => None,
        }
    }

    /// Whether the orchestrator may retry after this error.
    pub fn is_throttle(&self) -> bool {
        self.signal_kind() == Some(SignalKind::Throttle)
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(e) => Error::Transport(e),
            ProviderError::Upstream(e) => Error::UpstreamSignal(e),
        }
    }
}
