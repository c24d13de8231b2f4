use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The upstream's way of saying "no data for you", one variant per signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Hard rejection, e.g. an unknown symbol or a bad API key.
    Error,
    /// Informational or premium-gate message.
    Information,
    /// Rate-limit note. The only kind worth retrying.
    Throttle,
    /// The body parsed but carried no time-series container.
    MissingData,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Error => "error",
            SignalKind::Information => "information",
            SignalKind::Throttle => "throttle",
            SignalKind::MissingData => "missing_data",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured rejection carried inside an otherwise successful response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("upstream {kind} signal for {symbol}: {message}")]
pub struct UpstreamSignalError {
    pub symbol: String,
    pub kind: SignalKind,
    pub message: String,
}

/// HTTP-layer failures: the request never produced a usable JSON body.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failure, timeout, or an error while reading the body.
    #[error("request for {symbol} failed: {source}")]
    Request {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request for {symbol} returned HTTP {status}")]
    Status {
        symbol: String,
        status: reqwest::StatusCode,
    },

    #[error("response for {symbol} is not valid JSON: {source}")]
    Decode {
        symbol: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur within a [`SeriesProvider`](super::SeriesProvider) implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Upstream(#[from] UpstreamSignalError),
}

impl ProviderError {
    pub fn signal_kind(&self) -> Option<SignalKind> {
        match self {
            ProviderError::Upstream(signal) => Some(signal.kind),
            ProviderError::Transport(_) => None,
        }
    }
}
