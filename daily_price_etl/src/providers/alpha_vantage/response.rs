use serde::Deserialize;

use crate::models::{raw_series::RawSeries, symbol::Symbol};
use crate::providers::errors::{SignalKind, UpstreamSignalError};

/// Longest body excerpt attached to a `missing_data` signal.
pub const SNIPPET_MAX_CHARS: usize = 300;

/// The subset of a `TIME_SERIES_DAILY` body this crate looks at.
///
/// Error bodies reuse the same endpoint and come back with HTTP 200, so all
/// fields are optional and [`DailySeriesResponse::into_series`] decides which
/// case applies.
#[derive(Deserialize, Debug, Default)]
pub struct DailySeriesResponse {
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Time Series (Daily)")]
    pub time_series: Option<RawSeries>,
}

impl DailySeriesResponse {
    /// Returns the series, or the upstream signal the body carries instead.
    ///
    /// Signal fields are checked in the order error, information, throttle
    /// note. `raw_body` is only used to build the diagnostic snippet when the
    /// series container is absent or empty.
    pub fn into_series(
        self,
        symbol: &Symbol,
        raw_body: &str,
    ) -> Result<RawSeries, UpstreamSignalError> {
        let signal = |kind, message: String| UpstreamSignalError {
            symbol: symbol.to_string(),
            kind,
            message,
        };

        if let Some(message) = self.error_message {
            return Err(signal(SignalKind::Error, message));
        }
        if let Some(message) = self.information {
            return Err(signal(SignalKind::Information, message));
        }
        if let Some(message) = self.note {
            return Err(signal(SignalKind::Throttle, message));
        }

        match self.time_series {
            Some(series) if !series.is_empty() => Ok(series),
            _ => Err(signal(
                SignalKind::MissingData,
                format!(
                    "no 'Time Series (Daily)' in response; snippet: {}",
                    snippet(raw_body, SNIPPET_MAX_CHARS)
                ),
            )),
        }
    }
}

/// The first `max_chars` characters of `body`.
pub fn snippet(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
