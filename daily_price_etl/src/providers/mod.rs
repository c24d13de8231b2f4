//! Provider abstraction for daily price sources.
//!
//! This module defines the [`SeriesProvider`] trait, the seam between the run
//! orchestrator and a concrete market-data vendor. A provider performs exactly
//! one request per call and classifies every failure into a
//! [`ProviderError`]; it never retries on its own; retry policy belongs to the
//! caller.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use daily_price_etl::models::{raw_series::RawSeries, symbol::Symbol};
//! use daily_price_etl::providers::{ProviderError, SeriesProvider};
//!
//! struct EmptyProvider;
//!
//! #[async_trait]
//! impl SeriesProvider for EmptyProvider {
//!     async fn fetch_daily(&self, _symbol: &Symbol) -> Result<RawSeries, ProviderError> {
//!         Ok(RawSeries::new())
//!     }
//! }
//! ```

pub mod alpha_vantage;
pub mod errors;

pub use errors::{ProviderError, SignalKind, TransportError, UpstreamSignalError};

use async_trait::async_trait;

use crate::models::{raw_series::RawSeries, symbol::Symbol};

/// Fetches the recent daily series for one symbol.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Issues a single request for `symbol`.
    ///
    /// # Returns
    ///
    /// * `Ok(RawSeries)` - date → raw record, in upstream order, not yet
    ///   validated numerically.
    /// * `Err(ProviderError)` - a transport failure or an upstream signal.
    async fn fetch_daily(&self, symbol: &Symbol) -> Result<RawSeries, ProviderError>;
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::models::raw_series::RawBar;

    struct FixedProvider;
    struct ThrottledProvider;

    #[async_trait]
    impl SeriesProvider for FixedProvider {
        async fn fetch_daily(&self, _symbol: &Symbol) -> Result<RawSeries, ProviderError> {
            let mut series = RawSeries::new();
            series.insert("2024-01-02".to_string(), RawBar::default());
            Ok(series)
        }
    }

    #[async_trait]
    impl SeriesProvider for ThrottledProvider {
        async fn fetch_daily(&self, symbol: &Symbol) -> Result<RawSeries, ProviderError> {
            Err(UpstreamSignalError {
                symbol: symbol.to_string(),
                kind: SignalKind::Throttle,
                message: "slow down".to_string(),
            }
            .into())
        }
    }

    fn get_provider(throttled: bool) -> Box<dyn SeriesProvider> {
        if throttled {
            Box::new(ThrottledProvider)
        } else {
            Box::new(FixedProvider)
        }
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let symbol = Symbol::parse("ibm").unwrap();

        let series = get_provider(false).fetch_daily(&symbol).await.unwrap();
        assert_eq!(series.len(), 1);

        let err = get_provider(true).fetch_daily(&symbol).await.unwrap_err();
        assert_eq!(err.signal_kind(), Some(SignalKind::Throttle));
        assert_eq!(
            err.to_string(),
            "upstream throttle signal for IBM: slow down"
        );
    }
}
