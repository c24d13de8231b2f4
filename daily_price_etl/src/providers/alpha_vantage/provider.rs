use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use tracing::debug;

use crate::models::{raw_series::RawSeries, symbol::Symbol};
use crate::providers::alpha_vantage::params::{OutputSize, construct_params};
use crate::providers::alpha_vantage::response::DailySeriesResponse;
use crate::providers::{ProviderError, SeriesProvider, TransportError};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Upper bound on one request, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AlphaVantageProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    output_size: OutputSize,
}

impl AlphaVantageProvider {
    /// Creates a provider with its own HTTP client bounded by [`REQUEST_TIMEOUT`].
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        output_size: OutputSize,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            output_size,
        })
    }
}

#[async_trait]
impl SeriesProvider for AlphaVantageProvider {
    async fn fetch_daily(&self, symbol: &Symbol) -> Result<RawSeries, ProviderError> {
        let query = construct_params(symbol, &self.api_key, self.output_size);
        debug!(%symbol, outputsize = %self.output_size, "requesting daily series");

        // `without_url` keeps the api key in the query string out of error messages.
        let request_error = |source: reqwest::Error| TransportError::Request {
            symbol: symbol.to_string(),
            source: source.without_url(),
        };

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                symbol: symbol.to_string(),
                status,
            }
            .into());
        }

        let body = response.text().await.map_err(request_error)?;
        let payload: DailySeriesResponse =
            serde_json::from_str(&body).map_err(|source| TransportError::Decode {
                symbol: symbol.to_string(),
                source,
            })?;

        let series = payload.into_series(symbol, &body)?;
        debug!(%symbol, dates = series.len(), "received daily series");
        Ok(series)
    }
}
