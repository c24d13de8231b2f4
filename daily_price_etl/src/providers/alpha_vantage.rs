//! Alpha Vantage `TIME_SERIES_DAILY` provider.

pub mod params;
pub mod provider;
pub mod response;

pub use params::OutputSize;
pub use provider::{AlphaVantageProvider, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
