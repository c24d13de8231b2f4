//! Daily equity price ETL.
//!
//! Fetches the daily time series for a configured list of symbols from Alpha
//! Vantage, converts each record into a typed [`models::price_row::PriceRow`]
//! and appends the rows to a BigQuery table. See [`pipeline::Orchestrator`]
//! for the run loop.

pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod transform;

pub use errors::Error;
