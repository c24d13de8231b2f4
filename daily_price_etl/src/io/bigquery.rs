//! BigQuery streaming-insert writer.

pub mod auth;
pub mod writer;

pub use auth::{CredentialsSource, TokenProvider};
pub use writer::{BigQueryWriter, DEFAULT_API_URL};
