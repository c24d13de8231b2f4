use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{price_row::PriceRow, table::TableRef};

/// A row plus the insert-id hint the store uses for best-effort dedup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRow {
    pub insert_id: String,
    #[serde(rename = "json")]
    pub row: PriceRow,
}

/// One bulk insert request.
///
/// Serializes directly into the body of a BigQuery `tabledata.insertAll`
/// call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertBatch {
    /// Insert the valid rows even if some rows are invalid.
    pub skip_invalid_rows: bool,
    /// Accept values that do not match the table schema instead of failing the row.
    pub ignore_unknown_values: bool,
    pub rows: Vec<InsertRow>,
}

impl InsertBatch {
    /// Builds a lenient batch where every row is keyed by [`PriceRow::insert_id`].
    pub fn new(rows: &[PriceRow]) -> Self {
        Self {
            skip_invalid_rows: true,
            ignore_unknown_values: true,
            rows: rows
                .iter()
                .map(|row| InsertRow {
                    insert_id: row.insert_id(),
                    row: row.clone(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single reported problem with a single row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The errors the store reported for the row at `index` of the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowInsertError {
    pub index: usize,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    /// The store accepted the request but rejected some rows.
    #[error("{table} rejected {} row(s): {}", .errors.len(), summarize(.errors))]
    RowErrors {
        table: String,
        errors: Vec<RowInsertError>,
    },

    /// Connection failure, timeout, or an unreadable response.
    #[error("insert request to {table} failed: {source}")]
    Request {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("insert request to {table} returned HTTP {status}: {body}")]
    Status {
        table: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to obtain an access token: {0}")]
    Auth(String),
}

fn summarize(errors: &[RowInsertError]) -> String {
    errors
        .iter()
        .map(|e| {
            let detail = e
                .errors
                .iter()
                .map(|d| {
                    format!(
                        "{}: {}",
                        d.reason.as_deref().unwrap_or("unknown"),
                        d.message.as_deref().unwrap_or("")
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("row {} [{}]", e.index, detail)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// A destination that accepts bulk row inserts.
#[async_trait]
pub trait TableWriter: Send + Sync {
    /// Submits `batch` to `table` in a single request.
    ///
    /// # Returns
    ///
    /// * `Ok(errors)` - the per-row errors the store reported; empty when every
    ///   row was accepted.
    /// * `Err(LoadError)` - the request itself failed.
    async fn insert_all(
        &self,
        table: &TableRef,
        batch: &InsertBatch,
    ) -> Result<Vec<RowInsertError>, LoadError>;
}
