//! Canonical row shape of the destination table.

use serde::{Deserialize, Serialize};

/// One daily price record for one symbol.
///
/// Field names match the destination table columns; the struct serializes
/// directly into the JSON object sent to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub symbol: String,
    /// ISO calendar date (`YYYY-MM-DD`).
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// RFC 3339 UTC timestamp shared by every row fetched for the symbol in one run.
    pub fetched_at: String,
}

impl PriceRow {
    /// Deterministic per-row identifier used as the store's insert-id hint.
    pub fn insert_id(&self) -> String {
        format!("{}_{}", self.symbol, self.date)
    }
}
