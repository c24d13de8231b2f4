//! The bulk-load step of a symbol's run.

use tracing::info;

use crate::io::sink::{InsertBatch, LoadError, TableWriter};
use crate::models::{price_row::PriceRow, symbol::Symbol, table::TableRef};

/// Inserts `rows` into `table` with one writer call.
///
/// An empty slice is a no-op that never touches the writer. Any per-row
/// error reported by the store fails the whole load with
/// [`LoadError::RowErrors`]; nothing is retried here.
///
/// # Returns
///
/// The number of rows submitted.
pub async fn load_rows(
    writer: &dyn TableWriter,
    table: &TableRef,
    symbol: &Symbol,
    rows: &[PriceRow],
) -> Result<usize, LoadError> {
    if rows.is_empty() {
        info!(%symbol, %table, "no rows to load");
        return Ok(0);
    }

    let batch = InsertBatch::new(rows);
    let errors = writer.insert_all(table, &batch).await?;
    if !errors.is_empty() {
        return Err(LoadError::RowErrors {
            table: table.to_string(),
            errors,
        });
    }

    info!(%symbol, %table, rows = batch.len(), "loaded rows");
    Ok(batch.len())
}
