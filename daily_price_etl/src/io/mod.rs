pub mod bigquery;
pub mod dry_run;
pub mod loader;
pub mod sink;

pub use loader::load_rows;
pub use sink::{InsertBatch, LoadError, RowInsertError, TableWriter};
