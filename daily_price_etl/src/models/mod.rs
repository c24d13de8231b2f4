pub mod price_row;
pub mod raw_series;
pub mod symbol;
pub mod table;
