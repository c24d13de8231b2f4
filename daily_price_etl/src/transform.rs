//! Raw series → table rows.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;

use crate::models::{price_row::PriceRow, raw_series::RawSeries, symbol::Symbol};

/// A date in the raw series could not be turned into a [`PriceRow`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed {field} for {symbol} on {date}: {}", describe(.value))]
pub struct MalformedRecordError {
    pub symbol: String,
    pub date: String,
    pub field: &'static str,
    /// The offending raw value, `None` when the field was absent.
    pub value: Option<String>,
}

fn describe(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("{v:?}"),
        None => "missing".to_string(),
    }
}

/// Converts `series` into rows stamped with `fetched_at`.
///
/// Every row shares the same timestamp. Output order follows the series'
/// key order. The first bad date or field aborts the whole conversion; no
/// partial batch is ever returned.
pub fn to_rows(
    symbol: &Symbol,
    series: &RawSeries,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<PriceRow>, MalformedRecordError> {
    let fetched_at = fetched_at.to_rfc3339_opts(SecondsFormat::Micros, true);

    series
        .iter()
        .map(|(date, bar)| {
            let field = |field: &'static str, value| FieldRef {
                symbol,
                date,
                field,
                value,
            };

            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(field("date", Some(date)).malformed());
            }

            Ok(PriceRow {
                symbol: symbol.to_string(),
                date: date.clone(),
                open: field("open", bar.open.as_ref()).price()?,
                high: field("high", bar.high.as_ref()).price()?,
                low: field("low", bar.low.as_ref()).price()?,
                close: field("close", bar.close.as_ref()).price()?,
                volume: field("volume", bar.volume.as_ref()).parse()?,
                fetched_at: fetched_at.clone(),
            })
        })
        .collect()
}

/// [`to_rows`] with the timestamp captured once, now.
pub fn to_rows_now(
    symbol: &Symbol,
    series: &RawSeries,
) -> Result<Vec<PriceRow>, MalformedRecordError> {
    to_rows(symbol, series, Utc::now())
}

struct FieldRef<'a> {
    symbol: &'a Symbol,
    date: &'a str,
    field: &'static str,
    value: Option<&'a String>,
}

impl FieldRef<'_> {
    fn malformed(&self) -> MalformedRecordError {
        MalformedRecordError {
            symbol: self.symbol.to_string(),
            date: self.date.to_string(),
            field: self.field,
            value: self.value.cloned(),
        }
    }

    fn parse<T: FromStr>(&self) -> Result<T, MalformedRecordError> {
        self.value
            .and_then(|v| v.trim().parse::<T>().ok())
            .ok_or_else(|| self.malformed())
    }

    /// Prices must be finite; NaN and infinities parse but cannot be stored.
    fn price(&self) -> Result<f64, MalformedRecordError> {
        let value: f64 = self.parse()?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.malformed())
        }
    }
}
