//! Ticker symbols and the comma-separated list format used by `SYMBOLS`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol cannot be empty")]
    Empty,

    #[error("symbol {symbol:?} contains invalid character {ch:?}")]
    InvalidCharacter { symbol: String, ch: char },

    #[error("symbol list is empty")]
    EmptyList,
}

/// An upper-cased equity ticker such as `AAPL` or `BRK.B`.
///
/// Construction trims surrounding whitespace and upper-cases the input, so
/// two `Symbol`s compare equal whenever they name the same ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self, SymbolError> {
        let value = raw.trim().to_uppercase();
        if value.is_empty() {
            return Err(SymbolError::Empty);
        }
        if let Some(ch) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':')))
        {
            return Err(SymbolError::InvalidCharacter { symbol: value, ch });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses a comma-separated symbol list.
///
/// Blank entries are skipped and repeated tickers are kept only at their
/// first position, so the result is ordered and duplicate-free. A list with
/// no usable entry is an error.
pub fn parse_symbol_list(raw: &str) -> Result<Vec<Symbol>, SymbolError> {
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();

    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let symbol = Symbol::parse(part)?;
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err(SymbolError::EmptyList);
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_uppercases() {
        let symbol = Symbol::parse("  msft ").unwrap();
        assert_eq!(symbol.as_str(), "MSFT");
        assert_eq!(symbol.to_string(), "MSFT");
        assert_eq!("brk.b".parse::<Symbol>().unwrap().as_str(), "BRK.B");
    }

    #[test]
    fn parse_rejects_empty_and_inner_whitespace() {
        assert_eq!(Symbol::parse("   "), Err(SymbolError::Empty));
        assert!(matches!(
            Symbol::parse("AA PL"),
            Err(SymbolError::InvalidCharacter { ch: ' ', .. })
        ));
    }

    #[test]
    fn list_drops_blanks_and_duplicates_in_order() {
        let symbols = parse_symbol_list(" aapl, ,MSFT,aapl ,ibm,").unwrap();
        let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, ["AAPL", "MSFT", "IBM"]);
    }

    #[test]
    fn list_without_entries_is_an_error() {
        assert_eq!(parse_symbol_list(" , ,"), Err(SymbolError::EmptyList));
        assert_eq!(parse_symbol_list(""), Err(SymbolError::EmptyList));
    }
}
