//! Price matrix for one session: sorted symbols with parallel open/close
//! sequences.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Open and adjusted close for one symbol over one session, as returned by a
/// price feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionQuote {
    pub symbol: String,
    pub open: f64,
    pub close: f64,
}

impl SessionQuote {
    pub fn new(symbol: impl Into<String>, open: f64, close: f64) -> Self {
        Self {
            symbol: symbol.into(),
            open,
            close,
        }
    }
}

/// Symbols in lexicographic order with `open[i]` / `close[i]` belonging to
/// `symbols[i]`. All three sequences always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatrix {
    symbols: Vec<String>,
    open: Vec<f64>,
    close: Vec<f64>,
}

impl PriceMatrix {
    /// Validate the shape and sort the three sequences together by symbol.
    pub fn new(symbols: Vec<String>, open: Vec<f64>, close: Vec<f64>) -> Result<Self, DataError> {
        if open.len() != symbols.len() || close.len() != symbols.len() {
            return Err(DataError::ShapeMismatch {
                symbols: symbols.len(),
                opens: open.len(),
                closes: close.len(),
            });
        }

        let mut rows: Vec<(String, f64, f64)> = symbols
            .into_iter()
            .zip(open)
            .zip(close)
            .map(|((s, o), c)| (s, o, c))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(DataError::DuplicateSymbol {
                symbol: pair[0].0.clone(),
            });
        }

        let mut m = Self {
            symbols: Vec::with_capacity(rows.len()),
            open: Vec::with_capacity(rows.len()),
            close: Vec::with_capacity(rows.len()),
        };
        for (s, o, c) in rows {
            m.symbols.push(s);
            m.open.push(o);
            m.close.push(c);
        }
        Ok(m)
    }

    /// Align feed quotes to a sorted, de-duplicated copy of `symbols`.
    ///
    /// The feed may return quotes in any order and may return extra symbols
    /// (ignored). A requested symbol with no quote fails the whole matrix.
    pub fn from_quotes(symbols: &[String], quotes: &[SessionQuote]) -> Result<Self, DataError> {
        let mut wanted: Vec<String> = symbols.to_vec();
        wanted.sort();
        wanted.dedup();

        let by_symbol: HashMap<&str, &SessionQuote> =
            quotes.iter().map(|q| (q.symbol.as_str(), q)).collect();

        let mut open = Vec::with_capacity(wanted.len());
        let mut close = Vec::with_capacity(wanted.len());
        for sym in &wanted {
            let q = by_symbol
                .get(sym.as_str())
                .ok_or_else(|| DataError::MissingQuote {
                    symbol: sym.clone(),
                })?;
            open.push(q.open);
            close.push(q.close);
        }

        Ok(Self {
            symbols: wanted,
            open,
            close,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn open_prices(&self) -> &[f64] {
        &self.open
    }

    pub fn close_prices(&self) -> &[f64] {
        &self.close
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syms(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_sorts_rows_together() {
        let m = PriceMatrix::new(syms(&["MSFT", "AAPL"]), vec![2.0, 1.0], vec![20.0, 10.0])
            .unwrap();
        assert_eq!(m.symbols(), &["AAPL", "MSFT"]);
        assert_eq!(m.open_prices(), &[1.0, 2.0]);
        assert_eq!(m.close_prices(), &[10.0, 20.0]);
    }

    #[test]
    fn new_rejects_shape_mismatch() {
        let err = PriceMatrix::new(syms(&["A", "B"]), vec![1.0], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            DataError::ShapeMismatch {
                symbols: 2,
                opens: 1,
                closes: 2
            }
        );
    }

    #[test]
    fn new_rejects_duplicates() {
        let err = PriceMatrix::new(syms(&["A", "A"]), vec![1.0, 1.0], vec![1.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            DataError::DuplicateSymbol {
                symbol: "A".to_string()
            }
        );
    }

    #[test]
    fn from_quotes_does_not_trust_feed_order() {
        let quotes = vec![
            SessionQuote::new("MSFT", 400.0, 404.0),
            SessionQuote::new("EXTRA", 1.0, 1.0),
            SessionQuote::new("AAPL", 190.0, 188.1),
        ];
        let m = PriceMatrix::from_quotes(&syms(&["MSFT", "AAPL", "MSFT"]), &quotes).unwrap();
        assert_eq!(m.symbols(), &["AAPL", "MSFT"]);
        assert_eq!(m.open_prices(), &[190.0, 400.0]);
        assert_eq!(m.close_prices(), &[188.1, 404.0]);
    }

    #[test]
    fn from_quotes_fails_on_missing_symbol() {
        let quotes = vec![SessionQuote::new("AAPL", 1.0, 1.0)];
        let err = PriceMatrix::from_quotes(&syms(&["AAPL", "BRK-B"]), &quotes).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingQuote {
                symbol: "BRK-B".to_string()
            }
        );
    }
}
