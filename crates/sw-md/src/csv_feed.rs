//! Offline price feed backed by a daily CSV export.
//!
//! ## Column contract (header required)
//!
//! | Column      | Example      |
//! |-------------|--------------|
//! | `symbol`    | `AAPL`       |
//! | `date`      | `2024-01-02` |
//! | `open`      | `187.15`     |
//! | `adj_close` | `184.29`     |
//!
//! Rows for other dates or symbols are ignored. An unparseable row is an
//! error for the whole fetch.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use sw_rank::SessionQuote;

use crate::source::{PriceFeed, SessionPricesRequest};

#[derive(Debug, Clone)]
pub struct CsvPriceFeed {
    path: PathBuf,
}

impl CsvPriceFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Deserialize)]
struct CsvPriceRow {
    symbol: String,
    date: NaiveDate,
    open: f64,
    adj_close: f64,
}

/// Parse CSV text and keep the rows for `req`'s session and symbols.
pub fn quotes_from_csv(src: &str, req: &SessionPricesRequest) -> Result<Vec<SessionQuote>> {
    let wanted: HashSet<&str> = req.symbols.iter().map(String::as_str).collect();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(src.as_bytes());

    let mut out = Vec::new();
    for (row, rec) in rdr.deserialize::<CsvPriceRow>().enumerate() {
        let rec = rec.with_context(|| format!("price csv row {} unparseable", row + 2))?;
        if rec.date == req.start && wanted.contains(rec.symbol.as_str()) {
            out.push(SessionQuote::new(rec.symbol, rec.open, rec.adj_close));
        }
    }
    Ok(out)
}

#[async_trait::async_trait]
impl PriceFeed for CsvPriceFeed {
    fn source_name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_session(&self, req: SessionPricesRequest) -> Result<Vec<SessionQuote>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read price csv: {}", self.path.display()))?;
        quotes_from_csv(&raw, &req)
    }
}
