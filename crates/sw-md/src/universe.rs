//! Ticker-universe sources.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::html_table::first_table;
use crate::source::UniverseSource;

pub const SP500_CONSTITUENTS_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

/// A fixed list (from config or tests).
#[derive(Debug, Clone, Default)]
pub struct StaticUniverse {
    symbols: Vec<String>,
}

impl StaticUniverse {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait::async_trait]
impl UniverseSource for StaticUniverse {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn symbols(&self) -> Result<Vec<String>> {
        Ok(self.symbols.clone())
    }
}

/// A CSV listing with a symbol column (index constituents export).
///
/// The column name match is case-insensitive.
#[derive(Debug, Clone)]
pub struct CsvUniverse {
    path: PathBuf,
    column: String,
}

impl CsvUniverse {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_column(path, "Symbol")
    }

    pub fn with_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            column: column.into(),
        }
    }
}

/// Extract one column from CSV text.
pub fn symbols_from_csv(src: &str, column: &str) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(src.as_bytes());

    let idx = rdr
        .headers()
        .context("universe csv header read failed")?
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| anyhow!("universe csv has no '{column}' column"))?;

    let mut out = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("universe csv row {} unreadable", row + 2))?;
        if let Some(v) = rec.get(idx) {
            if !v.is_empty() {
                out.push(v.to_string());
            }
        }
    }
    Ok(out)
}

#[async_trait::async_trait]
impl UniverseSource for CsvUniverse {
    fn source_name(&self) -> &'static str {
        "csv"
    }

    async fn symbols(&self) -> Result<Vec<String>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read universe csv: {}", self.path.display()))?;
        symbols_from_csv(&raw, &self.column)
    }
}

/// A constituents listing fetched over HTTP: either a CSV export or an HTML
/// page whose first table carries the symbol column.
#[derive(Debug, Clone)]
pub struct HttpUniverse {
    http: reqwest::Client,
    url: String,
    column: String,
}

impl Default for HttpUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpUniverse {
    pub fn new() -> Self {
        Self::new_with_base_url(SP500_CONSTITUENTS_URL.to_string())
    }

    pub fn new_with_base_url(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            column: "Symbol".to_string(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

#[async_trait::async_trait]
impl UniverseSource for HttpUniverse {
    fn source_name(&self) -> &'static str {
        "http"
    }

    async fn symbols(&self) -> Result<Vec<String>> {
        let body = crate::http::get_text(&self.http, &self.url, "universe listing").await?;
        if body.trim_start().starts_with('<') {
            let table = first_table(&body).context("universe page has no usable table")?;
            let symbols = table.column(&self.column)?;
            Ok(symbols.into_iter().filter(|s| !s.is_empty()).collect())
        } else {
            symbols_from_csv(&body, &self.column)
        }
    }
}
