//! Holiday-record sources.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::html_table::first_table;
use crate::source::HolidaySource;

pub const NYSE_HOLIDAYS_URL: &str = "https://www.nyse.com/markets/hours-calendars";

/// Records held in memory, keyed by year (typically loaded from config).
#[derive(Debug, Clone, Default)]
pub struct StaticHolidaySource {
    by_year: BTreeMap<i32, Vec<String>>,
}

impl StaticHolidaySource {
    pub fn new(by_year: BTreeMap<i32, Vec<String>>) -> Self {
        Self { by_year }
    }

    pub fn with_year<I, S>(mut self, year: i32, records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_year
            .insert(year, records.into_iter().map(Into::into).collect());
        self
    }
}

#[async_trait::async_trait]
impl HolidaySource for StaticHolidaySource {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn holiday_records(&self, year: i32) -> Result<Vec<String>> {
        self.by_year
            .get(&year)
            .cloned()
            .ok_or_else(|| anyhow!("no holiday records configured for {year}"))
    }
}

/// One record per line in a text file. The path may contain `{year}`.
///
/// Blank lines and lines starting with `#` are skipped.
#[derive(Debug, Clone)]
pub struct FileHolidaySource {
    path_template: String,
}

impl FileHolidaySource {
    pub fn new(path_template: impl Into<String>) -> Self {
        Self {
            path_template: path_template.into(),
        }
    }

    fn path_for(&self, year: i32) -> PathBuf {
        PathBuf::from(self.path_template.replace("{year}", &year.to_string()))
    }
}

#[async_trait::async_trait]
impl HolidaySource for FileHolidaySource {
    fn source_name(&self) -> &'static str {
        "file"
    }

    async fn holiday_records(&self, year: i32) -> Result<Vec<String>> {
        let path = self.path_for(year);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read holiday file: {}", path.display()))?;

        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect())
    }
}

/// The exchange's published holiday table: one column per year, one row per
/// holiday. A year the page does not list is an error.
#[derive(Debug, Clone)]
pub struct HttpHolidaySource {
    http: reqwest::Client,
    url: String,
}

impl Default for HttpHolidaySource {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpHolidaySource {
    pub fn new() -> Self {
        Self::new_with_base_url(NYSE_HOLIDAYS_URL.to_string())
    }

    pub fn new_with_base_url(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl HolidaySource for HttpHolidaySource {
    fn source_name(&self) -> &'static str {
        "http"
    }

    async fn holiday_records(&self, year: i32) -> Result<Vec<String>> {
        let page = crate::http::get_text(&self.http, &self.url, "holiday calendar").await?;
        let table = first_table(&page).context("holiday calendar page has no usable table")?;
        let records = table
            .column(&year.to_string())
            .with_context(|| format!("holiday calendar does not list {year}"))?;
        debug!(year, count = records.len(), "holiday records fetched");
        Ok(records)
    }
}
