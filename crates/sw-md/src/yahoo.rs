//! Yahoo chart-endpoint price feed.
//!
//! One `GET {base}/v8/finance/chart/{symbol}` per symbol with
//! `period1`/`period2` set to the session window (UTC midnight bounds) and a
//! daily interval. Open comes from `indicators.quote[0].open`; close from
//! `indicators.adjclose[0].adjclose`, falling back to `quote[0].close` when
//! the adjusted series is absent.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use sw_rank::SessionQuote;
use tracing::debug;

use crate::http::USER_AGENT;
use crate::source::{PriceFeed, SessionPricesRequest};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct YahooChartFeed {
    http: reqwest::Client,
    base_url: String,
    concurrency: usize,
}

impl Default for YahooChartFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooChartFeed {
    pub fn new() -> Self {
        Self::new_with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn new_with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Maximum in-flight symbol requests (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            symbol
        )
    }

    async fn fetch_one(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<SessionQuote> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let resp = self
            .http
            .get(self.chart_url(symbol))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("yahoo chart request failed for {symbol}"))?;

        let status = resp.status();
        let raw = resp
            .text()
            .await
            .with_context(|| format!("yahoo chart body read failed for {symbol}"))?;

        // Yahoo sends a JSON `chart.error` with 4xx; anything else keeps the
        // status as the error.
        let body: ChartEnvelope = match serde_json::from_str(&raw) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(anyhow::Error::new(e)
                    .context(format!("yahoo chart json decode failed for {symbol}")));
            }
            Err(_) => {
                return Err(anyhow!(
                    "yahoo chart http error for {symbol}: status={}",
                    status.as_u16()
                ));
            }
        };

        if let Some(err) = body.chart.error {
            return Err(anyhow!(
                "yahoo chart error for {symbol}: {} {}",
                err.code,
                err.description
            ));
        }
        if !status.is_success() {
            return Err(anyhow!(
                "yahoo chart http error for {symbol}: status={}",
                status.as_u16()
            ));
        }

        let result = body
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| anyhow!("yahoo chart returned no result for {symbol}"))?;

        let (open, close) = result
            .session_bar(period1, period2)
            .ok_or_else(|| anyhow!("yahoo chart has no bar for {symbol} on {start}"))?;

        debug!(symbol, open, close, "yahoo session bar");
        Ok(SessionQuote::new(symbol, open, close))
    }
}

#[async_trait::async_trait]
impl PriceFeed for YahooChartFeed {
    fn source_name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_session(&self, req: SessionPricesRequest) -> Result<Vec<SessionQuote>> {
        let (start, end) = (req.start, req.end);
        stream::iter(req.symbols.into_iter())
            .map(|sym| async move { self.fetch_one(&sym, start, end).await })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await
    }
}

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
    #[serde(default)]
    adjclose: Vec<AdjCloseSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseSeries {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    /// First bar inside `[period1, period2)` with both prices present.
    fn session_bar(&self, period1: i64, period2: i64) -> Option<(f64, f64)> {
        let quote = self.indicators.quote.first()?;
        let adj = self.indicators.adjclose.first();

        self.timestamp
            .iter()
            .enumerate()
            .filter(|(_, ts)| (period1..period2).contains(*ts))
            .find_map(|(i, _)| {
                let open = quote.open.get(i).copied().flatten()?;
                let close = adj
                    .and_then(|a| a.adjclose.get(i).copied().flatten())
                    .or_else(|| quote.close.get(i).copied().flatten())?;
                Some((open, close))
            })
    }
}
