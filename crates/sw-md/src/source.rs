//! Provider traits.
//!
//! Implementations must be `Send + Sync` so the runtime can hold them as
//! `Arc<dyn _>` across async task boundaries.

use anyhow::Result;
use chrono::NaiveDate;
use sw_rank::SessionQuote;

/// Parameters for a session price fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPricesRequest {
    /// Feed-ready symbols (already dot→dash normalized).
    pub symbols: Vec<String>,
    /// Inclusive session date.
    pub start: NaiveDate,
    /// Exclusive end (`start + 1 day`).
    pub end: NaiveDate,
}

/// Raw holiday records for one calendar year.
#[async_trait::async_trait]
pub trait HolidaySource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Records exactly as published (e.g. `"Monday, January 15"`); parsing
    /// belongs to the calendar.
    async fn holiday_records(&self, year: i32) -> Result<Vec<String>>;
}

/// Flat list of tickers to rank.
#[async_trait::async_trait]
pub trait UniverseSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Symbols as published; the caller normalizes them.
    async fn symbols(&self) -> Result<Vec<String>>;
}

/// Historical open/close for one session.
#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Quotes in any order. A symbol with no data may simply be absent;
    /// alignment and completeness checks happen in `sw_rank::PriceMatrix`.
    async fn fetch_session(&self, req: SessionPricesRequest) -> Result<Vec<SessionQuote>>;
}
