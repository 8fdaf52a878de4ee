//! One invocation of the report pipeline: resolve the session, fetch prices,
//! rank, and produce exactly one user-facing text block.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sw_calendar::{
    is_weekend, CalendarError, HolidayCalendar, HolidaySet, MarketStatus, SessionWindow,
};
use sw_md::{normalize_universe, HolidaySource, PriceFeed, SessionPricesRequest, UniverseSource};
use sw_rank::{rank_matrix, render_report, PriceMatrix, RankingResult};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::RunError;

pub const WEEKEND_MESSAGE: &str = "It's the weekend, the market is closed.";
pub const HOLIDAY_MESSAGE: &str = "Today is a holiday, the market is closed.";

pub fn failure_message(date: NaiveDate) -> String {
    format!("An error occurred. Market data not available for {date}.")
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of one run. Always renders to a single text block.
#[derive(Debug)]
pub enum RunOutcome {
    Report {
        window: SessionWindow,
        ranking: RankingResult,
    },
    /// Today is closed; no prices were fetched.
    Closed(MarketStatus),
    /// `date` is the resolved session start when known, else today.
    Failed { date: NaiveDate, error: RunError },
}

impl RunOutcome {
    /// "report" | "closed_weekend" | "closed_holiday" | "failed"
    pub fn kind(&self) -> &'static str {
        match self {
            RunOutcome::Report { .. } => "report",
            RunOutcome::Closed(status) => status.as_str(),
            RunOutcome::Failed { .. } => "failed",
        }
    }

    pub fn session_date(&self) -> Option<NaiveDate> {
        match self {
            RunOutcome::Report { window, .. } => Some(window.start_date),
            RunOutcome::Closed(_) => None,
            RunOutcome::Failed { date, .. } => Some(*date),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }

    pub fn render(&self) -> String {
        match self {
            RunOutcome::Report { window, ranking } => render_report(window.start_date, ranking),
            RunOutcome::Closed(MarketStatus::ClosedWeekend) => WEEKEND_MESSAGE.to_string(),
            RunOutcome::Closed(MarketStatus::ClosedHoliday) => HOLIDAY_MESSAGE.to_string(),
            // Not produced by the job: an open day always resolves a session.
            RunOutcome::Closed(MarketStatus::Open) => String::new(),
            RunOutcome::Failed { date, .. } => failure_message(*date),
        }
    }
}

/// What the calendar says about `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    Closed { status: MarketStatus },
    Session { window: SessionWindow },
}

// ---------------------------------------------------------------------------
// ReportJob
// ---------------------------------------------------------------------------

/// The report pipeline wired to its collaborators.
///
/// Holds no mutable state; every run rebuilds its holiday calendar from the
/// source.
#[derive(Clone)]
pub struct ReportJob {
    holidays: Arc<dyn HolidaySource>,
    universe: Arc<dyn UniverseSource>,
    feed: Arc<dyn PriceFeed>,
    top_n: usize,
}

impl ReportJob {
    pub fn new(
        holidays: Arc<dyn HolidaySource>,
        universe: Arc<dyn UniverseSource>,
        feed: Arc<dyn PriceFeed>,
        top_n: usize,
    ) -> Self {
        Self {
            holidays,
            universe,
            feed,
            top_n,
        }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub async fn run(&self, today: NaiveDate) -> RunOutcome {
        self.run_with_id(Uuid::new_v4(), today).await
    }

    /// Never returns an error: failures become `RunOutcome::Failed`.
    pub async fn run_with_id(&self, run_id: Uuid, today: NaiveDate) -> RunOutcome {
        info!(%run_id, %today, top_n = self.top_n, "report run started");

        let mut session = None;
        match self.try_run(today, &mut session).await {
            Ok(outcome) => {
                info!(%run_id, kind = outcome.kind(), session = ?outcome.session_date(), "report run finished");
                outcome
            }
            Err(error) => {
                let date = session.unwrap_or(today);
                error!(%run_id, %date, kind = error.kind(), %error, "report run failed");
                RunOutcome::Failed { date, error }
            }
        }
    }

    async fn try_run(
        &self,
        today: NaiveDate,
        session: &mut Option<NaiveDate>,
    ) -> Result<RunOutcome, RunError> {
        let window = match self.resolve(today).await? {
            Resolution::Closed { status } => return Ok(RunOutcome::Closed(status)),
            Resolution::Session { window } => window,
        };
        *session = Some(window.start_date);

        let ranking = self.rank_session(window).await?;
        Ok(RunOutcome::Report { window, ranking })
    }

    /// Closed status for today, or the last completed session before it.
    ///
    /// Weekends short-circuit before any holiday fetch. A walk that crosses
    /// January 1 loads the previous year's records on demand.
    pub async fn resolve(&self, today: NaiveDate) -> Result<Resolution, RunError> {
        if is_weekend(today) {
            return Ok(Resolution::Closed {
                status: MarketStatus::ClosedWeekend,
            });
        }

        let mut calendar = HolidayCalendar::new();
        calendar.insert(self.load_year(today.year()).await?);

        let status = calendar.status(today)?;
        if !status.is_open() {
            return Ok(Resolution::Closed { status });
        }

        let window = self.last_session(&mut calendar, today).await?;
        Ok(Resolution::Session { window })
    }

    async fn last_session(
        &self,
        calendar: &mut HolidayCalendar,
        today: NaiveDate,
    ) -> Result<SessionWindow, RunError> {
        loop {
            match calendar.last_open_session(today) {
                Err(CalendarError::MissingYear { year })
                    if year < today.year() && calendar.get(year).is_none() =>
                {
                    debug!(year, "walk crossed into an unloaded year");
                    calendar.insert(self.load_year(year).await?);
                }
                other => return Ok(other?),
            }
        }
    }

    async fn load_year(&self, year: i32) -> Result<HolidaySet, RunError> {
        let records = self
            .holidays
            .holiday_records(year)
            .await
            .with_context(|| {
                format!(
                    "holiday records for {year} from {}",
                    self.holidays.source_name()
                )
            })?;
        Ok(HolidaySet::from_records(year, &records)?)
    }

    /// Fetch the universe and its session prices, then rank.
    pub async fn rank_session(&self, window: SessionWindow) -> Result<RankingResult, RunError> {
        let raw = self
            .universe
            .symbols()
            .await
            .with_context(|| format!("universe from {}", self.universe.source_name()))?;
        let symbols = normalize_universe(raw);
        if symbols.is_empty() {
            return Err(RunError::Fetch(anyhow!(
                "universe from {} is empty",
                self.universe.source_name()
            )));
        }

        let quotes = self
            .feed
            .fetch_session(SessionPricesRequest {
                symbols: symbols.clone(),
                start: window.start_date,
                end: window.end_date,
            })
            .await
            .with_context(|| {
                format!(
                    "session prices for {} from {}",
                    window.start_date,
                    self.feed.source_name()
                )
            })?;
        debug!(
            requested = symbols.len(),
            received = quotes.len(),
            "session prices fetched"
        );

        let matrix = PriceMatrix::from_quotes(&symbols, &quotes)?;
        Ok(rank_matrix(&matrix, self.top_n)?)
    }
}
