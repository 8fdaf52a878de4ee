//! End-to-end report runs against in-memory collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use sw_calendar::MarketStatus;
use sw_md::{PriceFeed, SessionPricesRequest, StaticHolidaySource, StaticUniverse};
use sw_rank::{DataError, SessionQuote};
use sw_runtime::{ReportJob, RunError, RunOutcome};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Serves fixed quotes per session date and records every request.
#[derive(Default)]
struct FakeFeed {
    by_date: HashMap<NaiveDate, Vec<SessionQuote>>,
    fail: bool,
    requests: Mutex<Vec<SessionPricesRequest>>,
}

impl FakeFeed {
    fn with_session(mut self, date: NaiveDate, quotes: Vec<SessionQuote>) -> Self {
        self.by_date.insert(date, quotes);
        self
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<SessionPricesRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PriceFeed for FakeFeed {
    fn source_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_session(&self, req: SessionPricesRequest) -> Result<Vec<SessionQuote>> {
        self.requests.lock().unwrap().push(req.clone());
        if self.fail {
            return Err(anyhow!("upstream timed out"));
        }
        Ok(self.by_date.get(&req.start).cloned().unwrap_or_default())
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

const NYSE_2024: &[&str] = &[
    "Monday, January 1",
    "Monday, January 15",
    "Monday, February 19",
    "Friday, March 29",
    "Monday, May 27",
    "Wednesday, June 19",
    "Thursday, July 4",
    "Monday, September 2",
    "Thursday, November 28",
    "Wednesday, December 25",
];

const NYSE_2023: &[&str] = &[
    "Monday, January 2**",
    "Monday, January 16",
    "Monday, February 20",
    "Friday, April 7",
    "Monday, May 29",
    "Monday, June 19",
    "Tuesday, July 4",
    "Monday, September 4",
    "Thursday, November 23",
    "Monday, December 25",
];

fn holidays() -> StaticHolidaySource {
    StaticHolidaySource::default()
        .with_year(2023, NYSE_2023.iter().copied())
        .with_year(2024, NYSE_2024.iter().copied())
}

fn reference_quotes() -> Vec<SessionQuote> {
    // Deliberately not in symbol order.
    vec![
        SessionQuote::new("D", 40.0, 36.0),
        SessionQuote::new("B", 20.0, 18.0),
        SessionQuote::new("C", 30.0, 33.0),
        SessionQuote::new("A", 10.0, 11.0),
    ]
}

fn job(holidays: StaticHolidaySource, symbols: &[&str], feed: Arc<FakeFeed>, n: usize) -> ReportJob {
    ReportJob::new(
        Arc::new(holidays),
        Arc::new(StaticUniverse::new(symbols.iter().copied())),
        feed,
        n,
    )
}

// ---------------------------------------------------------------------------
// Closed days
// ---------------------------------------------------------------------------

#[tokio::test]
async fn weekend_needs_no_data_and_fetches_nothing() {
    let feed = Arc::new(FakeFeed::default());
    // No holiday records at all: a weekend must not consult them.
    let j = job(StaticHolidaySource::default(), &["A"], feed.clone(), 1);

    let outcome = j.run(d(2024, 1, 6)).await;
    assert!(matches!(outcome, RunOutcome::Closed(MarketStatus::ClosedWeekend)));
    assert_eq!(outcome.render(), "It's the weekend, the market is closed.");
    assert!(feed.requests().is_empty());
}

#[tokio::test]
async fn holiday_is_reported_without_fetching_prices() {
    let feed = Arc::new(FakeFeed::default());
    let j = job(holidays(), &["A"], feed.clone(), 1);

    // Martin Luther King Jr. Day.
    let outcome = j.run(d(2024, 1, 15)).await;
    assert!(matches!(outcome, RunOutcome::Closed(MarketStatus::ClosedHoliday)));
    assert_eq!(outcome.render(), "Today is a holiday, the market is closed.");
    assert!(feed.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_day_reports_previous_session() {
    let feed = Arc::new(FakeFeed::default().with_session(d(2024, 1, 2), reference_quotes()));
    let j = job(holidays(), &["A", "B", "C", "D"], feed.clone(), 1);

    let outcome = j.run(d(2024, 1, 3)).await;
    assert_eq!(
        outcome.render(),
        "2024-01-02's 1 best performing stocks:\n\
         C $33.00 10.00%\n\
         \n\
         2024-01-02's 1 worst performing stocks:\n\
         B $18.00 -10.00%\n"
    );
    assert_eq!(outcome.kind(), "report");

    let reqs = feed.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].start, d(2024, 1, 2));
    assert_eq!(reqs[0].end, d(2024, 1, 3));
}

#[tokio::test]
async fn walk_crosses_into_previous_year() {
    // Tue 2024-01-02: Jan 1 is a holiday, then the weekend, then Fri 2023-12-29.
    let feed = Arc::new(FakeFeed::default().with_session(d(2023, 12, 29), reference_quotes()));
    let j = job(holidays(), &["A", "B", "C", "D"], feed.clone(), 2);

    match j.run(d(2024, 1, 2)).await {
        RunOutcome::Report { window, ranking } => {
            assert_eq!(window.start_date, d(2023, 12, 29));
            assert_eq!(window.end_date, d(2023, 12, 30));
            let best: Vec<_> = ranking.best.iter().map(|e| e.symbol.as_str()).collect();
            let worst: Vec<_> = ranking.worst.iter().map(|e| e.symbol.as_str()).collect();
            assert_eq!(best, vec!["C", "A"]);
            assert_eq!(worst, vec!["B", "D"]);
        }
        other => panic!("expected a report, got {other:?}"),
    }
}

#[tokio::test]
async fn universe_symbols_are_normalized_before_the_feed() {
    let feed = Arc::new(FakeFeed::default().with_session(
        d(2024, 1, 2),
        vec![
            SessionQuote::new("BRK-B", 362.0, 365.5),
            SessionQuote::new("AAPL", 187.15, 184.29),
        ],
    ));
    let j = job(holidays(), &["BRK.B", " AAPL ", "AAPL"], feed.clone(), 1);

    let outcome = j.run(d(2024, 1, 3)).await;
    assert_eq!(outcome.kind(), "report");
    assert_eq!(
        feed.requests()[0].symbols,
        vec!["AAPL".to_string(), "BRK-B".to_string()]
    );
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_quote_fails_with_session_date() {
    let feed = Arc::new(FakeFeed::default().with_session(
        d(2024, 1, 2),
        vec![SessionQuote::new("A", 10.0, 11.0)],
    ));
    let j = job(holidays(), &["A", "B"], feed, 1);

    let outcome = j.run(d(2024, 1, 3)).await;
    match &outcome {
        RunOutcome::Failed {
            date,
            error: RunError::Data(DataError::MissingQuote { symbol }),
        } => {
            assert_eq!(*date, d(2024, 1, 2));
            assert_eq!(symbol, "B");
        }
        other => panic!("expected missing quote, got {other:?}"),
    }
    assert_eq!(
        outcome.render(),
        "An error occurred. Market data not available for 2024-01-02."
    );
}

#[tokio::test]
async fn feed_failure_is_a_fetch_error() {
    let j = job(holidays(), &["A"], Arc::new(FakeFeed::failing()), 1);

    match j.run(d(2024, 1, 3)).await {
        RunOutcome::Failed {
            date,
            error: RunError::Fetch(e),
        } => {
            assert_eq!(date, d(2024, 1, 2));
            assert!(format!("{e:#}").contains("upstream timed out"));
        }
        other => panic!("expected fetch failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_holiday_year_fails_with_today() {
    let j = job(StaticHolidaySource::default(), &["A"], Arc::new(FakeFeed::default()), 1);

    let outcome = j.run(d(2024, 1, 3)).await;
    assert!(outcome.is_failure());
    assert_eq!(
        outcome.render(),
        "An error occurred. Market data not available for 2024-01-03."
    );
}

#[tokio::test]
async fn malformed_holiday_record_fails_the_run() {
    let bad = StaticHolidaySource::default().with_year(2024, ["Monday, Janvier 1"]);
    let j = job(bad, &["A"], Arc::new(FakeFeed::default()), 1);

    match j.run(d(2024, 1, 3)).await {
        RunOutcome::Failed {
            error: RunError::Calendar(_),
            ..
        } => {}
        other => panic!("expected calendar failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_previous_year_fails_when_walk_needs_it() {
    let only_2024 = StaticHolidaySource::default().with_year(2024, NYSE_2024.iter().copied());
    let j = job(only_2024, &["A"], Arc::new(FakeFeed::default()), 1);

    let outcome = j.run(d(2024, 1, 2)).await;
    assert!(outcome.is_failure());
    assert_eq!(
        outcome.render(),
        "An error occurred. Market data not available for 2024-01-02."
    );
}
