//! Holiday data: raw record parsing, per-year sets and the multi-year calendar.
//!
//! # Record format
//!
//! Upstream holiday lists publish one cell per holiday, e.g.
//! `"Monday, January 15"` or `"Friday, July 3**"` (observance marker). The
//! parser accepts exactly that shape and nothing else: a record that does not
//! parse is fatal for the whole run, never skipped or guessed at.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::CalendarError;
use crate::session::{self, MarketStatus, SessionWindow};

// ---------------------------------------------------------------------------
// Month table
// ---------------------------------------------------------------------------

/// Month name → month number. Read-only and process-wide.
pub const MONTHS: [(&str, u32); 12] = [
    ("January", 1),
    ("February", 2),
    ("March", 3),
    ("April", 4),
    ("May", 5),
    ("June", 6),
    ("July", 7),
    ("August", 8),
    ("September", 9),
    ("October", 10),
    ("November", 11),
    ("December", 12),
];

/// Observance markers that may trail the day number.
const OBSERVANCE_MARKERS: &[char] = &['*', '†', '‡'];

/// Resolve a full English month name (case-insensitive) to 1–12.
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(name))
        .map(|(_, n)| *n)
}

/// Parse one raw holiday record into `(month, day)`.
pub fn parse_holiday_record(raw: &str) -> Result<(u32, u32), CalendarError> {
    let malformed = |reason: &'static str| CalendarError::MalformedHoliday {
        record: raw.to_string(),
        reason,
    };

    let (weekday, rest) = raw
        .trim()
        .split_once(',')
        .ok_or_else(|| malformed("missing ',' after weekday"))?;

    weekday
        .trim()
        .parse::<Weekday>()
        .map_err(|_| malformed("unknown weekday name"))?;

    let rest = rest.trim().trim_end_matches(OBSERVANCE_MARKERS);
    let mut parts = rest.split_whitespace();
    let month_name = parts.next().ok_or_else(|| malformed("missing month"))?;
    let day_raw = parts.next().ok_or_else(|| malformed("missing day"))?;
    if parts.next().is_some() {
        return Err(malformed("trailing text after day"));
    }

    let month = month_number(month_name).ok_or_else(|| malformed("unknown month name"))?;
    let day: u32 = day_raw
        .parse()
        .map_err(|_| malformed("day is not an integer"))?;
    if !(1..=31).contains(&day) {
        return Err(CalendarError::InvalidHolidayDay { month, day });
    }

    Ok((month, day))
}

// ---------------------------------------------------------------------------
// HolidaySet
// ---------------------------------------------------------------------------

/// Holidays for one calendar year: month (1–12) → days of month.
///
/// Built once per run and immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HolidaySet {
    year: i32,
    days: BTreeMap<u32, BTreeSet<u32>>,
}

impl HolidaySet {
    /// An empty set for `year` (every weekday is a session).
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            days: BTreeMap::new(),
        }
    }

    /// Build from already-numeric `(month, day)` pairs.
    pub fn from_days<I>(year: i32, days: I) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut set = Self::empty(year);
        for (month, day) in days {
            if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
                return Err(CalendarError::InvalidHolidayDay { month, day });
            }
            set.days.entry(month).or_default().insert(day);
        }
        Ok(set)
    }

    /// Build from raw holiday records. Blank records are skipped; any other
    /// record that fails to parse aborts the whole build.
    pub fn from_records<I, S>(year: i32, records: I) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for record in records {
            let record = record.as_ref();
            if record.trim().is_empty() {
                continue;
            }
            parsed.push(parse_holiday_record(record)?);
        }
        Self::from_days(year, parsed)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn contains(&self, month: u32, day: u32) -> bool {
        self.days.get(&month).is_some_and(|d| d.contains(&day))
    }

    /// Month/day lookup only; the caller is responsible for pairing the set
    /// with a date of the same year.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(date.month(), date.day())
    }

    /// Holiday days in `month`, ascending.
    pub fn days_in(&self, month: u32) -> impl Iterator<Item = u32> + '_ {
        self.days.get(&month).into_iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// HolidayCalendar
// ---------------------------------------------------------------------------

/// Holiday sets for several years.
///
/// Every query that needs holiday data for a weekday requires the set for
/// that weekday's year; weekends are closed without consulting it.
#[derive(Clone, Debug, Default)]
pub struct HolidayCalendar {
    years: BTreeMap<i32, HolidaySet>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the set for its year.
    pub fn insert(&mut self, set: HolidaySet) {
        self.years.insert(set.year(), set);
    }

    pub fn with(mut self, set: HolidaySet) -> Self {
        self.insert(set);
        self
    }

    pub fn get(&self, year: i32) -> Option<&HolidaySet> {
        self.years.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    fn require(&self, year: i32) -> Result<&HolidaySet, CalendarError> {
        self.get(year).ok_or(CalendarError::MissingYear { year })
    }

    pub fn status(&self, date: NaiveDate) -> Result<MarketStatus, CalendarError> {
        if session::is_weekend(date) {
            return Ok(MarketStatus::ClosedWeekend);
        }
        Ok(session::market_status(date, self.require(date.year())?))
    }

    pub fn is_open(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        Ok(self.status(date)?.is_open())
    }

    /// Last completed session strictly before `date`, crossing year
    /// boundaries when the previous year's set is present.
    pub fn last_open_session(&self, date: NaiveDate) -> Result<SessionWindow, CalendarError> {
        self.require(date.year())?;
        session::walk_back(date, |d| self.is_open(d))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
