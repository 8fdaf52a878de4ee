//! Session resolution: open/closed checks and the backward walk to the last
//! completed session.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::holidays::HolidaySet;

/// Upper bound on days examined by the backward walk.
pub const MAX_WALK_STEPS: u32 = 366;

// ---------------------------------------------------------------------------
// MarketStatus
// ---------------------------------------------------------------------------

/// Open/closed state of the market on one calendar day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Open,
    /// Saturday or Sunday. Takes precedence over a holiday on the same day.
    ClosedWeekend,
    ClosedHoliday,
}

impl MarketStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, MarketStatus::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::Open => "open",
            MarketStatus::ClosedWeekend => "closed_weekend",
            MarketStatus::ClosedHoliday => "closed_holiday",
        }
    }
}

// ---------------------------------------------------------------------------
// SessionWindow
// ---------------------------------------------------------------------------

/// Half-open `[start_date, end_date)` range covering exactly one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SessionWindow {
    fn starting(start_date: NaiveDate) -> Result<Self, CalendarError> {
        let end_date = start_date
            .succ_opt()
            .ok_or(CalendarError::OutOfRange { date: start_date })?;
        Ok(Self {
            start_date,
            end_date,
        })
    }
}

// ---------------------------------------------------------------------------
// Open/closed checks
// ---------------------------------------------------------------------------

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekend and holiday are independent conditions; a holiday that falls on a
/// weekend is simply closed, never counted twice.
pub fn market_status(date: NaiveDate, holidays: &HolidaySet) -> MarketStatus {
    if is_weekend(date) {
        MarketStatus::ClosedWeekend
    } else if holidays.is_holiday(date) {
        MarketStatus::ClosedHoliday
    } else {
        MarketStatus::Open
    }
}

/// `false` on Saturday/Sunday or when `date.day` is listed for `date.month`.
pub fn is_open(date: NaiveDate, holidays: &HolidaySet) -> bool {
    market_status(date, holidays).is_open()
}

// ---------------------------------------------------------------------------
// Backward walk
// ---------------------------------------------------------------------------

enum Walk {
    Checking(NaiveDate),
    Found(NaiveDate),
}

/// Last completed session strictly before `date` using a single year's set.
///
/// The current day is never reported, even when open. A weekday outside
/// `holidays.year()` cannot be classified and yields
/// [`CalendarError::MissingYear`]; use
/// [`HolidayCalendar`](crate::HolidayCalendar) to walk across January 1.
pub fn last_open_session(
    date: NaiveDate,
    holidays: &HolidaySet,
) -> Result<SessionWindow, CalendarError> {
    if date.year() != holidays.year() {
        return Err(CalendarError::MissingYear { year: date.year() });
    }
    walk_back(date, |d| {
        if is_weekend(d) {
            Ok(false)
        } else if d.year() != holidays.year() {
            Err(CalendarError::MissingYear { year: d.year() })
        } else {
            Ok(is_open(d, holidays))
        }
    })
}

/// Step back one day at a time until `open` reports a session, examining at
/// most [`MAX_WALK_STEPS`] days.
pub(crate) fn walk_back<F>(date: NaiveDate, mut open: F) -> Result<SessionWindow, CalendarError>
where
    F: FnMut(NaiveDate) -> Result<bool, CalendarError>,
{
    let mut state = Walk::Checking(date);
    for _ in 0..MAX_WALK_STEPS {
        let Walk::Checking(current) = state else {
            break;
        };
        let prev = current
            .pred_opt()
            .ok_or(CalendarError::OutOfRange { date: current })?;
        state = if open(prev)? {
            Walk::Found(prev)
        } else {
            Walk::Checking(prev)
        };
    }

    match state {
        Walk::Found(start) => SessionWindow::starting(start),
        Walk::Checking(_) => Err(CalendarError::Unresolvable {
            from: date,
            max_steps: MAX_WALK_STEPS,
        }),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
