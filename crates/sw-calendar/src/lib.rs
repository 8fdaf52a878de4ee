//! sw-calendar
//!
//! Trading-day resolution for a single market.
//!
//! Deterministic, pure logic. No IO, no wall-clock, no randomness. Callers
//! supply "today" and the holiday records for the relevant year(s); this crate
//! answers "is the market open" and "which session did we last complete".

mod error;
mod holidays;
mod session;

pub use error::CalendarError;
pub use holidays::{month_number, parse_holiday_record, HolidayCalendar, HolidaySet, MONTHS};
pub use session::{
    is_open, is_weekend, last_open_session, market_status, MarketStatus, SessionWindow,
    MAX_WALK_STEPS,
};
