use std::fmt;

use chrono::NaiveDate;

/// Errors produced while building holiday data or resolving a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// A raw holiday record did not match `"<Weekday>, <Month> <Day>"`.
    MalformedHoliday { record: String, reason: &'static str },
    /// A month/day pair outside 1–12 / 1–31.
    InvalidHolidayDay { month: u32, day: u32 },
    /// A date in `year` had to be checked but no holiday data was supplied.
    MissingYear { year: i32 },
    /// The backward walk hit its step cap without finding an open day.
    Unresolvable { from: NaiveDate, max_steps: u32 },
    /// Date arithmetic left chrono's supported range.
    OutOfRange { date: NaiveDate },
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::MalformedHoliday { record, reason } => {
                write!(f, "malformed holiday record '{record}': {reason}")
            }
            CalendarError::InvalidHolidayDay { month, day } => {
                write!(f, "invalid holiday month/day: {month}/{day}")
            }
            CalendarError::MissingYear { year } => {
                write!(f, "no holiday data supplied for year {year}")
            }
            CalendarError::Unresolvable { from, max_steps } => {
                write!(
                    f,
                    "no open session found within {max_steps} days before {from}"
                )
            }
            CalendarError::OutOfRange { date } => {
                write!(f, "date arithmetic out of range at {date}")
            }
        }
    }
}

impl std::error::Error for CalendarError {}
