use std::fmt;

use sw_calendar::CalendarError;
use sw_rank::DataError;

/// Why a report run did not produce a ranking.
#[derive(Debug)]
pub enum RunError {
    /// Holiday data missing or malformed, or the walk did not terminate.
    Calendar(CalendarError),
    /// Prices could not be aligned or ranked.
    Data(DataError),
    /// A collaborator (holiday source, universe, price feed) failed.
    Fetch(anyhow::Error),
}

impl RunError {
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Calendar(_) => "calendar",
            RunError::Data(_) => "data",
            RunError::Fetch(_) => "fetch",
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Calendar(e) => write!(f, "calendar: {e}"),
            RunError::Data(e) => write!(f, "data: {e}"),
            // Alternate form keeps the context chain on one line.
            RunError::Fetch(e) => write!(f, "fetch: {e:#}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Calendar(e) => Some(e),
            RunError::Data(e) => Some(e),
            RunError::Fetch(e) => Some(&**e),
        }
    }
}

impl From<CalendarError> for RunError {
    fn from(e: CalendarError) -> Self {
        RunError::Calendar(e)
    }
}

impl From<DataError> for RunError {
    fn from(e: DataError) -> Self {
        RunError::Data(e)
    }
}

impl From<anyhow::Error> for RunError {
    fn from(e: anyhow::Error) -> Self {
        RunError::Fetch(e)
    }
}
