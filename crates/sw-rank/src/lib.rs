//! sw-rank
//!
//! Single-session performance ranking.
//!
//! Takes open/close prices for one resolved session, computes the percent
//! change per symbol and extracts the top-N and bottom-N with a partial
//! selection. Pure logic: no IO, no wall-clock. Excluded entries are reported
//! back to the caller and logged through `tracing`.

mod error;
mod format;
mod matrix;
mod rank;

pub use error::DataError;
pub use format::{format_2dp, render_entry, render_report};
pub use matrix::{PriceMatrix, SessionQuote};
pub use rank::{percent_change, rank, rank_matrix, RankedEntry, RankingResult};

/// Default top/bottom result count.
pub const DEFAULT_TOP_N: usize = 5;
