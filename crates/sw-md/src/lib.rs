//! sw-md
//!
//! Collaborator boundary for everything the ranking core reads from the
//! outside world: holiday records, the ticker universe and session prices.
//!
//! This crate owns the provider traits and the concrete adapters. It does
//! **not** resolve trading days or rank anything; callers (sw-runtime) hand
//! the fetched data to sw-calendar / sw-rank.

pub mod csv_feed;
pub mod holidays;
pub mod html_table;
mod http;
pub mod source;
pub mod symbols;
pub mod universe;
pub mod yahoo;

pub use csv_feed::CsvPriceFeed;
pub use holidays::{FileHolidaySource, HttpHolidaySource, StaticHolidaySource};
pub use source::{HolidaySource, PriceFeed, SessionPricesRequest, UniverseSource};
pub use symbols::{normalize_symbol, normalize_universe};
pub use universe::{CsvUniverse, HttpUniverse, StaticUniverse};
pub use yahoo::YahooChartFeed;
