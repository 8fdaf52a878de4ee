//! sw-runtime
//!
//! Orchestration around the pure core: one report run (`ReportJob`), its
//! outcome and rendering, delivery (`Notifier`) and the daily schedule.

mod error;
pub mod job;
pub mod notify;
pub mod schedule;
pub mod wiring;

pub use error::RunError;
pub use job::{
    failure_message, ReportJob, Resolution, RunOutcome, HOLIDAY_MESSAGE, WEEKEND_MESSAGE,
};
pub use notify::{chunk_message, DiscordWebhookNotifier, LogNotifier, Notifier};
pub use schedule::{fire, next_fire_after, run_schedule, Schedule, ScheduledJob};
