//! Daily schedule: fire once per local day at a fixed wall-clock time.

use std::sync::Arc;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::job::{ReportJob, RunOutcome};
use crate::notify::Notifier;

/// Local send time and the zone it is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub send_time: NaiveTime,
    pub tz: Tz,
}

impl Schedule {
    pub fn new(send_time: NaiveTime, tz: Tz) -> Self {
        Self { send_time, tz }
    }

    pub fn next_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_fire_after(now, self.send_time, self.tz)
    }

    /// Calendar date in the schedule's zone at `at`.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }
}

/// Work the schedule loop performs at each fire time.
///
/// `ReportJob` is the plain implementation; the daemon wraps it to record
/// state and serialize with manual runs.
#[async_trait::async_trait]
pub trait ScheduledJob: Send + Sync {
    async fn run_for(&self, today: NaiveDate) -> RunOutcome;

    /// Called whenever the loop computes its next fire time.
    async fn scheduled(&self, _at: DateTime<Utc>) {}
}

#[async_trait::async_trait]
impl ScheduledJob for ReportJob {
    async fn run_for(&self, today: NaiveDate) -> RunOutcome {
        self.run(today).await
    }
}

/// Next instant strictly after `now` at which the local clock in `tz` reads
/// `send_time`.
///
/// An ambiguous local time (DST fall-back) resolves to the earlier instant;
/// a local time inside a DST gap resolves to the first valid instant after
/// the gap.
pub fn next_fire_after(now: DateTime<Utc>, send_time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let mut day = today;
    for _ in 0..3 {
        if let Some(at) = resolve_local(tz, day, send_time) {
            if at > now {
                return at;
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    now + Duration::days(1)
}

fn resolve_local(tz: Tz, day: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    let mut local = day.and_time(time);
    // Gaps are at most a few hours; step until the clock is valid again.
    for _ in 0..(24 * 60) {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(t) => return Some(t.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest.with_timezone(&Utc)),
            LocalResult::None => local += Duration::minutes(1),
        }
    }
    None
}

/// Run `job` for `today` and deliver the rendered text. A delivery failure
/// is logged, not returned.
pub async fn fire(job: &dyn ScheduledJob, notifier: &dyn Notifier, today: NaiveDate) -> RunOutcome {
    let outcome = job.run_for(today).await;
    let text = outcome.render();
    if let Err(e) = notifier.send(&text).await {
        warn!(notifier = notifier.name(), error = %format!("{e:#}"), "notification failed");
    }
    outcome
}

/// Sleep until each fire time, run, notify; repeat until `shutdown` flips to
/// `true` (or its sender is dropped).
pub async fn run_schedule(
    job: Arc<dyn ScheduledJob>,
    notifier: Arc<dyn Notifier>,
    schedule: Schedule,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let now = Utc::now();
        let at = schedule.next_fire_after(now);
        job.scheduled(at).await;
        info!(next_fire = %at, tz = schedule.tz.name(), "schedule armed");

        let wait = (at - now).to_std().unwrap_or_default();
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                // Re-check the flag at the top of the loop.
                continue;
            }
        }

        let today = schedule.local_date(at);
        let outcome = fire(job.as_ref(), notifier.as_ref(), today).await;
        info!(%today, kind = outcome.kind(), "scheduled run delivered");
    }
    info!("schedule stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn fires_later_today_when_still_ahead() {
        // 09:00 EST
        let now = utc(2024, 1, 2, 14, 0);
        assert_eq!(next_fire_after(now, hm(14, 0), New_York), utc(2024, 1, 2, 19, 0));
    }

    #[test]
    fn fires_tomorrow_once_passed() {
        // 15:00 EST
        let now = utc(2024, 1, 2, 20, 0);
        assert_eq!(next_fire_after(now, hm(14, 0), New_York), utc(2024, 1, 3, 19, 0));
    }

    #[test]
    fn exactly_at_send_time_moves_to_tomorrow() {
        let now = utc(2024, 1, 2, 19, 0);
        assert_eq!(next_fire_after(now, hm(14, 0), New_York), utc(2024, 1, 3, 19, 0));
    }

    #[test]
    fn local_day_not_utc_day() {
        // 2024-01-02 23:30 EST is already Jan 3 in UTC.
        let now = utc(2024, 1, 3, 4, 30);
        assert_eq!(next_fire_after(now, hm(14, 0), New_York), utc(2024, 1, 3, 19, 0));
    }

    #[test]
    fn dst_switch_changes_utc_offset() {
        // Sunday 2024-03-10: EST -> EDT. 14:00 EDT is 18:00Z.
        let now = utc(2024, 3, 10, 12, 0);
        assert_eq!(next_fire_after(now, hm(14, 0), New_York), utc(2024, 3, 10, 18, 0));
    }

    #[test]
    fn dst_gap_resolves_to_end_of_gap() {
        // 02:30 does not exist on 2024-03-10 in New York; 03:00 EDT = 07:00Z.
        let now = utc(2024, 3, 10, 5, 0);
        assert_eq!(next_fire_after(now, hm(2, 30), New_York), utc(2024, 3, 10, 7, 0));
    }

    #[test]
    fn dst_overlap_takes_earlier_instant() {
        // 01:30 occurs twice on 2024-11-03; the EDT one is 05:30Z.
        let now = utc(2024, 11, 3, 4, 0);
        assert_eq!(next_fire_after(now, hm(1, 30), New_York), utc(2024, 11, 3, 5, 30));
    }

    #[test]
    fn local_date_uses_zone() {
        let s = Schedule::new(hm(14, 0), New_York);
        assert_eq!(
            s.local_date(utc(2024, 1, 3, 4, 30)),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }
}
