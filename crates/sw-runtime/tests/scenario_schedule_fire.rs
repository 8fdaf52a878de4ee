//! A scheduled fire delivers exactly one text block and survives a failing
//! notifier.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime};
use sw_calendar::MarketStatus;
use sw_runtime::{fire, run_schedule, Notifier, RunOutcome, Schedule, ScheduledJob};
use tokio::sync::watch;

struct ClosedJob;

#[async_trait::async_trait]
impl ScheduledJob for ClosedJob {
    async fn run_for(&self, _today: NaiveDate) -> RunOutcome {
        RunOutcome::Closed(MarketStatus::ClosedWeekend)
    }
}

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait::async_trait]
impl Notifier for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(anyhow!("webhook down"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn fire_sends_rendered_outcome() {
    let notifier = Recorder::default();
    let outcome = fire(&ClosedJob, &notifier, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()).await;

    assert_eq!(outcome.kind(), "closed_weekend");
    assert_eq!(
        *notifier.sent.lock().unwrap(),
        vec!["It's the weekend, the market is closed.".to_string()]
    );
}

#[tokio::test]
async fn notifier_failure_does_not_fail_the_fire() {
    let notifier = Recorder {
        fail: true,
        ..Recorder::default()
    };
    let outcome = fire(&ClosedJob, &notifier, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()).await;
    assert!(!outcome.is_failure());
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn schedule_stops_on_shutdown() {
    let (tx, rx) = watch::channel(false);
    let notifier = Arc::new(Recorder::default());
    let schedule = Schedule::new(
        NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        chrono_tz::America::New_York,
    );

    let handle = tokio::spawn(run_schedule(
        Arc::new(ClosedJob),
        notifier.clone(),
        schedule,
        rx,
    ));
    tx.send(true).unwrap();

    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("schedule loop did not stop")
        .unwrap();
    assert!(notifier.sent.lock().unwrap().is_empty());
}
