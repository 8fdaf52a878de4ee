//! Shared runtime state for sw-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The schedule loop and
//! the manual-run route both go through [`AppState::run_recorded`], which
//! holds the run lock for the whole run.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sw_runtime::{ReportJob, RunOutcome, Schedule, ScheduledJob};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BusMsg: SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    Status(StatusSnapshot),
    RunCompleted(RunSummary),
    LogLine { level: String, msg: String },
}

impl BusMsg {
    pub fn event_name(&self) -> &'static str {
        match self {
            BusMsg::Heartbeat { .. } => "heartbeat",
            BusMsg::Status(_) => "status",
            BusMsg::RunCompleted(_) => "run_completed",
            BusMsg::LogLine { .. } => "log",
        }
    }
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health / status responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// RunSummary / StatusSnapshot
// ---------------------------------------------------------------------------

/// One finished run, as served by `/v1/report/latest`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Local date the run was for.
    pub today: NaiveDate,
    /// Resolved session (or the date named in a failure message).
    pub session_date: Option<NaiveDate>,
    /// "report" | "closed_weekend" | "closed_holiday" | "failed"
    pub kind: String,
    pub finished_at_utc: DateTime<Utc>,
    /// Exactly the text a notifier receives.
    pub text: String,
}

impl RunSummary {
    pub fn from_outcome(run_id: Uuid, today: NaiveDate, outcome: &RunOutcome) -> Self {
        Self {
            run_id,
            today,
            session_date: outcome.session_date(),
            kind: outcome.kind().to_string(),
            finished_at_utc: Utc::now(),
            text: outcome.render(),
        }
    }
}

/// Point-in-time snapshot of daemon state, returned by GET /v1/status and
/// carried inside SSE `status` events.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub daemon_uptime_secs: u64,
    /// "idle" | "running"
    pub state: String,
    pub active_run_id: Option<Uuid>,
    pub last_run_id: Option<Uuid>,
    pub last_run_today: Option<NaiveDate>,
    pub last_run_kind: Option<String>,
    pub next_fire_utc: Option<DateTime<Utc>>,
    pub send_time: String,
    pub timezone: String,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    /// Static build metadata.
    pub build: BuildInfo,
    /// Mutable run/status state.
    pub status: Arc<RwLock<StatusSnapshot>>,
    /// Most recent finished run.
    pub latest: Arc<RwLock<Option<RunSummary>>>,
    /// Held for the duration of a run; one run at a time.
    pub run_lock: Arc<Mutex<()>>,
    pub job: Arc<ReportJob>,
    pub schedule: Schedule,
}

impl AppState {
    pub fn new(job: ReportJob, schedule: Schedule) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);

        let initial_status = StatusSnapshot {
            daemon_uptime_secs: uptime_secs(),
            state: "idle".to_string(),
            active_run_id: None,
            last_run_id: None,
            last_run_today: None,
            last_run_kind: None,
            next_fire_utc: None,
            send_time: schedule.send_time.format("%H:%M").to_string(),
            timezone: schedule.tz.name().to_string(),
        };

        Self {
            bus,
            build: BuildInfo {
                service: "sw-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            status: Arc::new(RwLock::new(initial_status)),
            latest: Arc::new(RwLock::new(None)),
            run_lock: Arc::new(Mutex::new(())),
            job: Arc::new(job),
            schedule,
        }
    }

    /// Today in the schedule's zone.
    pub fn local_today(&self) -> NaiveDate {
        self.schedule.local_date(Utc::now())
    }

    /// Run the job for `today`, waiting for any in-flight run first, and
    /// record the result as the latest report.
    pub async fn run_recorded(&self, today: NaiveDate) -> (RunSummary, RunOutcome) {
        let _guard = self.run_lock.lock().await;

        let run_id = Uuid::new_v4();
        let snap = {
            let mut s = self.status.write().await;
            s.state = "running".to_string();
            s.active_run_id = Some(run_id);
            s.daemon_uptime_secs = uptime_secs();
            s.clone()
        };
        let _ = self.bus.send(BusMsg::Status(snap));

        let outcome = self.job.run_with_id(run_id, today).await;
        let summary = RunSummary::from_outcome(run_id, today, &outcome);

        *self.latest.write().await = Some(summary.clone());
        let snap = {
            let mut s = self.status.write().await;
            s.state = "idle".to_string();
            s.active_run_id = None;
            s.last_run_id = Some(run_id);
            s.last_run_today = Some(today);
            s.last_run_kind = Some(summary.kind.clone());
            s.daemon_uptime_secs = uptime_secs();
            s.clone()
        };

        info!(%run_id, %today, kind = %summary.kind, "run recorded");
        let level = if outcome.is_failure() { "error" } else { "info" };
        let _ = self.bus.send(BusMsg::LogLine {
            level: level.to_string(),
            msg: format!("run {run_id} for {today}: {}", summary.kind),
        });
        let _ = self.bus.send(BusMsg::Status(snap));
        let _ = self.bus.send(BusMsg::RunCompleted(summary.clone()));
        (summary, outcome)
    }

    pub async fn set_next_fire(&self, at: DateTime<Utc>) {
        self.status.write().await.next_fire_utc = Some(at);
    }
}

/// Adapter handing the schedule loop a job that records into `AppState`.
pub struct RecordedJob(pub Arc<AppState>);

#[async_trait::async_trait]
impl ScheduledJob for RecordedJob {
    async fn run_for(&self, today: NaiveDate) -> RunOutcome {
        self.0.run_recorded(today).await.1
    }

    async fn scheduled(&self, at: DateTime<Utc>) {
        self.0.set_next_fire(at).await;
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
