//! Typed view over the merged config JSON.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::secrets::DEFAULT_WEBHOOK_ENV;

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_SEND_TIME: &str = "14:00";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_DAEMON_BIND: &str = "127.0.0.1:8899";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub report: ReportSettings,
    pub schedule: ScheduleSettings,
    pub calendar: CalendarSettings,
    pub universe: UniverseSettings,
    pub feed: FeedSettings,
    pub discord: DiscordSettings,
    pub daemon: DaemonSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub top_n: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Local wall-clock time, `HH:MM`.
    pub send_time: String,
    /// IANA zone name.
    pub timezone: String,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            send_time: DEFAULT_SEND_TIME.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Year (as a string key) to holiday records like `"Monday, January 1"`.
    pub holidays: BTreeMap<String, Vec<String>>,
    /// One record per line; may contain `{year}`.
    pub holidays_file: Option<String>,
    /// Published holiday table page (one column per year).
    pub holidays_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseSettings {
    pub symbols: Vec<String>,
    pub csv_path: Option<String>,
    /// Constituents page or CSV export fetched on every run.
    pub url: Option<String>,
    pub csv_column: String,
}

impl Default for UniverseSettings {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            csv_path: None,
            url: None,
            csv_column: "Symbol".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    #[default]
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub kind: FeedKind,
    /// Overrides the Yahoo chart host (tests, proxies).
    pub base_url: Option<String>,
    pub csv_path: Option<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSettings {
    /// NAME of the env var holding the webhook URL.
    pub webhook_env: String,
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            webhook_env: DEFAULT_WEBHOOK_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    pub bind: String,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_DAEMON_BIND.to_string(),
        }
    }
}

impl WatchSettings {
    /// Deserialize and validate.
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let settings: WatchSettings = serde_json::from_value(config_json.clone())
            .context("config does not match the settings shape")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.report.top_n == 0 {
            bail!("report.top_n must be at least 1");
        }
        self.send_time()?;
        self.timezone()?;
        self.holiday_years()?;

        let u = &self.universe;
        if u.symbols.is_empty() && u.csv_path.is_none() && u.url.is_none() {
            bail!("universe needs one of symbols, csv_path or url");
        }
        if self.feed.kind == FeedKind::Csv && self.feed.csv_path.is_none() {
            bail!("feed.kind=csv requires feed.csv_path");
        }
        if self.feed.concurrency == Some(0) {
            bail!("feed.concurrency must be at least 1");
        }
        Ok(())
    }

    pub fn send_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.schedule.send_time.trim(), "%H:%M").with_context(|| {
            format!(
                "schedule.send_time '{}' is not HH:MM",
                self.schedule.send_time
            )
        })
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.schedule
            .timezone
            .trim()
            .parse::<Tz>()
            .map_err(|e| anyhow!("schedule.timezone '{}': {e}", self.schedule.timezone))
    }

    /// Inline holiday records keyed by numeric year.
    pub fn holiday_years(&self) -> Result<BTreeMap<i32, Vec<String>>> {
        self.calendar
            .holidays
            .iter()
            .map(|(k, v)| {
                let year: i32 = k
                    .trim()
                    .parse()
                    .with_context(|| format!("calendar.holidays key '{k}' is not a year"))?;
                Ok((year, v.clone()))
            })
            .collect()
    }
}
