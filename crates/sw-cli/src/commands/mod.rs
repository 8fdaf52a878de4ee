//! Command handler modules for the `sw` CLI.
//!
//! Shared config loading lives here; command logic lives in the submodules.

pub mod report;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sw_config::{
    load_layered_yaml, report_unused_keys, ConfigMode, LoadedConfig, UnusedKeyPolicy,
    WatchSettings,
};
use tracing::warn;

/// Config loaded and validated for one command invocation.
pub struct CommandConfig {
    pub loaded: LoadedConfig,
    pub settings: WatchSettings,
}

/// Load layered YAML, warn about keys this mode ignores, and build the typed
/// settings.
pub fn load_config(paths: &[String], mode: ConfigMode) -> Result<CommandConfig> {
    let loaded = load_layered_yaml(paths)?;

    let unused = report_unused_keys(mode, &loaded.config_json, UnusedKeyPolicy::Warn)?;
    if !unused.is_clean() {
        warn!(
            mode = unused.mode,
            keys = ?unused.unused_leaf_pointers,
            "config keys not read in this mode"
        );
    }

    let settings =
        WatchSettings::from_config_json(&loaded.config_json).context("invalid config")?;
    Ok(CommandConfig { loaded, settings })
}

/// `--date` if given, else today in the configured zone.
pub fn resolve_date(explicit: Option<NaiveDate>, settings: &WatchSettings) -> Result<NaiveDate> {
    match explicit {
        Some(d) => Ok(d),
        None => Ok(Utc::now().with_timezone(&settings.timezone()?).date_naive()),
    }
}
