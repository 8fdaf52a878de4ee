//! The shipped `config/base.yaml` loads, validates and is fully consumed by
//! the daemon.

use std::path::PathBuf;

use sw_config::{load_layered_yaml, report_unused_keys, ConfigMode, UnusedKeyPolicy, WatchSettings};

fn shipped(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../config")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn base_yaml() -> String {
    shipped("base.yaml")
}

#[test]
fn base_config_is_valid_and_clean_for_daemon() {
    let loaded = load_layered_yaml(&[base_yaml()]).unwrap();
    let settings = WatchSettings::from_config_json(&loaded.config_json).unwrap();
    assert_eq!(settings.report.top_n, 5);
    assert!(settings.calendar.holidays_url.is_some());
    assert!(settings.universe.url.is_some());

    report_unused_keys(ConfigMode::Daemon, &loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
}

#[test]
fn report_mode_ignores_schedule_and_daemon_sections() {
    let loaded = load_layered_yaml(&[base_yaml()]).unwrap();
    let report =
        report_unused_keys(ConfigMode::Report, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert!(report
        .unused_leaf_pointers
        .iter()
        .all(|p| p.starts_with("/schedule") || p.starts_with("/daemon")));
}

#[test]
fn offline_overlay_switches_to_local_lists() {
    let loaded = load_layered_yaml(&[base_yaml(), shipped("offline.yaml")]).unwrap();
    let settings = WatchSettings::from_config_json(&loaded.config_json).unwrap();
    assert!(settings.calendar.holidays_url.is_none());
    assert!(settings.universe.url.is_none());
    assert_eq!(
        settings.calendar.holidays_file.as_deref(),
        Some("config/holidays/nyse-{year}.txt")
    );
    assert!(settings.universe.symbols.iter().any(|s| s == "BRK.B"));

    report_unused_keys(ConfigMode::Daemon, &loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
}
