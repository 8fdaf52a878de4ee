use anyhow::Result;
use chrono::NaiveDate;
use sw_config::{resolve_secrets_for_mode, ConfigMode};
use sw_runtime::wiring::{build_job, build_notifier};
use sw_runtime::{Notifier, Resolution};
use tracing::{info, warn};
use uuid::Uuid;

use super::{load_config, resolve_date};

pub async fn calendar(config_paths: Vec<String>, date: Option<NaiveDate>) -> Result<()> {
    let cfg = load_config(&config_paths, ConfigMode::Report)?;
    let today = resolve_date(date, &cfg.settings)?;
    let job = build_job(&cfg.settings)?;

    println!("date={today}");
    match job.resolve(today).await? {
        Resolution::Closed { status } => {
            println!("status={}", status.as_str());
        }
        Resolution::Session { window } => {
            println!("status=open");
            println!("session_start={}", window.start_date);
            println!("session_end={}", window.end_date);
        }
    }
    Ok(())
}

pub async fn report(config_paths: Vec<String>, date: Option<NaiveDate>, notify: bool) -> Result<()> {
    let cfg = load_config(&config_paths, ConfigMode::Report)?;
    let secrets = resolve_secrets_for_mode(&cfg.loaded.config_json, ConfigMode::Report)?;
    let today = resolve_date(date, &cfg.settings)?;
    let job = build_job(&cfg.settings)?;

    let run_id = Uuid::new_v4();
    info!(%run_id, config_hash = %cfg.loaded.config_hash, "cli report");
    let outcome = job.run_with_id(run_id, today).await;
    let text = outcome.render();
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }

    if notify {
        let notifier = build_notifier(&secrets);
        if let Err(e) = notifier.send(&text).await {
            warn!(notifier = notifier.name(), error = %format!("{e:#}"), "notification failed");
        }
    }
    Ok(())
}
