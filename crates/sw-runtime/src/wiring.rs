//! Collaborators built from `WatchSettings`.

use std::sync::Arc;

use anyhow::Result;
use sw_config::{FeedKind, ResolvedSecrets, WatchSettings};
use sw_md::{
    CsvPriceFeed, CsvUniverse, FileHolidaySource, HolidaySource, HttpHolidaySource, HttpUniverse,
    PriceFeed, StaticHolidaySource, StaticUniverse, UniverseSource, YahooChartFeed,
};
use tracing::info;

use crate::job::ReportJob;
use crate::notify::{DiscordWebhookNotifier, LogNotifier, Notifier};
use crate::schedule::Schedule;

/// Precedence: published page, then file, then inline records.
pub fn holiday_source(settings: &WatchSettings) -> Result<Arc<dyn HolidaySource>> {
    if let Some(url) = &settings.calendar.holidays_url {
        return Ok(Arc::new(HttpHolidaySource::new_with_base_url(url.clone())));
    }
    if let Some(path) = &settings.calendar.holidays_file {
        return Ok(Arc::new(FileHolidaySource::new(path.clone())));
    }
    Ok(Arc::new(StaticHolidaySource::new(settings.holiday_years()?)))
}

/// Precedence: fetched listing, then local CSV, then the inline list.
pub fn universe_source(settings: &WatchSettings) -> Arc<dyn UniverseSource> {
    let u = &settings.universe;
    if let Some(url) = &u.url {
        let listing = HttpUniverse::new_with_base_url(url.clone()).with_column(u.csv_column.clone());
        return Arc::new(listing);
    }
    match &u.csv_path {
        Some(path) => Arc::new(CsvUniverse::with_column(path.clone(), u.csv_column.clone())),
        None => Arc::new(StaticUniverse::new(u.symbols.iter().cloned())),
    }
}

pub fn price_feed(settings: &WatchSettings) -> Result<Arc<dyn PriceFeed>> {
    let f = &settings.feed;
    match f.kind {
        FeedKind::Yahoo => {
            let mut feed = match &f.base_url {
                Some(url) => YahooChartFeed::new_with_base_url(url.clone()),
                None => YahooChartFeed::new(),
            };
            if let Some(c) = f.concurrency {
                feed = feed.with_concurrency(c);
            }
            Ok(Arc::new(feed))
        }
        FeedKind::Csv => {
            let path = f
                .csv_path
                .clone()
                .ok_or_else(|| anyhow::anyhow!("feed.kind=csv requires feed.csv_path"))?;
            Ok(Arc::new(CsvPriceFeed::new(path)))
        }
    }
}

pub fn build_job(settings: &WatchSettings) -> Result<ReportJob> {
    let holidays = holiday_source(settings)?;
    let universe = universe_source(settings);
    let feed = price_feed(settings)?;
    info!(
        holidays = holidays.source_name(),
        universe = universe.source_name(),
        feed = feed.source_name(),
        top_n = settings.report.top_n,
        "report job wired"
    );
    Ok(ReportJob::new(holidays, universe, feed, settings.report.top_n))
}

pub fn build_schedule(settings: &WatchSettings) -> Result<Schedule> {
    Ok(Schedule::new(settings.send_time()?, settings.timezone()?))
}

/// Discord when a webhook resolved, otherwise the log.
pub fn build_notifier(secrets: &ResolvedSecrets) -> Arc<dyn Notifier> {
    match &secrets.discord_webhook {
        Some(url) => Arc::new(DiscordWebhookNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    }
}
