use std::{
    env,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

use crate::{
    canteen_loader::load_canteens,
    data_backend::{cafenero_parser, stw_parser},
    data_types::{
        canteen_data_types::{CanteenMeta, Source},
        DayMenu,
    },
    errors::{FeedError, FetchError},
    feed_builder::{build_meta_xml, FeedBuilder},
    fetcher::{pace, Fetcher},
};

pub struct RunConfig {
    pub canteens_file: PathBuf,
    pub output_dir: PathBuf,
    pub days: u32,
    pub delay_ms: u64,
    pub only: Option<String>,
    pub json: bool,
    pub pdf_url: String,
}

pub fn logger_init(module_path: &str) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            module_path,
            if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

/// Processes every configured canteen and returns how many of them failed.
///
/// A failing canteen is logged and skipped, its siblings still get their
/// feeds written.
pub async fn run(config: &RunConfig, today: NaiveDate) -> Result<usize> {
    let canteens = load_canteens(&config.canteens_file)
        .with_context(|| format!("loading {}", config.canteens_file.display()))?;
    let fetcher = Fetcher::new()?;

    let mut failed = 0;
    for canteen in canteens.values() {
        if config.only.as_ref().is_some_and(|only| *only != canteen.key) {
            continue;
        }

        let Some(source) = Source::from_source_str(&canteen.source) else {
            log::warn!(
                "{}: no parser for source {:?}, skipping",
                canteen.key,
                canteen.source
            );
            continue;
        };

        let now = Instant::now();
        let result = match collect_day_menus(&fetcher, canteen, source, today, config).await {
            Ok(menus) => write_outputs(&config.output_dir, canteen, &menus, config.json)
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => log::info!(
                "{:3} | {:30} | {} ({:.2?})",
                canteen.id,
                canteen.name,
                canteen.city,
                now.elapsed()
            ),
            Err(e) => {
                failed += 1;
                log::error!("{}: {:#}", canteen.key, e);
            }
        }
    }

    Ok(failed)
}

pub async fn collect_day_menus(
    fetcher: &Fetcher,
    canteen: &CanteenMeta,
    source: Source,
    today: NaiveDate,
    config: &RunConfig,
) -> Result<Vec<DayMenu>, FetchError> {
    match source {
        Source::StwBerlin => {
            let mut menus = Vec::new();
            for offset in 0..config.days {
                if offset > 0 {
                    pace(config.delay_ms).await;
                }
                let requested_date = today + Duration::days(offset.into());
                menus.extend(stw_parser::get_day_menus(fetcher, canteen.id, requested_date).await?);
            }
            Ok(menus)
        }
        Source::Cafenero => cafenero_parser::get_today_menus(fetcher, &config.pdf_url, today).await,
    }
}

/// Writes `<key>.xml`, `<key>.meta.xml` and optionally `<key>.json`.
pub async fn write_outputs(
    output_dir: &Path,
    canteen: &CanteenMeta,
    menus: &[DayMenu],
    json: bool,
) -> Result<(), FeedError> {
    tokio::fs::create_dir_all(output_dir).await?;

    let mut builder = FeedBuilder::new();
    builder.extend(menus);
    log::debug!("{}: {} days in feed", canteen.key, builder.day_count());

    let feed_path = output_dir.join(format!("{}.xml", canteen.key));
    tokio::fs::write(&feed_path, builder.to_xml(canteen)?).await?;

    let meta_path = output_dir.join(format!("{}.meta.xml", canteen.key));
    tokio::fs::write(&meta_path, build_meta_xml(canteen)?).await?;

    if json {
        let json_path = output_dir.join(format!("{}.json", canteen.key));
        tokio::fs::write(&json_path, serde_json::to_string_pretty(menus)?).await?;
    }

    log::debug!("{}: wrote {}", canteen.key, feed_path.display());
    Ok(())
}
