use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Local};
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::data_handler::{raw_dir, raw_season_path};
use crate::http_client::http_client;

const NFLVERSE_PBP_URL: &str = "https://github.com/nflverse/nflverse-data/releases/download/pbp";
const MAX_ATTEMPTS: u64 = 4;

/// First season with reliable betting lines.
pub const START_SEASON: i32 = 2006;

/// Latest season that has started. Seasons kick off in September.
pub fn current_season() -> i32 {
    let today = Local::now().date_naive();
    if today.month() >= 9 {
        today.year()
    } else {
        today.year() - 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Downloaded { bytes: usize },
    UpToDate,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SeasonFetch {
    pub season: i32,
    pub path: PathBuf,
    pub status: FetchStatus,
}

#[derive(Debug, Clone)]
pub struct UpdateSummary {
    pub data_dir: PathBuf,
    pub seasons: Vec<SeasonFetch>,
}

impl UpdateSummary {
    pub fn downloaded(&self) -> usize {
        self.seasons
            .iter()
            .filter(|s| matches!(s.status, FetchStatus::Downloaded { .. }))
            .count()
    }

    pub fn failed(&self) -> Vec<&SeasonFetch> {
        self.seasons
            .iter()
            .filter(|s| matches!(s.status, FetchStatus::Failed(_)))
            .collect()
    }
}

/// Seasons whose file must be (re)downloaded: anything missing locally, plus
/// the in-progress season, which keeps growing week by week.
pub fn seasons_to_fetch(
    data_dir: &Path,
    seasons: RangeInclusive<i32>,
    current: i32,
) -> Vec<i32> {
    seasons
        .filter(|season| *season >= current || !raw_season_path(data_dir, *season).exists())
        .collect()
}

/// Brings the local raw season files up to date. Per-season failures are
/// collected in the summary rather than aborting the other seasons.
pub fn update_raw_pbp_data(
    data_dir: &Path,
    seasons: RangeInclusive<i32>,
) -> Result<UpdateSummary> {
    if seasons.is_empty() {
        return Err(anyhow!("empty season range passed to update"));
    }
    let dir = raw_dir(data_dir);
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    let client = http_client()?;
    let stale = seasons_to_fetch(data_dir, seasons.clone(), current_season());
    let mut out = Vec::new();
    for season in seasons {
        let path = raw_season_path(data_dir, season);
        let status = if stale.contains(&season) {
            match download_file(client, &season_url(season), &path) {
                Ok(bytes) => {
                    info!(season, bytes, "downloaded play-by-play season");
                    FetchStatus::Downloaded { bytes }
                }
                Err(err) => {
                    warn!(season, error = %err, "play-by-play download failed");
                    FetchStatus::Failed(format!("{err:#}"))
                }
            }
        } else {
            FetchStatus::UpToDate
        };
        out.push(SeasonFetch {
            season,
            path,
            status,
        });
    }

    Ok(UpdateSummary {
        data_dir: data_dir.to_path_buf(),
        seasons: out,
    })
}

fn season_url(season: i32) -> String {
    format!("{NFLVERSE_PBP_URL}/play_by_play_{season}.parquet")
}

fn download_file(client: &Client, url: &str, path: &Path) -> Result<usize> {
    let mut last_err: Option<anyhow::Error> = None;
    for attempt in 1..=MAX_ATTEMPTS {
        let fetched = client
            .get(url)
            .send()
            .with_context(|| format!("request {url}"))
            .and_then(|res| {
                res.error_for_status()
                    .with_context(|| format!("status for {url}"))
            })
            .and_then(|res| res.bytes().with_context(|| format!("read body {url}")));
        match fetched {
            Ok(bytes) => {
                let tmp = path.with_extension("parquet.tmp");
                fs::write(&tmp, &bytes).with_context(|| format!("write {}", tmp.display()))?;
                fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
                return Ok(bytes.len());
            }
            Err(err) => {
                last_err = Some(err);
                if attempt < MAX_ATTEMPTS {
                    std::thread::sleep(Duration::from_millis(500 * attempt));
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("download failed for {url}")))
}
