use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{FeatureError, FeatureResult};
use crate::play_table::PlayTable;

/// Columns pulled out of the raw play-by-play files.
pub const PBP_COLUMNS: &[&str] = &[
    "game_id",
    "season",
    "week",
    "season_type",
    "home_team",
    "away_team",
    "posteam",
    "down",
    "third_down_converted",
    "third_down_failed",
    "fourth_down_converted",
    "fourth_down_failed",
    "rushing_yards",
    "passing_yards",
    "pass_touchdown",
    "rush_touchdown",
    "return_touchdown",
    "interception",
    "fumble_lost",
    "td_team",
    "td_player_name",
    "result",
    "spread_line",
    "total_line",
];

pub fn raw_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("raw")
}

pub fn raw_season_path(data_dir: &Path, season: i32) -> PathBuf {
    raw_dir(data_dir).join(format!("play_by_play_{season}.parquet"))
}

/// Loads every season file of `seasons` into one table.
/// A season without a local file is reported, never skipped.
pub fn load_raw_pbp_data(
    data_dir: &Path,
    seasons: RangeInclusive<i32>,
) -> FeatureResult<PlayTable> {
    let mut table = PlayTable::default();
    for season in seasons {
        let path = raw_season_path(data_dir, season);
        if !path.exists() {
            return Err(FeatureError::RawDataMissing { path });
        }
        let part = PlayTable::from_parquet(&path, Some(PBP_COLUMNS))?;
        debug!(season, plays = part.len(), "loaded raw season");
        table.append(part)?;
    }
    info!(plays = table.len(), "loaded raw play-by-play data");
    Ok(table)
}
