use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FeatureError, FeatureResult};
use crate::feature_merge::{
    FeatureTable, SCHEDULE_COLUMNS, build_feature_table, schedule_from_plays,
};
use crate::game_factory::REQUIRED_COLUMNS;
use crate::play_table::PlayTable;
use crate::team_games::build_team_game_records;
use crate::temporal::{TemporalConfig, aggregate_team_features};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeasonType {
    #[default]
    Regular,
    Post,
}

impl SeasonType {
    pub fn code(self) -> &'static str {
        match self {
            SeasonType::Regular => "REG",
            SeasonType::Post => "POST",
        }
    }
}

impl FromStr for SeasonType {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REG" => Ok(SeasonType::Regular),
            "POST" => Ok(SeasonType::Post),
            other => Err(FeatureError::InvalidConfig(format!(
                "unknown season type '{other}' (expected REG or POST)"
            ))),
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw play table to model-ready feature table.
///
/// Only rows of `season_type` feed the statistics and the game list. Any
/// schema or value error aborts the whole run; no partial table is returned.
pub fn create_final_feature_set(
    pbp: &PlayTable,
    season_type: SeasonType,
    config: &TemporalConfig,
) -> FeatureResult<FeatureTable> {
    info!(plays = pbp.len(), %season_type, "starting play-by-play feature pipeline");

    let mut required = SCHEDULE_COLUMNS.to_vec();
    required.extend(
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !SCHEDULE_COLUMNS.contains(c)),
    );
    let missing = pbp.missing_columns(&required);
    if !missing.is_empty() {
        return Err(FeatureError::MissingColumns {
            context: "the feature pipeline",
            columns: missing,
        });
    }

    let rows = pbp.filter(|row| row.str("season_type") == Some(season_type.code()));
    if rows.is_empty() {
        return Err(FeatureError::EmptyInput);
    }
    let schedule = schedule_from_plays(&rows)?;
    let games = rows.group_by("game_id")?;
    info!(games = games.len(), "grouped plays into games");

    let records = build_team_game_records(&games)?;
    let team_features = aggregate_team_features(&records, config);
    info!(
        team_rows = team_features.rows.len(),
        features = team_features.columns.len(),
        "computed point-in-time team features"
    );

    let table = build_feature_table(&schedule, &team_features);
    info!(rows = table.rows.len(), "feature table ready");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_type_parses_codes() {
        assert_eq!("reg".parse::<SeasonType>().unwrap(), SeasonType::Regular);
        assert_eq!("POST".parse::<SeasonType>().unwrap(), SeasonType::Post);
        assert!("WILD".parse::<SeasonType>().is_err());
    }
}
