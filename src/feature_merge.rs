use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::pbp_model::TeamSide;
use crate::play_table::{TableRow, TableSlice};
use crate::team_games::{read_season, read_week};
use crate::temporal::{TeamFeatureRow, TeamFeatureTable};

pub const SCHEDULE_COLUMNS: &[&str] = &[
    "game_id",
    "season",
    "week",
    "season_type",
    "home_team",
    "away_team",
];

pub const ID_COLUMNS: &[&str] = &[
    "game_id",
    "season",
    "week",
    "home_team",
    "away_team",
    "spread_line",
    "total_line",
    "result",
];

/// Game-level row taken from the first play of each game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleGame {
    pub game_id: String,
    pub season: i32,
    pub week: u32,
    pub season_type: String,
    pub home_team: String,
    pub away_team: String,
    pub result: Option<f64>,
    pub spread_line: Option<f64>,
    pub total_line: Option<f64>,
}

impl ScheduleGame {
    pub fn is_completed(&self) -> bool {
        self.result.is_some()
    }

    pub fn team(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    fn from_row(row: &TableRow<'_>) -> FeatureResult<Self> {
        let text = |column: &str| {
            row.str(column)
                .map(str::to_string)
                .ok_or_else(|| FeatureError::InvalidValue {
                    column: column.to_string(),
                    row: row.index(),
                })
        };
        Ok(Self {
            game_id: text("game_id")?,
            season: read_season(row)?,
            week: read_week(row)?,
            season_type: text("season_type")?,
            home_team: text("home_team")?,
            away_team: text("away_team")?,
            result: row.get("result").as_f64(),
            spread_line: row.get("spread_line").as_f64(),
            total_line: row.get("total_line").as_f64(),
        })
    }
}

/// One row per distinct game id, in first-appearance order.
pub fn schedule_from_plays(slice: &TableSlice<'_>) -> FeatureResult<Vec<ScheduleGame>> {
    let missing = slice.table().missing_columns(SCHEDULE_COLUMNS);
    if !missing.is_empty() {
        return Err(FeatureError::MissingColumns {
            context: "the game table",
            columns: missing,
        });
    }
    slice
        .group_by("game_id")?
        .iter()
        .filter_map(|(_, plays)| plays.first())
        .map(|row| ScheduleGame::from_row(&row))
        .collect()
}

/// Model-ready row: game identifiers plus both teams' point-in-time features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub game_id: String,
    pub season: i32,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    pub spread_line: Option<f64>,
    pub total_line: Option<f64>,
    pub result: Option<f64>,
    pub home: Vec<Option<f64>>,
    pub away: Vec<Option<f64>>,
}

impl FeatureRow {
    pub fn features(&self, side: TeamSide) -> &[Option<f64>] {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    pub feature_names: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Identifier columns followed by home_ then away_ prefixed features.
    pub fn header(&self) -> Vec<String> {
        let mut out = ID_COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        for side in TeamSide::BOTH {
            out.extend(
                self.feature_names
                    .iter()
                    .map(|name| format!("{}_{name}", side.label())),
            );
        }
        out
    }

    /// Feature value by prefixed column name, e.g. `home_rushing_yards_season_avg`.
    pub fn value(&self, row: &FeatureRow, column: &str) -> Option<f64> {
        let (side, name) = if let Some(name) = column.strip_prefix("home_") {
            (TeamSide::Home, name)
        } else if let Some(name) = column.strip_prefix("away_") {
            (TeamSide::Away, name)
        } else {
            return None;
        };
        let idx = self.feature_names.iter().position(|c| c == name)?;
        row.features(side).get(idx).copied().flatten()
    }

    pub fn find(&self, game_id: &str) -> Option<&FeatureRow> {
        self.rows.iter().find(|r| r.game_id == game_id)
    }
}

/// Left-joins team features onto each game twice, matching (season, week, team)
/// for the home and then the away team. Unmatched sides carry missing values.
pub fn merge_team_features(games: &[ScheduleGame], features: &TeamFeatureTable) -> FeatureTable {
    let mut lookup: HashMap<(i32, u32, &str), &TeamFeatureRow> = HashMap::new();
    for row in &features.rows {
        lookup
            .entry((row.season, row.week, row.team.as_str()))
            .or_insert(row);
    }

    let width = features.columns.len();
    let side_values = |game: &ScheduleGame, side: TeamSide| -> Vec<Option<f64>> {
        match lookup.get(&(game.season, game.week, game.team(side))) {
            Some(row) => row.values.iter().copied().map(Some).collect(),
            None => vec![None; width],
        }
    };

    let rows = games
        .iter()
        .map(|game| FeatureRow {
            game_id: game.game_id.clone(),
            season: game.season,
            week: game.week,
            home_team: game.home_team.clone(),
            away_team: game.away_team.clone(),
            spread_line: game.spread_line,
            total_line: game.total_line,
            result: game.result,
            home: side_values(game, TeamSide::Home),
            away: side_values(game, TeamSide::Away),
        })
        .collect();

    FeatureTable {
        feature_names: features.columns.clone(),
        rows,
    }
}

/// Completed games only, merged, without the opening week of each season.
pub fn build_feature_table(games: &[ScheduleGame], features: &TeamFeatureTable) -> FeatureTable {
    let completed = games
        .iter()
        .filter(|g| g.is_completed())
        .cloned()
        .collect::<Vec<_>>();
    let mut table = merge_team_features(&completed, features);
    drop_opening_week(&mut table);
    table
}

// Week-1 rows have no prior games, so every feature is zero.
pub fn drop_opening_week(table: &mut FeatureTable) {
    table.rows.retain(|row| row.week != 1);
}
