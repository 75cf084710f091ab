use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FeatureError, FeatureResult};
use crate::game_factory::game_from_single_game_table;
use crate::game_stats::{StatLine, stat_lines_for_game};
use crate::pbp_model::TeamSide;
use crate::play_table::{TableRow, TableSlice};

/// One team's numbers for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameRecord {
    pub season: i32,
    pub week: u32,
    pub team: String,
    pub game_id: String,
    pub opponent: String,
    pub side: TeamSide,
    pub stats: StatLine,
}

/// Builds the two team rows of one game's slice.
pub fn team_records_for_game(slice: &TableSlice<'_>) -> FeatureResult<[TeamGameRecord; 2]> {
    let game = game_from_single_game_table(slice)?;
    let first = slice.first().ok_or(FeatureError::EmptyInput)?;
    let season = read_season(&first)?;
    let week = read_week(&first)?;
    let lines = stat_lines_for_game(&game);

    let record = |side: TeamSide| TeamGameRecord {
        season,
        week,
        team: game.team(side).to_string(),
        game_id: game.game_id().to_string(),
        opponent: game.team(side.opposite()).to_string(),
        side,
        stats: lines[side],
    };
    Ok([record(TeamSide::Home), record(TeamSide::Away)])
}

/// Per-game statistics table, one row per team per game, ordered by
/// (team, season, week, game_id) so the temporal step sees each team-season
/// chronologically. Games are processed in parallel; ordering is restored after.
pub fn build_team_game_records(
    games: &[(String, TableSlice<'_>)],
) -> FeatureResult<Vec<TeamGameRecord>> {
    let per_game = games
        .par_iter()
        .map(|(_, slice)| team_records_for_game(slice))
        .collect::<FeatureResult<Vec<_>>>()?;

    let mut records = per_game.into_iter().flatten().collect::<Vec<_>>();
    sort_chronologically(&mut records);
    debug!(games = games.len(), rows = records.len(), "built team game records");
    Ok(records)
}

pub fn sort_chronologically(records: &mut [TeamGameRecord]) {
    records.sort_by(|a, b| {
        a.team
            .cmp(&b.team)
            .then(a.season.cmp(&b.season))
            .then(a.week.cmp(&b.week))
            .then(a.game_id.cmp(&b.game_id))
    });
}

pub(crate) fn read_season(row: &TableRow<'_>) -> FeatureResult<i32> {
    row.get("season")
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| FeatureError::InvalidValue {
            column: "season".to_string(),
            row: row.index(),
        })
}

pub(crate) fn read_week(row: &TableRow<'_>) -> FeatureResult<u32> {
    row.get("week")
        .as_i64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| FeatureError::InvalidValue {
            column: "week".to_string(),
            row: row.index(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_stats::GameStat;
    use crate::play_table::{Cell, PlayTable};

    fn game_table() -> PlayTable {
        let columns = crate::data_handler::PBP_COLUMNS;
        let row = |posteam: &str, rushing: f64| {
            columns
                .iter()
                .map(|column| match *column {
                    "game_id" => Cell::from("2023_05_SF_KC"),
                    "season" => Cell::Int(2023),
                    "week" => Cell::Float(5.0),
                    "season_type" => Cell::from("REG"),
                    "home_team" => Cell::from("KC"),
                    "away_team" => Cell::from("SF"),
                    "posteam" => Cell::from(posteam),
                    "rushing_yards" => Cell::Float(rushing),
                    _ => Cell::Null,
                })
                .collect::<Vec<_>>()
        };
        PlayTable::from_rows(columns, vec![row("KC", 10.0), row("SF", 4.0)]).unwrap()
    }

    #[test]
    fn one_record_per_side_with_mirrored_allowed_stats() {
        let table = game_table();
        let [home, away] = team_records_for_game(&table.all()).unwrap();
        assert_eq!((home.team.as_str(), home.opponent.as_str()), ("KC", "SF"));
        assert_eq!((home.season, home.week), (2023, 5));
        assert_eq!(home.stats.get(GameStat::RushingYards), 10.0);
        assert_eq!(home.stats.get(GameStat::RushingYardsAllowed), 4.0);
        assert_eq!(away.stats.get(GameStat::RushingYardsAllowed), 10.0);
        assert_eq!(away.side, TeamSide::Away);
    }

    #[test]
    fn records_sort_by_team_then_calendar() {
        let table = game_table();
        let [home, away] = team_records_for_game(&table.all()).unwrap();
        let mut earlier = home.clone();
        earlier.week = 2;
        let mut records = vec![home, away, earlier];
        sort_chronologically(&mut records);
        let keys = records
            .iter()
            .map(|r| (r.team.as_str(), r.week))
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![("KC", 2), ("KC", 5), ("SF", 5)]);
    }
}
