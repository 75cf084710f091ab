use tracing::debug;

use crate::error::{FeatureError, FeatureResult};
use crate::pbp_model::{Game, Play, TeamSide, Touchdown, TouchdownType};
use crate::play_table::{TableRow, TableSlice};

/// Columns a single game's slice must carry to build a `Game`.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "game_id",
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
];

/// Raw scoring indicators of one play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchdownFlags {
    pub pass_touchdown: bool,
    pub rush_touchdown: bool,
    pub return_touchdown: bool,
    pub interception: bool,
    pub fumble_lost: bool,
}

impl TouchdownFlags {
    fn from_row(row: &TableRow<'_>) -> Self {
        Self {
            pass_touchdown: row.get("pass_touchdown").is_truthy(),
            rush_touchdown: row.get("rush_touchdown").is_truthy(),
            return_touchdown: row.get("return_touchdown").is_truthy(),
            interception: row.get("interception").is_truthy(),
            fumble_lost: row.get("fumble_lost").is_truthy(),
        }
    }
}

/// First matching rule wins: pass, rush, return after a turnover, any other return.
pub fn classify_touchdown(flags: TouchdownFlags) -> Option<TouchdownType> {
    if flags.pass_touchdown {
        Some(TouchdownType::Passing)
    } else if flags.rush_touchdown {
        Some(TouchdownType::Rushing)
    } else if flags.return_touchdown && (flags.interception || flags.fumble_lost) {
        Some(TouchdownType::Defense)
    } else if flags.return_touchdown {
        Some(TouchdownType::SpecialTeams)
    } else {
        None
    }
}

/// Builds one `Game` from a slice holding exactly one game's plays.
pub fn game_from_single_game_table(slice: &TableSlice<'_>) -> FeatureResult<Game> {
    let missing = slice.table().missing_columns(REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(FeatureError::MissingColumns {
            context: "a game",
            columns: missing,
        });
    }
    let Some(first) = slice.first() else {
        return Err(FeatureError::EmptyInput);
    };
    let game_ids = slice.distinct_strings("game_id");
    if game_ids.len() > 1 {
        return Err(FeatureError::MultipleGames { game_ids });
    }

    let game_id = required_str(&first, "game_id")?;
    let home_team = required_str(&first, "home_team")?;
    let away_team = required_str(&first, "away_team")?;

    let mut dropped = 0usize;
    let mut plays = Vec::with_capacity(slice.len());
    for row in slice.rows() {
        let flags = TouchdownFlags::from_row(&row);
        let touchdown = classify_touchdown(flags).and_then(|kind| {
            let resolved = resolve_touchdown(&row, kind, home_team, away_team);
            if resolved.is_none() {
                dropped += 1;
            }
            resolved
        });
        plays.push(Play {
            posteam: row.str("posteam").map(str::to_string),
            down: normalize_down(row.get("down").as_f64()),
            third_down_converted: row.get("third_down_converted").is_truthy(),
            third_down_failed: row.get("third_down_failed").is_truthy(),
            fourth_down_converted: row.get("fourth_down_converted").is_truthy(),
            fourth_down_failed: row.get("fourth_down_failed").is_truthy(),
            rushing_yards: row.get("rushing_yards").as_f64(),
            passing_yards: row.get("passing_yards").as_f64(),
            touchdown,
        });
    }
    if dropped > 0 {
        debug!(game_id, dropped, "touchdowns without a resolvable scoring team");
    }

    Game::new(game_id, home_team, away_team, plays)
}

fn required_str<'a>(row: &TableRow<'a>, column: &str) -> FeatureResult<&'a str> {
    row.str(column).ok_or_else(|| FeatureError::InvalidValue {
        column: column.to_string(),
        row: row.index(),
    })
}

// A score whose team code is missing or belongs to neither side is dropped.
fn resolve_touchdown(
    row: &TableRow<'_>,
    kind: TouchdownType,
    home_team: &str,
    away_team: &str,
) -> Option<Touchdown> {
    let td_team = row.str("td_team")?;
    let scoring_side = if td_team == home_team {
        TeamSide::Home
    } else if td_team == away_team {
        TeamSide::Away
    } else {
        return None;
    };
    Some(Touchdown {
        kind,
        scoring_side,
        scoring_player: row.str("td_player_name").map(str::to_string),
    })
}

fn normalize_down(raw: Option<f64>) -> Option<u8> {
    let down = raw?;
    if down.fract() != 0.0 || !(1.0..=4.0).contains(&down) {
        return None;
    }
    Some(down as u8)
}
