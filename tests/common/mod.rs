#![allow(dead_code)]

use gridiron_features::data_handler::PBP_COLUMNS;
use gridiron_features::play_table::{Cell, PlayTable};

/// Game-level values repeated on every play row.
#[derive(Debug, Clone)]
pub struct GameFixture {
    pub game_id: String,
    pub season: i64,
    pub week: i64,
    pub season_type: &'static str,
    pub home: &'static str,
    pub away: &'static str,
    pub result: Option<f64>,
}

impl GameFixture {
    pub fn new(season: i64, week: i64, home: &'static str, away: &'static str) -> Self {
        Self {
            game_id: format!("{season}_{week:02}_{away}_{home}"),
            season,
            week,
            season_type: "REG",
            home,
            away,
            result: Some(3.0),
        }
    }

    pub fn post(mut self) -> Self {
        self.season_type = "POST";
        self
    }

    pub fn unplayed(mut self) -> Self {
        self.result = None;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayFixture {
    pub posteam: Option<&'static str>,
    pub down: Option<f64>,
    pub third_down_converted: bool,
    pub third_down_failed: bool,
    pub fourth_down_converted: bool,
    pub fourth_down_failed: bool,
    pub rushing_yards: Option<f64>,
    pub passing_yards: Option<f64>,
    pub pass_touchdown: bool,
    pub rush_touchdown: bool,
    pub return_touchdown: bool,
    pub interception: bool,
    pub fumble_lost: bool,
    pub td_team: Option<&'static str>,
    pub td_player_name: Option<&'static str>,
}

impl PlayFixture {
    pub fn rush(team: &'static str, yards: f64) -> Self {
        Self {
            posteam: Some(team),
            rushing_yards: Some(yards),
            ..Self::default()
        }
    }

    pub fn pass(team: &'static str, yards: f64) -> Self {
        Self {
            posteam: Some(team),
            passing_yards: Some(yards),
            ..Self::default()
        }
    }

    pub fn third_down(team: &'static str, converted: bool) -> Self {
        Self {
            posteam: Some(team),
            down: Some(3.0),
            third_down_converted: converted,
            third_down_failed: !converted,
            ..Self::default()
        }
    }

    pub fn pass_td(team: &'static str, scorer: &'static str) -> Self {
        Self {
            posteam: Some(team),
            pass_touchdown: true,
            td_team: Some(scorer),
            ..Self::default()
        }
    }
}

fn flag(value: bool) -> Cell {
    Cell::Float(if value { 1.0 } else { 0.0 })
}

fn cell(game: &GameFixture, play: &PlayFixture, column: &str) -> Cell {
    match column {
        "game_id" => Cell::from(game.game_id.as_str()),
        "season" => Cell::Int(game.season),
        "week" => Cell::Int(game.week),
        "season_type" => Cell::from(game.season_type),
        "home_team" => Cell::from(game.home),
        "away_team" => Cell::from(game.away),
        "posteam" => Cell::from(play.posteam),
        "down" => Cell::from(play.down),
        "third_down_converted" => flag(play.third_down_converted),
        "third_down_failed" => flag(play.third_down_failed),
        "fourth_down_converted" => flag(play.fourth_down_converted),
        "fourth_down_failed" => flag(play.fourth_down_failed),
        "rushing_yards" => Cell::from(play.rushing_yards),
        "passing_yards" => Cell::from(play.passing_yards),
        "pass_touchdown" => flag(play.pass_touchdown),
        "rush_touchdown" => flag(play.rush_touchdown),
        "return_touchdown" => flag(play.return_touchdown),
        "interception" => flag(play.interception),
        "fumble_lost" => flag(play.fumble_lost),
        "td_team" => Cell::from(play.td_team),
        "td_player_name" => Cell::from(play.td_player_name),
        "result" => Cell::from(game.result),
        "spread_line" => Cell::Float(-2.5),
        "total_line" => Cell::Float(44.5),
        _ => Cell::Null,
    }
}

/// Play table with the raw file schema.
pub fn pbp_table(games: &[(GameFixture, Vec<PlayFixture>)]) -> PlayTable {
    let rows = games
        .iter()
        .flat_map(|(game, plays)| {
            plays.iter().map(move |play| {
                PBP_COLUMNS
                    .iter()
                    .map(|column| cell(game, play, column))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    PlayTable::from_rows(PBP_COLUMNS, rows).expect("rows match the schema")
}
