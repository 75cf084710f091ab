use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::pbp_model::{Game, Play, SideStats, TeamSide, TouchdownType};

/// Folds every play into a per-side total. `play_processor` returns the
/// contribution of one play to (home, away).
pub fn aggregate_game_stats(
    game: &Game,
    play_processor: impl Fn(&Play) -> SideStats<f64>,
) -> SideStats<f64> {
    game.iter().fold(SideStats::default(), |acc, play| {
        let value = play_processor(play);
        SideStats::new(acc.home + value.home, acc.away + value.away)
    })
}

/// Counts plays matching `predicate`, credited to the side `team_identifier` names.
pub fn count_plays_for_team(
    game: &Game,
    predicate: impl Fn(&Play) -> bool,
    team_identifier: impl Fn(&Play) -> Option<TeamSide>,
) -> SideStats<u32> {
    let mut counts = SideStats::<u32>::default();
    for play in game {
        if !predicate(play) {
            continue;
        }
        if let Some(side) = team_identifier(play) {
            counts[side] += 1;
        }
    }
    counts
}

/// Sums a per-play value for the team in possession. Missing values add nothing,
/// as do plays whose possessing team belongs to neither side.
pub fn sum_offense_stat_for_team(
    game: &Game,
    extract: impl Fn(&Play) -> Option<f64>,
) -> SideStats<f64> {
    aggregate_game_stats(game, |play| {
        let value = extract(play).unwrap_or(0.0);
        match game.side_of(play.posteam.as_deref()) {
            Some(TeamSide::Home) => SideStats::new(value, 0.0),
            Some(TeamSide::Away) => SideStats::new(0.0, value),
            None => SideStats::default(),
        }
    })
}

/// Swaps the two sides, turning a stat achieved into a stat allowed.
pub fn flip_perspectives<T>(stats: SideStats<T>) -> SideStats<T> {
    stats.flipped()
}

/// Which down to look at and where its success and failure flags live.
#[derive(Clone, Copy)]
pub struct DownConversion {
    pub down: u8,
    pub converted: fn(&Play) -> bool,
    pub failed: fn(&Play) -> bool,
}

pub const THIRD_DOWN: DownConversion = DownConversion {
    down: 3,
    converted: third_down_converted,
    failed: third_down_failed,
};

pub const FOURTH_DOWN: DownConversion = DownConversion {
    down: 4,
    converted: fourth_down_converted,
    failed: fourth_down_failed,
};

fn third_down_converted(play: &Play) -> bool {
    play.third_down_converted
}

fn third_down_failed(play: &Play) -> bool {
    play.third_down_failed
}

fn fourth_down_converted(play: &Play) -> bool {
    play.fourth_down_converted
}

fn fourth_down_failed(play: &Play) -> bool {
    play.fourth_down_failed
}

/// Successes over attempts per side, attributed by possession. Zero attempts give 0.0.
pub fn down_conversion_rate(game: &Game, spec: DownConversion) -> SideStats<f64> {
    let mut successes = SideStats::<u32>::default();
    let mut failures = SideStats::<u32>::default();
    for play in game {
        if play.down != Some(spec.down) {
            continue;
        }
        let Some(side) = game.side_of(play.posteam.as_deref()) else {
            continue;
        };
        successes[side] += u32::from((spec.converted)(play));
        failures[side] += u32::from((spec.failed)(play));
    }
    let rate = |side: TeamSide| {
        let attempts = successes[side] + failures[side];
        if attempts == 0 {
            0.0
        } else {
            f64::from(successes[side]) / f64::from(attempts)
        }
    };
    SideStats::new(rate(TeamSide::Home), rate(TeamSide::Away))
}

/// Touchdowns of one kind, credited to the recorded scoring side.
pub fn touchdowns(game: &Game, kind: TouchdownType) -> SideStats<u32> {
    count_plays_for_team(
        game,
        |play| play.touchdown.as_ref().is_some_and(|td| td.kind == kind),
        |play| play.touchdown.as_ref().map(|td| td.scoring_side),
    )
}

pub fn passing_touchdowns(game: &Game) -> SideStats<u32> {
    touchdowns(game, TouchdownType::Passing)
}

pub fn rushing_touchdowns(game: &Game) -> SideStats<u32> {
    touchdowns(game, TouchdownType::Rushing)
}

pub fn defense_touchdowns(game: &Game) -> SideStats<u32> {
    touchdowns(game, TouchdownType::Defense)
}

pub fn special_teams_touchdowns(game: &Game) -> SideStats<u32> {
    touchdowns(game, TouchdownType::SpecialTeams)
}

pub fn passing_touchdowns_allowed(game: &Game) -> SideStats<u32> {
    flip_perspectives(passing_touchdowns(game))
}

pub fn rushing_touchdowns_allowed(game: &Game) -> SideStats<u32> {
    flip_perspectives(rushing_touchdowns(game))
}

pub fn defense_touchdowns_allowed(game: &Game) -> SideStats<u32> {
    flip_perspectives(defense_touchdowns(game))
}

pub fn special_teams_touchdowns_allowed(game: &Game) -> SideStats<u32> {
    flip_perspectives(special_teams_touchdowns(game))
}

pub fn rushing_yards(game: &Game) -> SideStats<f64> {
    sum_offense_stat_for_team(game, |play| play.rushing_yards)
}

pub fn passing_yards(game: &Game) -> SideStats<f64> {
    sum_offense_stat_for_team(game, |play| play.passing_yards)
}

pub fn rushing_yards_allowed(game: &Game) -> SideStats<f64> {
    flip_perspectives(rushing_yards(game))
}

pub fn passing_yards_allowed(game: &Game) -> SideStats<f64> {
    flip_perspectives(passing_yards(game))
}

pub fn third_down_conversion_rate(game: &Game) -> SideStats<f64> {
    down_conversion_rate(game, THIRD_DOWN)
}

pub fn fourth_down_conversion_rate(game: &Game) -> SideStats<f64> {
    down_conversion_rate(game, FOURTH_DOWN)
}

pub fn third_down_conversion_rate_allowed(game: &Game) -> SideStats<f64> {
    flip_perspectives(third_down_conversion_rate(game))
}

pub fn fourth_down_conversion_rate_allowed(game: &Game) -> SideStats<f64> {
    flip_perspectives(fourth_down_conversion_rate(game))
}

/// Per-game team statistics, offense first then the allowed counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStat {
    PassingTds,
    RushingTds,
    DefenseTds,
    SpecialTeamsTds,
    RushingYards,
    PassingYards,
    ThirdDownConvRate,
    FourthDownConvRate,
    PassingTdsAllowed,
    RushingTdsAllowed,
    DefenseTdsAllowed,
    SpecialTeamsTdsAllowed,
    RushingYardsAllowed,
    PassingYardsAllowed,
    ThirdDownConvRateAllowed,
    FourthDownConvRateAllowed,
}

impl GameStat {
    pub const COUNT: usize = 16;

    pub const ALL: [GameStat; GameStat::COUNT] = [
        GameStat::PassingTds,
        GameStat::RushingTds,
        GameStat::DefenseTds,
        GameStat::SpecialTeamsTds,
        GameStat::RushingYards,
        GameStat::PassingYards,
        GameStat::ThirdDownConvRate,
        GameStat::FourthDownConvRate,
        GameStat::PassingTdsAllowed,
        GameStat::RushingTdsAllowed,
        GameStat::DefenseTdsAllowed,
        GameStat::SpecialTeamsTdsAllowed,
        GameStat::RushingYardsAllowed,
        GameStat::PassingYardsAllowed,
        GameStat::ThirdDownConvRateAllowed,
        GameStat::FourthDownConvRateAllowed,
    ];

    pub const OFFENSE: [GameStat; 8] = [
        GameStat::PassingTds,
        GameStat::RushingTds,
        GameStat::DefenseTds,
        GameStat::SpecialTeamsTds,
        GameStat::RushingYards,
        GameStat::PassingYards,
        GameStat::ThirdDownConvRate,
        GameStat::FourthDownConvRate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GameStat::PassingTds => "passing_tds",
            GameStat::RushingTds => "rushing_tds",
            GameStat::DefenseTds => "defense_tds",
            GameStat::SpecialTeamsTds => "special_teams_tds",
            GameStat::RushingYards => "rushing_yards",
            GameStat::PassingYards => "passing_yards",
            GameStat::ThirdDownConvRate => "third_down_conv_rate",
            GameStat::FourthDownConvRate => "fourth_down_conv_rate",
            GameStat::PassingTdsAllowed => "passing_tds_allowed",
            GameStat::RushingTdsAllowed => "rushing_tds_allowed",
            GameStat::DefenseTdsAllowed => "defense_tds_allowed",
            GameStat::SpecialTeamsTdsAllowed => "special_teams_tds_allowed",
            GameStat::RushingYardsAllowed => "rushing_yards_allowed",
            GameStat::PassingYardsAllowed => "passing_yards_allowed",
            GameStat::ThirdDownConvRateAllowed => "third_down_conv_rate_allowed",
            GameStat::FourthDownConvRateAllowed => "fourth_down_conv_rate_allowed",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// The offensive stat this one mirrors, if it is an allowed stat.
    pub fn offense_counterpart(self) -> Option<GameStat> {
        let idx = self.index();
        (idx >= GameStat::OFFENSE.len()).then(|| GameStat::OFFENSE[idx - GameStat::OFFENSE.len()])
    }
}

impl FromStr for GameStat {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        GameStat::ALL
            .into_iter()
            .find(|stat| stat.name() == s)
            .ok_or_else(|| FeatureError::InvalidConfig(format!("unknown statistic '{s}'")))
    }
}

impl fmt::Display for GameStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every `GameStat` value for one team in one game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatLine([f64; GameStat::COUNT]);

impl Default for StatLine {
    fn default() -> Self {
        Self([0.0; GameStat::COUNT])
    }
}

impl StatLine {
    pub fn get(&self, stat: GameStat) -> f64 {
        self.0[stat.index()]
    }

    pub fn set(&mut self, stat: GameStat, value: f64) {
        self.0[stat.index()] = value;
    }
}

/// Offensive stats for both sides of a game, keyed by stat.
pub fn all_stats_for_game(game: &Game) -> Vec<(GameStat, SideStats<f64>)> {
    let as_f64 = |s: SideStats<u32>| s.map(f64::from);
    vec![
        (GameStat::PassingTds, as_f64(passing_touchdowns(game))),
        (GameStat::RushingTds, as_f64(rushing_touchdowns(game))),
        (GameStat::DefenseTds, as_f64(defense_touchdowns(game))),
        (GameStat::SpecialTeamsTds, as_f64(special_teams_touchdowns(game))),
        (GameStat::RushingYards, rushing_yards(game)),
        (GameStat::PassingYards, passing_yards(game)),
        (GameStat::ThirdDownConvRate, third_down_conversion_rate(game)),
        (GameStat::FourthDownConvRate, fourth_down_conversion_rate(game)),
    ]
}

/// Full stat lines for home and away, allowed stats derived by flipping the offense.
pub fn stat_lines_for_game(game: &Game) -> SideStats<StatLine> {
    let mut lines = SideStats::<StatLine>::default();
    for (stat, offense) in all_stats_for_game(game) {
        for side in TeamSide::BOTH {
            lines[side].set(stat, offense[side]);
        }
    }
    for allowed_stat in GameStat::ALL {
        let Some(stat) = allowed_stat.offense_counterpart() else {
            continue;
        };
        let allowed = flip_perspectives(SideStats::new(lines.home.get(stat), lines.away.get(stat)));
        for side in TeamSide::BOTH {
            lines[side].set(allowed_stat, allowed[side]);
        }
    }
    lines
}
