use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::play_table::Cell;

/// Relative side of a game. Not a team identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    pub fn opposite(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

/// One value per side of a game, e.g. rushing yards for home and away.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SideStats<T> {
    pub home: T,
    pub away: T,
}

impl<T> SideStats<T> {
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    /// Swaps home and away; turns a stat achieved into a stat allowed.
    pub fn flipped(self) -> Self {
        Self {
            home: self.away,
            away: self.home,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> SideStats<U> {
        SideStats {
            home: f(self.home),
            away: f(self.away),
        }
    }
}

impl<T> Index<TeamSide> for SideStats<T> {
    type Output = T;

    fn index(&self, side: TeamSide) -> &T {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

impl<T> IndexMut<TeamSide> for SideStats<T> {
    fn index_mut(&mut self, side: TeamSide) -> &mut T {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouchdownType {
    Passing,
    Rushing,
    Defense,
    SpecialTeams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touchdown {
    pub kind: TouchdownType,
    // Relative to the game, not to the possessing team.
    pub scoring_side: TeamSide,
    pub scoring_player: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Play {
    pub posteam: Option<String>,
    pub down: Option<u8>,
    pub third_down_converted: bool,
    pub third_down_failed: bool,
    pub fourth_down_converted: bool,
    pub fourth_down_failed: bool,
    pub rushing_yards: Option<f64>,
    pub passing_yards: Option<f64>,
    pub touchdown: Option<Touchdown>,
}

/// Play fields that can be projected across a whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayColumn {
    Posteam,
    Down,
    ThirdDownConverted,
    ThirdDownFailed,
    FourthDownConverted,
    FourthDownFailed,
    RushingYards,
    PassingYards,
}

impl PlayColumn {
    pub const ALL: [PlayColumn; 8] = [
        PlayColumn::Posteam,
        PlayColumn::Down,
        PlayColumn::ThirdDownConverted,
        PlayColumn::ThirdDownFailed,
        PlayColumn::FourthDownConverted,
        PlayColumn::FourthDownFailed,
        PlayColumn::RushingYards,
        PlayColumn::PassingYards,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlayColumn::Posteam => "posteam",
            PlayColumn::Down => "down",
            PlayColumn::ThirdDownConverted => "third_down_converted",
            PlayColumn::ThirdDownFailed => "third_down_failed",
            PlayColumn::FourthDownConverted => "fourth_down_converted",
            PlayColumn::FourthDownFailed => "fourth_down_failed",
            PlayColumn::RushingYards => "rushing_yards",
            PlayColumn::PassingYards => "passing_yards",
        }
    }

    fn read(self, play: &Play) -> Cell {
        match self {
            PlayColumn::Posteam => Cell::from(play.posteam.clone()),
            PlayColumn::Down => Cell::from(play.down.map(i64::from)),
            PlayColumn::ThirdDownConverted => Cell::Bool(play.third_down_converted),
            PlayColumn::ThirdDownFailed => Cell::Bool(play.third_down_failed),
            PlayColumn::FourthDownConverted => Cell::Bool(play.fourth_down_converted),
            PlayColumn::FourthDownFailed => Cell::Bool(play.fourth_down_failed),
            PlayColumn::RushingYards => Cell::from(play.rushing_yards),
            PlayColumn::PassingYards => Cell::from(play.passing_yards),
        }
    }
}

impl FromStr for PlayColumn {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayColumn::ALL
            .into_iter()
            .find(|col| col.name() == s)
            .ok_or_else(|| FeatureError::UnknownColumn(s.to_string()))
    }
}

impl fmt::Display for PlayColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One contest and its plays in recorded order. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    game_id: String,
    home_team: String,
    away_team: String,
    plays: Vec<Play>,
}

impl Game {
    pub fn new(
        game_id: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        plays: Vec<Play>,
    ) -> FeatureResult<Self> {
        let game_id = game_id.into();
        if plays.is_empty() {
            return Err(FeatureError::EmptyGame { game_id });
        }
        Ok(Self {
            game_id,
            home_team: home_team.into(),
            away_team: away_team.into(),
            plays,
        })
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn home_team(&self) -> &str {
        &self.home_team
    }

    pub fn away_team(&self) -> &str {
        &self.away_team
    }

    pub fn team(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    /// Side currently holding the ball, if the possessing team belongs to this game.
    pub fn side_of(&self, team: Option<&str>) -> Option<TeamSide> {
        let team = team?;
        if team == self.home_team {
            Some(TeamSide::Home)
        } else if team == self.away_team {
            Some(TeamSide::Away)
        } else {
            None
        }
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    /// Positional lookup.
    pub fn play(&self, idx: usize) -> Option<&Play> {
        self.plays.get(idx)
    }

    /// Projection of one field across every play, in play order.
    pub fn column(&self, column: PlayColumn) -> Vec<Cell> {
        self.plays.iter().map(|play| column.read(play)).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Play> {
        self.plays.iter()
    }
}

impl<'a> IntoIterator for &'a Game {
    type Item = &'a Play;
    type IntoIter = std::slice::Iter<'a, Play>;

    fn into_iter(self) -> Self::IntoIter {
        self.plays.iter()
    }
}
