use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FeatureError, FeatureResult};
use crate::game_stats::GameStat;
use crate::team_games::{TeamGameRecord, sort_chronologically};

pub const DEFAULT_WINDOWS: [usize; 3] = [1, 3, 5];

/// Which stats to average and over which trailing windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalConfig {
    windows: Vec<usize>,
    stats: Vec<GameStat>,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            windows: DEFAULT_WINDOWS.to_vec(),
            stats: GameStat::ALL.to_vec(),
        }
    }
}

impl TemporalConfig {
    /// Duplicates are dropped keeping the first occurrence.
    pub fn new(windows: Vec<usize>, stats: Vec<GameStat>) -> FeatureResult<Self> {
        if windows.contains(&0) {
            return Err(FeatureError::InvalidConfig(
                "rolling window sizes must be at least 1".to_string(),
            ));
        }
        if stats.is_empty() {
            return Err(FeatureError::InvalidConfig(
                "at least one statistic is required".to_string(),
            ));
        }
        Ok(Self {
            windows: dedup(windows),
            stats: dedup(stats),
        })
    }

    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    pub fn stats(&self) -> &[GameStat] {
        &self.stats
    }

    /// Feature column names in output order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.stats.len() * (self.windows.len() + 1));
        for stat in &self.stats {
            names.push(format!("{stat}_season_avg"));
            for w in &self.windows {
                names.push(format!("{stat}_last_{w}"));
            }
        }
        names
    }
}

fn dedup<T: Copy + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(*item)).collect()
}

/// Team features for one game, valid as pre-game predictors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamFeatureRow {
    pub season: i32,
    pub week: u32,
    pub team: String,
    pub game_id: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamFeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<TeamFeatureRow>,
}

impl TeamFeatureTable {
    pub fn value(&self, row: &TeamFeatureRow, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        row.values.get(idx).copied()
    }

    pub fn find(&self, season: i32, week: u32, team: &str) -> Option<&TeamFeatureRow> {
        self.rows
            .iter()
            .find(|r| r.season == season && r.week == week && r.team == team)
    }
}

/// Mean of everything up to and including each position.
pub fn expanding_mean(values: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(idx, v)| {
            sum += v;
            sum / (idx + 1) as f64
        })
        .collect()
}

/// Trailing mean over the last `window` values, using fewer at the start.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|idx| {
            let len = (idx + 1).min(window);
            values[idx + 1 - len..=idx].iter().sum::<f64>() / len as f64
        })
        .collect()
}

/// Moves every value one position later; the first position becomes empty.
pub fn shift_one(values: &[f64]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(values.iter().copied().map(Some))
        .take(values.len())
        .collect()
}

pub fn fill_missing(values: Vec<Option<f64>>, fill: f64) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(fill)).collect()
}

/// Turns per-game team records into leakage-free averages.
///
/// Records may arrive in any order; they are grouped by (team, season) and
/// ordered by week before averaging. Every average is then shifted one game
/// down, so the value attached to a game only sees the team's earlier games
/// of that season. Averages reset at each new season.
pub fn aggregate_team_features(
    records: &[TeamGameRecord],
    config: &TemporalConfig,
) -> TeamFeatureTable {
    let mut ordered = records.to_vec();
    sort_chronologically(&mut ordered);

    let columns = config.feature_names();
    let mut rows = Vec::with_capacity(ordered.len());

    let mut start = 0usize;
    while start < ordered.len() {
        let team = &ordered[start].team;
        let season = ordered[start].season;
        let end = ordered[start..]
            .iter()
            .position(|r| &r.team != team || r.season != season)
            .map_or(ordered.len(), |offset| start + offset);
        let group = &ordered[start..end];

        let mut values = vec![Vec::with_capacity(columns.len()); group.len()];
        for stat in config.stats() {
            let series = group.iter().map(|r| r.stats.get(*stat)).collect::<Vec<_>>();
            push_column(&mut values, fill_missing(shift_one(&expanding_mean(&series)), 0.0));
            for w in config.windows() {
                push_column(
                    &mut values,
                    fill_missing(shift_one(&rolling_mean(&series, *w)), 0.0),
                );
            }
        }

        rows.extend(group.iter().zip(values).map(|(r, values)| TeamFeatureRow {
            season: r.season,
            week: r.week,
            team: r.team.clone(),
            game_id: r.game_id.clone(),
            values,
        }));
        start = end;
    }

    debug!(rows = rows.len(), columns = columns.len(), "aggregated team features");
    TeamFeatureTable { columns, rows }
}

fn push_column(rows: &mut [Vec<f64>], column: Vec<f64>) {
    for (row, value) in rows.iter_mut().zip(column) {
        row.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rolling_uses_fewer_values_at_start() {
        let out = rolling_mean(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_eq!(out, vec![2.0, 3.0, 4.0, 6.0]);
        assert_eq!(rolling_mean(&[1.0, 5.0], 1), vec![1.0, 5.0]);
    }

    #[test]
    fn rolling_matches_direct_window_sum() {
        let values = [1.0 / 3.0, 0.6, 0.25, 0.8, 1.0 / 7.0, 0.9, 0.45, 0.3];
        let out = rolling_mean(&values, 3);
        for idx in 2..values.len() {
            let direct = (values[idx - 2] + values[idx - 1] + values[idx]) / 3.0;
            assert_eq!(out[idx], direct);
        }
    }

    #[test]
    fn expanding_is_running_mean() {
        let out = expanding_mean(&[300.0, 250.0, 400.0]);
        assert_relative_eq!(out[1], 275.0);
        assert_relative_eq!(out[2], 950.0 / 3.0);
    }

    #[test]
    fn shift_then_fill_blanks_first_game() {
        let shifted = shift_one(&[1.0, 2.0, 3.0]);
        assert_eq!(shifted, vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(fill_missing(shifted, 0.0), vec![0.0, 1.0, 2.0]);
        assert!(shift_one(&[]).is_empty());
    }

    #[test]
    fn config_rejects_zero_window_and_dedups() {
        assert!(TemporalConfig::new(vec![0, 3], vec![GameStat::RushingYards]).is_err());
        assert!(TemporalConfig::new(vec![3], Vec::new()).is_err());
        let cfg = TemporalConfig::new(
            vec![3, 1, 3],
            vec![GameStat::RushingYards, GameStat::RushingYards],
        )
        .unwrap();
        assert_eq!(cfg.windows(), &[3, 1]);
        assert_eq!(
            cfg.feature_names(),
            vec![
                "rushing_yards_season_avg",
                "rushing_yards_last_3",
                "rushing_yards_last_1"
            ]
        );
    }
}
