use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::{Args, Parser};

use crate::game_stats::GameStat;
use crate::pbp_fetch::{START_SEASON, current_season};
use crate::pipeline::SeasonType;
use crate::temporal::TemporalConfig;

/// `.env.local` wins over `.env`; both are optional.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Where raw season files live and which seasons to cover.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Data directory; raw files go to <data-dir>/raw
    #[arg(long, env = "PBP_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// First season to include
    #[arg(long, env = "PBP_START_SEASON", default_value_t = START_SEASON)]
    pub start_season: i32,

    /// Last season to include (defaults to the latest season that has started)
    #[arg(long, env = "PBP_END_SEASON")]
    pub end_season: Option<i32>,
}

impl DataArgs {
    pub fn seasons(&self) -> RangeInclusive<i32> {
        self.start_season..=self.end_season.unwrap_or_else(current_season)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let seasons = self.seasons();
        if seasons.is_empty() {
            anyhow::bail!(
                "start season {} is after end season {}",
                seasons.start(),
                seasons.end()
            );
        }
        Ok(())
    }
}

/// Builds pre-game team features from NFL play-by-play data
#[derive(Parser, Debug, Clone)]
#[command(name = "gridiron_features", version, about)]
pub struct Config {
    #[command(flatten)]
    pub data: DataArgs,

    /// Season type to model: REG or POST
    #[arg(long, env = "PBP_SEASON_TYPE", default_value = "REG")]
    pub season_type: SeasonType,

    /// Trailing window sizes, comma separated
    #[arg(long, env = "PBP_WINDOWS", value_delimiter = ',', default_value = "1,3,5")]
    pub windows: Vec<usize>,

    /// Statistics to aggregate, comma separated (defaults to all)
    #[arg(long, env = "PBP_STATS", value_delimiter = ',')]
    pub stats: Vec<GameStat>,

    /// SQLite output path
    #[arg(long = "db", env = "FEATURES_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Spreadsheet output path
    #[arg(long = "xlsx", env = "FEATURES_XLSX_PATH")]
    pub xlsx_path: Option<PathBuf>,

    /// Use local raw files only
    #[arg(long, default_value = "false")]
    pub skip_fetch: bool,

    /// Worker threads for per-game statistics
    #[arg(long, env = "PBP_THREADS")]
    pub threads: Option<usize>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.data.validate()?;
        self.temporal()?;
        if self.threads == Some(0) {
            anyhow::bail!("threads must be at least 1");
        }
        Ok(())
    }

    pub fn temporal(&self) -> anyhow::Result<TemporalConfig> {
        let stats = if self.stats.is_empty() {
            GameStat::ALL.to_vec()
        } else {
            self.stats.clone()
        };
        Ok(TemporalConfig::new(self.windows.clone(), stats)?)
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.processed_dir().join("features.sqlite"))
    }

    pub fn xlsx_path(&self) -> PathBuf {
        self.xlsx_path
            .clone()
            .unwrap_or_else(|| self.processed_dir().join("model_features.xlsx"))
    }

    fn processed_dir(&self) -> PathBuf {
        self.data.data_dir.join("processed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("gridiron_features").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_cover_all_stats() {
        let config = parse(&["--end-season", "2023"]);
        let temporal = config.temporal().unwrap();
        assert_eq!(temporal.windows(), &[1, 3, 5]);
        assert_eq!(temporal.stats().len(), GameStat::COUNT);
        assert_eq!(config.data.seasons(), START_SEASON..=2023);
        assert!(config.db_path().ends_with("processed/features.sqlite"));
    }

    #[test]
    fn comma_lists_parse() {
        let config = parse(&[
            "--windows",
            "2,4",
            "--stats",
            "rushing_yards,passing_yards_allowed",
            "--season-type",
            "post",
        ]);
        assert_eq!(config.windows, vec![2, 4]);
        assert_eq!(
            config.stats,
            vec![GameStat::RushingYards, GameStat::PassingYardsAllowed]
        );
        assert_eq!(config.season_type, SeasonType::Post);
    }

    #[test]
    fn validate_rejects_bad_input() {
        assert!(parse(&["--start-season", "2020", "--end-season", "2019"]).validate().is_err());
        assert!(parse(&["--windows", "0,3"]).validate().is_err());
        assert!(Config::try_parse_from(["gridiron_features", "--stats", "sacks"]).is_err());
    }
}
