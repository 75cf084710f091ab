use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while turning raw play-by-play rows into features.
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("missing columns to form {context}: {}", columns.join(", "))]
    MissingColumns {
        context: &'static str,
        columns: Vec<String>,
    },

    #[error("input table cannot be empty")]
    EmptyInput,

    #[error("input table contains data for more than one game: {}", game_ids.join(", "))]
    MultipleGames { game_ids: Vec<String> },

    #[error("game {game_id} has no plays")]
    EmptyGame { game_id: String },

    #[error("'{0}' is not a valid play column")]
    UnknownColumn(String),

    #[error("cannot append tables with different columns")]
    SchemaMismatch,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid value in column {column} at row {row}")]
    InvalidValue { column: String, row: usize },

    #[error(
        "raw play-by-play data not found at '{}'; run pbp_ingest first to download it",
        path.display()
    )]
    RawDataMissing { path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type FeatureResult<T> = std::result::Result<T, FeatureError>;
