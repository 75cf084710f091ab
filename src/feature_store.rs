use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::feature_merge::{FeatureRow, FeatureTable};
use crate::pbp_model::TeamSide;

/// Feature row as stored: identifiers plus prefixed feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFeatureRow {
    pub game_id: String,
    pub season: i32,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    pub spread_line: Option<f64>,
    pub total_line: Option<f64>,
    pub result: Option<f64>,
    pub features: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct RunInfo {
    pub season_type: String,
    pub seasons: (i32, i32),
    pub windows: Vec<usize>,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS game_features (
            game_id TEXT PRIMARY KEY,
            season INTEGER NOT NULL,
            week INTEGER NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            spread_line REAL NULL,
            total_line REAL NULL,
            result REAL NULL,
            features_json TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_game_features_season ON game_features(season, week);

        CREATE TABLE IF NOT EXISTS feature_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            season_type TEXT NOT NULL,
            first_season INTEGER NOT NULL,
            last_season INTEGER NOT NULL,
            windows_json TEXT NOT NULL,
            feature_columns INTEGER NOT NULL,
            rows_written INTEGER NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Upserts every row in one transaction and records the run.
pub fn save_feature_table(
    conn: &mut Connection,
    table: &FeatureTable,
    run: &RunInfo,
) -> Result<usize> {
    let started_at = Utc::now().to_rfc3339();
    let windows_json = serde_json::to_string(&run.windows).context("serialize windows")?;
    conn.execute(
        "INSERT INTO feature_runs(started_at, finished_at, season_type, first_season, last_season, windows_json, feature_columns, rows_written)
         VALUES (?1, NULL, ?2, ?3, ?4, ?5, ?6, 0)",
        params![
            started_at,
            run.season_type,
            run.seasons.0,
            run.seasons.1,
            windows_json,
            table.feature_names.len() as i64
        ],
    )
    .context("insert feature run")?;
    let run_id = conn.last_insert_rowid();

    let tx = conn.transaction().context("begin feature transaction")?;
    for row in &table.rows {
        upsert_row(&tx, table, row)?;
    }
    tx.commit().context("commit feature transaction")?;

    conn.execute(
        "UPDATE feature_runs SET finished_at = ?1, rows_written = ?2 WHERE run_id = ?3",
        params![Utc::now().to_rfc3339(), table.rows.len() as i64, run_id],
    )
    .context("update feature run")?;
    Ok(table.rows.len())
}

fn upsert_row(tx: &rusqlite::Transaction<'_>, table: &FeatureTable, row: &FeatureRow) -> Result<()> {
    let mut features = BTreeMap::new();
    for side in TeamSide::BOTH {
        for (name, value) in table.feature_names.iter().zip(row.features(side)) {
            features.insert(format!("{}_{name}", side.label()), *value);
        }
    }
    let features_json = serde_json::to_string(&features).context("serialize features")?;

    tx.execute(
        r#"
        INSERT INTO game_features (
            game_id, season, week, home_team, away_team,
            spread_line, total_line, result, features_json, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(game_id) DO UPDATE SET
            season = excluded.season,
            week = excluded.week,
            home_team = excluded.home_team,
            away_team = excluded.away_team,
            spread_line = excluded.spread_line,
            total_line = excluded.total_line,
            result = excluded.result,
            features_json = excluded.features_json,
            updated_at = excluded.updated_at
        "#,
        params![
            row.game_id,
            row.season,
            row.week,
            row.home_team,
            row.away_team,
            row.spread_line,
            row.total_line,
            row.result,
            features_json,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert feature row")?;
    Ok(())
}

pub fn load_feature_rows(conn: &Connection, season: Option<i32>) -> Result<Vec<StoredFeatureRow>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                game_id, season, week, home_team, away_team,
                spread_line, total_line, result, features_json
            FROM game_features
            WHERE ?1 IS NULL OR season = ?1
            ORDER BY season ASC, week ASC, game_id ASC
            "#,
        )
        .context("prepare load features query")?;

    let rows = stmt
        .query_map(params![season], |row| {
            Ok((
                StoredFeatureRow {
                    game_id: row.get(0)?,
                    season: row.get(1)?,
                    week: row.get(2)?,
                    home_team: row.get(3)?,
                    away_team: row.get(4)?,
                    spread_line: row.get(5)?,
                    total_line: row.get(6)?,
                    result: row.get(7)?,
                    features: BTreeMap::new(),
                },
                row.get::<_, String>(8)?,
            ))
        })
        .context("query load features")?;

    let mut out = Vec::new();
    for row in rows {
        let (mut stored, raw) = row.context("decode feature row")?;
        stored.features = serde_json::from_str(&raw)
            .map_err(|err| anyhow!("invalid features json for {}: {err}", stored.game_id))?;
        out.push(stored);
    }
    Ok(out)
}
