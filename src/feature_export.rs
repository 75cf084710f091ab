use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::feature_merge::{FeatureRow, FeatureTable};

const SHEET_NAME: &str = "features";

pub struct ExportReport {
    pub rows: usize,
    pub columns: usize,
}

/// Writes the feature table as one flat sheet: a header row then one row per game.
/// Missing values are left as empty cells.
pub fn export_feature_table(path: &Path, table: &FeatureTable) -> Result<ExportReport> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }

    let header = table.header();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .context("name feature sheet")?;
    write_header(worksheet, &header)?;
    for (idx, row) in table.rows.iter().enumerate() {
        write_row(worksheet, idx as u32 + 1, row)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    Ok(ExportReport {
        rows: table.rows.len(),
        columns: header.len(),
    })
}

fn write_header(worksheet: &mut Worksheet, header: &[String]) -> Result<()> {
    for (col_idx, name) in header.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, name)
            .with_context(|| format!("write header cell {col_idx}"))?;
    }
    Ok(())
}

fn write_row(worksheet: &mut Worksheet, row_idx: u32, row: &FeatureRow) -> Result<()> {
    write_text(worksheet, row_idx, 0, &row.game_id)?;
    write_number(worksheet, row_idx, 1, Some(f64::from(row.season)))?;
    write_number(worksheet, row_idx, 2, Some(f64::from(row.week)))?;
    write_text(worksheet, row_idx, 3, &row.home_team)?;
    write_text(worksheet, row_idx, 4, &row.away_team)?;

    let numbers = [row.spread_line, row.total_line, row.result]
        .into_iter()
        .chain(row.home.iter().copied())
        .chain(row.away.iter().copied());
    for (offset, value) in numbers.enumerate() {
        write_number(worksheet, row_idx, 5 + offset as u16, value)?;
    }
    Ok(())
}

fn write_text(worksheet: &mut Worksheet, row: u32, col: u16, value: &str) -> Result<()> {
    worksheet
        .write_string(row, col, value)
        .with_context(|| format!("write cell ({row},{col})"))?;
    Ok(())
}

fn write_number(worksheet: &mut Worksheet, row: u32, col: u16, value: Option<f64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    worksheet
        .write_number(row, col, value)
        .with_context(|| format!("write cell ({row},{col})"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_writes_header_plus_one_row_per_game() {
        let table = FeatureTable {
            feature_names: vec!["passing_yards_last_3".to_string()],
            rows: vec![FeatureRow {
                game_id: "2023_02_KC_SF".to_string(),
                season: 2023,
                week: 2,
                home_team: "SF".to_string(),
                away_team: "KC".to_string(),
                spread_line: None,
                total_line: Some(48.0),
                result: Some(-4.0),
                home: vec![Some(241.0)],
                away: vec![None],
            }],
        };
        let path = std::env::temp_dir()
            .join("gridiron_features_export")
            .join("features.xlsx");
        let report = export_feature_table(&path, &table).unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(report.columns, 10);
        assert!(path.exists());
    }
}
