use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{info, warn};

use gridiron_features::config::{Config, init_tracing, load_env_files};
use gridiron_features::data_handler::load_raw_pbp_data;
use gridiron_features::error::FeatureError;
use gridiron_features::feature_export::export_feature_table;
use gridiron_features::feature_store::{self, RunInfo};
use gridiron_features::pbp_fetch::update_raw_pbp_data;
use gridiron_features::pipeline::create_final_feature_set;

fn main() -> Result<()> {
    load_env_files();
    init_tracing();

    let config = Config::parse();
    config.validate()?;
    let temporal = config.temporal()?;
    let seasons = config.data.seasons();
    let data_dir = &config.data.data_dir;

    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configure worker pool")?;
    }

    if config.skip_fetch {
        info!("skipping remote fetch");
    } else {
        let summary = update_raw_pbp_data(data_dir, seasons.clone())?;
        for item in summary.failed() {
            warn!(season = item.season, "using existing local file after failed download");
        }
    }

    let pbp = load_raw_pbp_data(data_dir, seasons.clone()).map_err(|err| match err {
        FeatureError::RawDataMissing { path } => anyhow!(
            "raw play-by-play file {} is missing; run pbp_ingest first",
            path.display()
        ),
        other => other.into(),
    })?;

    let table = create_final_feature_set(&pbp, config.season_type, &temporal)?;

    let db_path = config.db_path();
    let mut conn = feature_store::open_db(&db_path)?;
    let run = RunInfo {
        season_type: config.season_type.code().to_string(),
        seasons: (*seasons.start(), *seasons.end()),
        windows: temporal.windows().to_vec(),
    };
    let saved = feature_store::save_feature_table(&mut conn, &table, &run)?;

    let xlsx_path = config.xlsx_path();
    let report = export_feature_table(&xlsx_path, &table)?;

    println!("Feature build complete");
    println!("Seasons: {}-{} ({})", seasons.start(), seasons.end(), config.season_type);
    println!("Plays loaded: {}", pbp.len());
    println!("Games: {}", table.rows.len());
    println!("Feature columns per side: {}", table.feature_names.len());
    println!("DB: {} ({saved} rows upserted)", db_path.display());
    println!(
        "XLSX: {} ({} rows x {} columns)",
        xlsx_path.display(),
        report.rows,
        report.columns
    );

    Ok(())
}
