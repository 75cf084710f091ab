use anyhow::Result;
use clap::Parser;

use gridiron_features::config::{DataArgs, init_tracing, load_env_files};
use gridiron_features::pbp_fetch::{FetchStatus, update_raw_pbp_data};

/// Downloads or refreshes raw play-by-play season files
#[derive(Parser, Debug)]
#[command(name = "pbp_ingest", version, about)]
struct IngestConfig {
    #[command(flatten)]
    data: DataArgs,
}

fn main() -> Result<()> {
    load_env_files();
    init_tracing();

    let config = IngestConfig::parse();
    config.data.validate()?;

    let summary = update_raw_pbp_data(&config.data.data_dir, config.data.seasons())?;

    println!("Play-by-play ingest complete");
    println!("Data dir: {}", summary.data_dir.display());
    println!(
        "Seasons downloaded: {}/{}",
        summary.downloaded(),
        summary.seasons.len()
    );
    for item in &summary.seasons {
        match &item.status {
            FetchStatus::Downloaded { bytes } => {
                println!("season {}: downloaded {} bytes", item.season, bytes)
            }
            FetchStatus::UpToDate => println!("season {}: up to date", item.season),
            FetchStatus::Failed(err) => println!("season {}: failed - {err}", item.season),
        }
    }

    let failed = summary.failed();
    if !failed.is_empty() {
        anyhow::bail!("{} season(s) failed to download", failed.len());
    }
    Ok(())
}
