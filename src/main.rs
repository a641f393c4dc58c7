//! mcstats
//!
//! Looks up BedWars statistics for every player visible in a Minecraft lobby
//! screenshot: reads usernames via Tesseract OCR, scrapes each player's
//! profile page, and prints a table with a derived K/D column.

mod config;
mod ocr;
mod stats;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::ocr::{Filter, ScreenReader};
use crate::stats::{aggregate, table, StatsClient};

#[derive(Parser, Debug)]
#[command(
    name = "mcstats",
    about = "Check BedWars stats for the players in a lobby screenshot"
)]
struct Args {
    /// Screenshot of the Minecraft lobby player list
    #[arg(short, long)]
    image: PathBuf,

    /// Base URL used to retrieve statistics (the username is appended)
    #[arg(long)]
    url: Option<String>,

    /// Preprocessing applied to the image before OCR: blur, thresh or none
    #[arg(long)]
    filter: Option<String>,

    /// Also write the table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Keep screenshot order instead of sorting by K/D
    #[arg(long)]
    no_sort: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = config::load_config();
    if let Some(url) = args.url {
        config.stats_url = url;
    }
    if let Some(filter) = &args.filter {
        config.filter = filter.parse::<Filter>()?;
    }

    // Fail fast on a bad stats URL before doing any OCR work.
    let client = StatsClient::new(&config.stats_url, &config.section_start, &config.section_end)?;

    let raw = image::open(&args.image)
        .with_context(|| format!("Failed to load screenshot {}", args.image.display()))?;
    let reader = ScreenReader::new(raw, config.filter);
    let users = reader.usernames()?;

    if users.is_empty() {
        println!("No players found in {}", args.image.display());
        return Ok(());
    }
    println!("Users: {:?}", users);

    let outcome = aggregate(&users, &config.columns, |user| client.fetch(user))?;
    for error in &outcome.integrity_errors {
        eprintln!("Warning: {}", error);
    }

    let mut stats_table = outcome.table;
    if !args.no_sort {
        stats_table.sort_by_kd();
    }
    println!("{}", stats_table);

    if let Some(path) = &args.csv {
        table::write_csv(&stats_table, path)?;
        println!("Table written to {}", path.display());
    }

    Ok(())
}
