//! Clearday CLI - rank upcoming days for outdoor sports from saved forecast payloads.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use clearday_core::{App, Config};

#[derive(Parser)]
#[command(
    name = "clearday",
    version,
    about = "Find the best upcoming day for outdoor sports"
)]
struct Cli {
    /// AQICN feed response (JSON)
    #[arg(long)]
    air_quality: PathBuf,

    /// Open-Meteo daily forecast response (JSON)
    #[arg(long)]
    weather: PathBuf,

    /// City name to report instead of the station name
    #[arg(long)]
    city: Option<String>,

    /// Reference date, defaults to the local date
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Config file, defaults to the user config directory
    #[arg(long)]
    config: Option<PathBuf>,
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    clearday_core::init_with_level(&config.logging.level)?;

    let app = App::with_config(config)?;

    let air_quality =
        clearday_forecast::parse_aqicn_feed(&read_json(&cli.air_quality)?, cli.city.as_deref())?;
    let weather = clearday_forecast::parse_open_meteo_daily(&read_json(&cli.weather)?)?;
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    let ranked = app.recommend(&air_quality, &weather, today)?;
    if ranked.is_empty() {
        tracing::info!("No usable forecast for {} from {}", air_quality.city, today);
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&ranked).context("Failed to serialize ranking")?
    );

    Ok(())
}
