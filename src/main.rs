use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use wrap_snake::game::GameConfig;
use wrap_snake::modes::HumanMode;

#[derive(Parser)]
#[command(name = "wrap_snake")]
#[command(version, about = "Snake on a board whose edges wrap around")]
struct Cli {
    /// JSON file with a game configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Seed for food and snake placement
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(width) = cli.width {
        config.grid_width = width;
    }
    if let Some(height) = cli.height {
        config.grid_height = height;
    }
    config.validate().context("Invalid board size")?;

    info!(
        "starting {}x{} game",
        config.grid_width, config.grid_height
    );

    let mut human_mode = HumanMode::new(config, cli.seed)?;
    human_mode.run().await?;

    Ok(())
}
