//! Runs one hazard map session in the terminal.
//!
//! The map state is printed as JSON. Commands are read from stdin, one per line.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hazardmap::feed::WebFeedLoader;
use hazardmap::MapConfig;

mod session;

use session::MapSession;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Preset {
    /// Earthquakes, weather alerts and radar over the continental US.
    #[default]
    Combined,
    /// Worldwide earthquakes only.
    Earthquake,
}

impl Preset {
    fn config(self) -> MapConfig {
        match self {
            Preset::Combined => MapConfig::combined(),
            Preset::Earthquake => MapConfig::earthquake_only(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Live earthquake, weather alert and radar map")]
struct Cli {
    /// JSON config file. Takes precedence over --preset.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in configuration to use without a config file.
    #[arg(short, long, value_enum, default_value_t)]
    preset: Preset,

    /// Wait for the initial load, print the map and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MapConfig::from_json_file(path)?,
        None => cli.preset.config(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let loader = WebFeedLoader::from_config(&config)?;
    let session = MapSession::new(config, loader)?;

    if cli.once {
        session.load_once().await?;
        return Ok(());
    }

    session.run().await
}
