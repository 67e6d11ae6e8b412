//! sizeclip
//!
//! Trim a video and re-encode it so the result lands near a target file size.
//!
//! # Usage
//!
//! ```bash
//! sizeclip export video.mp4 --start 00:01:00 --end 00:02:00 --size-mb 8
//! sizeclip plan video.mp4 --size-mb 8 --no-probe --duration 60 --width 1920 --height 1080 --fps 30
//! sizeclip probe video.mp4 --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use sizeclip::cli::{commands, Cli, Commands};
use sizeclip::config_initialization::initialize_configuration;
use sizeclip::utils::logging::{LogFormat, LoggingConfig};

/// Main entry point for the sizeclip application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format: LogFormat = cli.log_format.parse().map_err(anyhow::Error::msg)?;
    LoggingConfig {
        level: cli.log_level.clone(),
        format,
    }
    .initialize()?;

    info!("Starting sizeclip {}", env!("CARGO_PKG_VERSION"));

    let config = initialize_configuration(&cli)?;
    let json = cli.json;

    match cli.command {
        Commands::Export(args) => commands::export(args, &config, json).await,
        Commands::Plan(args) => commands::plan(args, &config, json).await,
        Commands::Probe(args) => commands::probe(args, &config, json).await,
    }
}
