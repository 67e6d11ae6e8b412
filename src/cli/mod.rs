//! CLI module for sizeclip
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{ClipArgs, EncodeOverrideArgs, ExportArgs, PlanArgs, ProbeArgs};

/// sizeclip - trim a video and re-encode it to a target file size
///
/// Computes video/audio bitrates for the requested size, downscales when the
/// bitrate is too thin for the source resolution, and drives a two-pass
/// libx264 encode through ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "sizeclip")]
#[command(about = "Trim a video and re-encode it to hit a target file size")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format: pretty or json
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: String,

    /// Configuration file (default: <config dir>/sizeclip/config.toml, then ./sizeclip.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the ffmpeg executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trim and encode a clip to the target size
    Export(ExportArgs),
    /// Show the bitrates, scaling and ffmpeg passes an export would use
    Plan(PlanArgs),
    /// Print the duration, resolution and frame rate of a file
    Probe(ProbeArgs),
}

impl Commands {
    /// Encoder settings given on the command line, if the command takes any
    pub fn encode_overrides(&self) -> Option<&EncodeOverrideArgs> {
        match self {
            Commands::Export(args) => Some(&args.overrides),
            Commands::Plan(args) => Some(&args.overrides),
            Commands::Probe(_) => None,
        }
    }
}
