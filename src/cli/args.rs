//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Source, range and size shared by `export` and `plan`
#[derive(Args, Debug, Clone)]
pub struct ClipArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Start time (HH:MM:SS.mmm, MM:SS.mmm, or seconds)
    #[arg(short, long, default_value = "0")]
    pub start: String,

    /// End time (HH:MM:SS.mmm, MM:SS.mmm, or seconds); defaults to the end of the source
    #[arg(short, long)]
    pub end: Option<String>,

    /// Target output size in megabytes (MiB)
    #[arg(short = 'm', long = "size-mb", default_value = "10")]
    pub size_mb: f64,

    /// Output file path (default: <output dir>/<name>_trim_<start>-<end>_<MB>MB.mp4)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Encoder settings that override config and environment
#[derive(Args, Debug, Clone, Default)]
pub struct EncodeOverrideArgs {
    /// Directory for generated output names
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// x264 preset for both passes
    #[arg(long)]
    pub preset: Option<String>,

    /// Relative size miss that triggers a warning (0.08 = 8%)
    #[arg(long)]
    pub size_tolerance: Option<f64>,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub clip: ClipArgs,

    #[command(flatten)]
    pub overrides: EncodeOverrideArgs,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub clip: ClipArgs,

    #[command(flatten)]
    pub overrides: EncodeOverrideArgs,

    /// Source duration to assume (time format), instead of probing
    #[arg(long)]
    pub duration: Option<String>,

    /// Source width to assume
    #[arg(long, value_parser = dimension)]
    pub width: Option<u32>,

    /// Source height to assume
    #[arg(long, value_parser = dimension)]
    pub height: Option<u32>,

    /// Source frame rate to assume
    #[arg(long)]
    pub fps: Option<f64>,

    /// Do not run ffprobe; plan from the values above only
    #[arg(long)]
    pub no_probe: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    pub input: PathBuf,
}

fn dimension(s: &str) -> Result<u32, String> {
    clap_num::number_range(s, 1, 16384)
}
