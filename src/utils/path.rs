//! Output naming and platform path conventions

use std::path::{Path, PathBuf};

use crate::domain::errors::DomainError;
use crate::domain::model::ClipRange;

/// Platform discard sink handed to pass 1 as its output
pub fn null_sink() -> &'static str {
    if cfg!(windows) {
        "NUL"
    } else {
        "/dev/null"
    }
}

/// Statistics-log prefix shared by both passes of an export to `destination`.
///
/// Appended to the full file name, so it never equals the destination and
/// `a.mp4`/`a.mkv` keep separate logs.
pub fn stats_log_path(destination: &Path) -> PathBuf {
    let mut log = destination.as_os_str().to_os_string();
    log.push(".passlog");
    PathBuf::from(log)
}

/// File name of an export: `<stem>_trim_<start>-<end|end>_<MB>MB.mp4`.
///
/// The parameters are part of the name so concurrent exports of different
/// ranges or sizes never share a statistics log.
pub fn export_file_name(
    source: &Path,
    range: &ClipRange,
    target_size_mb: f64,
) -> Result<String, DomainError> {
    let stem = source
        .file_stem()
        .ok_or_else(|| DomainError::BadArgs(format!("Invalid source path: {}", source.display())))?
        .to_string_lossy();

    let end = match range.end_seconds {
        Some(end) => (end as u64).to_string(),
        None => "end".to_string(),
    };

    Ok(format!(
        "{}_trim_{}-{}_{}MB.mp4",
        stem, range.start_seconds as u64, end, target_size_mb as u64
    ))
}

/// Directory exports land in when none is configured: Downloads, else home, else cwd
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}
