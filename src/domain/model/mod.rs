// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::utils::time::parse_time;

/// Bytes in one megabyte as the user types it (MiB)
pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Shortest clip the allocator will divide by
pub const MIN_CLIP_SECONDS: f64 = 0.1;

/// Tunable heuristics of the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Audio bitrate floor (kbps)
    pub min_audio_kbps: u32,
    /// Audio bitrate ceiling (kbps)
    pub max_audio_kbps: u32,
    /// Share of the target kept after reserving container overhead
    pub overhead_ratio: f64,
    /// Starting guess for the audio share of the bit budget
    pub audio_budget_share: f64,
    /// Density below which frames are downscaled
    pub min_bits_per_pixel: f64,
    /// Smallest width/height a downscale may produce
    pub min_scaled_dimension: u32,
    /// Audio at or below this bitrate is downmixed to mono
    pub mono_threshold_kbps: u32,
    /// Relative size miss that triggers the deviation warning
    pub size_tolerance: f64,
    /// x264 preset used by both passes
    pub preset: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            min_audio_kbps: 48,
            max_audio_kbps: 160,
            overhead_ratio: 0.98,
            audio_budget_share: 0.10,
            min_bits_per_pixel: 0.06,
            min_scaled_dimension: 160,
            mono_threshold_kbps: 64,
            size_tolerance: 0.08,
            preset: "medium".to_string(),
        }
    }
}

impl PlannerSettings {
    /// Reject settings the allocator and advisor cannot work with
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.min_audio_kbps == 0 || self.min_audio_kbps > self.max_audio_kbps {
            return Err(DomainError::Config(format!(
                "audio bounds must satisfy 0 < min ({}) <= max ({})",
                self.min_audio_kbps, self.max_audio_kbps
            )));
        }
        if !(self.overhead_ratio > 0.0 && self.overhead_ratio <= 1.0) {
            return Err(DomainError::Config(format!(
                "overhead_ratio must be in (0, 1], got {}",
                self.overhead_ratio
            )));
        }
        if !(self.audio_budget_share > 0.0 && self.audio_budget_share < 1.0) {
            return Err(DomainError::Config(format!(
                "audio_budget_share must be in (0, 1), got {}",
                self.audio_budget_share
            )));
        }
        if !(self.min_bits_per_pixel > 0.0 && self.min_bits_per_pixel.is_finite()) {
            return Err(DomainError::Config(format!(
                "min_bits_per_pixel must be positive, got {}",
                self.min_bits_per_pixel
            )));
        }
        if self.min_scaled_dimension < 2 || self.min_scaled_dimension % 2 != 0 {
            return Err(DomainError::Config(format!(
                "min_scaled_dimension must be an even number >= 2, got {}",
                self.min_scaled_dimension
            )));
        }
        if !(self.size_tolerance >= 0.0 && self.size_tolerance.is_finite()) {
            return Err(DomainError::Config(format!(
                "size_tolerance must be non-negative, got {}",
                self.size_tolerance
            )));
        }
        if self.preset.trim().is_empty() {
            return Err(DomainError::Config("preset cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Requested time range inside the source clip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipRange {
    pub start_seconds: f64,
    pub end_seconds: Option<f64>,
}

impl ClipRange {
    /// Create a range, checking start >= 0 and end >= start
    pub fn new(start_seconds: f64, end_seconds: Option<f64>) -> Result<Self, DomainError> {
        if !start_seconds.is_finite() || start_seconds < 0.0 {
            return Err(DomainError::InvalidRange(format!(
                "start must be a non-negative time, got {}",
                start_seconds
            )));
        }
        if let Some(end) = end_seconds {
            if !end.is_finite() {
                return Err(DomainError::InvalidRange(format!("end is not a valid time: {}", end)));
            }
            if end < start_seconds {
                return Err(DomainError::InvalidRange(format!(
                    "end ({:.3}s) must be after start ({:.3}s)",
                    end, start_seconds
                )));
            }
        }
        Ok(Self {
            start_seconds,
            end_seconds,
        })
    }

    /// Parse user-entered start/end fields. Empty start means 0, empty end means "to the end".
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        let start_seconds = parse_time(start)?;
        let end_seconds = if end.trim().is_empty() {
            None
        } else {
            Some(parse_time(end)?)
        };
        Self::new(start_seconds, end_seconds)
    }

    /// Whole clip from the beginning
    pub fn full() -> Self {
        Self {
            start_seconds: 0.0,
            end_seconds: None,
        }
    }

    /// Length of the range, floored at [`MIN_CLIP_SECONDS`]; `None` when the end is open
    pub fn duration_seconds(&self) -> Option<f64> {
        self.end_seconds
            .map(|end| (end - self.start_seconds).max(MIN_CLIP_SECONDS))
    }

    /// Close an open range with the probed source duration
    pub fn resolve_end(self, source_duration: Option<f64>) -> Result<Self, DomainError> {
        if self.end_seconds.is_some() {
            return Ok(self);
        }
        match source_duration {
            Some(duration) => Self::new(self.start_seconds, Some(duration)),
            None => Err(DomainError::InvalidRange(
                "end time not given and the source duration could not be determined".to_string(),
            )),
        }
    }
}

impl fmt::Display for ClipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::utils::time::format_seconds;
        match self.end_seconds {
            Some(end) => write!(f, "{} - {}", format_seconds(self.start_seconds), format_seconds(end)),
            None => write!(f, "{} - end", format_seconds(self.start_seconds)),
        }
    }
}

/// Measured properties of a source file; any field may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaProperties {
    pub duration_seconds: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<f64>,
}

impl MediaProperties {
    /// True when nothing at all could be measured
    pub fn is_empty(&self) -> bool {
        self.duration_seconds.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.frame_rate.is_none()
    }

    /// Fill absent fields from `other`, keeping what is already known
    pub fn or(self, other: MediaProperties) -> Self {
        Self {
            duration_seconds: self.duration_seconds.or(other.duration_seconds),
            width: self.width.or(other.width),
            height: self.height.or(other.height),
            frame_rate: self.frame_rate.or(other.frame_rate),
        }
    }
}

/// Video/audio bitrates chosen for one export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitratePlan {
    pub video_kbps: u32,
    pub audio_kbps: u32,
}

impl BitratePlan {
    pub fn total_kbps(&self) -> u64 {
        self.video_kbps as u64 + self.audio_kbps as u64
    }

    /// Payload size these bitrates produce over `clip_seconds`, without container overhead
    pub fn estimated_bytes(&self, clip_seconds: f64) -> u64 {
        (self.total_kbps() as f64 * 1000.0 * clip_seconds / 8.0).round() as u64
    }
}

/// Downscaled frame size; both dimensions even
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScalePlan {
    pub target_width: u32,
    pub target_height: u32,
}

impl ScalePlan {
    /// ffmpeg video filter expression applying this scale
    pub fn filter(&self) -> String {
        format!("scale={}:{}:flags=lanczos", self.target_width, self.target_height)
    }
}

/// The two transcoder invocations of one export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodePlan {
    /// Analysis pass arguments (program excluded)
    pub pass1_args: Vec<String>,
    /// Encode and mux pass arguments (program excluded)
    pub pass2_args: Vec<String>,
    /// Prefix handed to `-passlogfile`
    pub log_path: PathBuf,
    /// File written by pass 2
    pub destination: PathBuf,
}

impl EncodePlan {
    /// Every statistics file libx264 may leave behind for `log_path`
    pub fn stats_artifacts(&self) -> Vec<PathBuf> {
        stats_artifacts_for(&self.log_path)
    }
}

fn stats_artifacts_for(log_path: &Path) -> Vec<PathBuf> {
    let base = log_path.as_os_str().to_string_lossy().into_owned();
    [
        "",
        ".mbtree",
        ".temp",
        ".mbtree.temp",
        "-0.log",
        "-0.log.mbtree",
        "-0.log.temp",
        "-0.log.mbtree.temp",
    ]
    .iter()
    .map(|suffix| PathBuf::from(format!("{}{}", base, suffix)))
    .collect()
}

/// States of one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    Idle,
    Pass1Running,
    Pass2Running,
    Validating,
    Succeeded,
    Failed,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportPhase::Idle => "idle",
            ExportPhase::Pass1Running => "pass 1",
            ExportPhase::Pass2Running => "pass 2",
            ExportPhase::Validating => "validating",
            ExportPhase::Succeeded => "succeeded",
            ExportPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal result of an export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportOutcome {
    pub succeeded: bool,
    pub phase: ExportPhase,
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    pub target_bytes: u64,
    pub deviation_ratio: f64,
    pub message: String,
    /// Set when the output misses the target by more than the tolerance
    pub warning: Option<String>,
    /// Pass whose failure ended the run
    pub failed_pass: Option<u8>,
    /// Stopped through the abort signal between passes
    pub aborted: bool,
    pub elapsed_seconds: f64,
    pub completed_at: DateTime<Local>,
}

impl ExportOutcome {
    /// Turn a failed outcome into the matching error
    pub fn into_result(self) -> Result<Self, DomainError> {
        if self.succeeded {
            return Ok(self);
        }
        if self.aborted {
            return Err(DomainError::Aborted);
        }
        match self.failed_pass {
            Some(pass) => Err(DomainError::EncodeFailure {
                pass,
                detail: self.message,
            }),
            None => Err(DomainError::ProcessFail(self.message)),
        }
    }

    pub fn has_size_warning(&self) -> bool {
        self.warning.is_some()
    }
}

/// Message carried by an outcome stopped through the abort signal
pub const ABORTED_MESSAGE: &str = "aborted";

#[cfg(test)]
mod tests;
