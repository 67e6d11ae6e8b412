//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe -of json` through the process port and reads the container
//! duration and the first video stream's geometry and frame rate. Every failure
//! (spawn error, non-zero exit, malformed JSON, odd values) degrades to an
//! absent field.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::ports::*;

#[derive(Debug, Default, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
}

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    ffprobe: PathBuf,
    process: Arc<dyn ProcessPort>,
}

impl FfprobeAdapter {
    pub fn new(ffprobe: impl Into<PathBuf>, process: Arc<dyn ProcessPort>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            process,
        }
    }

    fn probe_args(entries: &str, file_path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            entries.to_string(),
            "-of".to_string(),
            "json".to_string(),
            file_path.to_string_lossy().into_owned(),
        ]
    }

    /// Run ffprobe and return its stdout, or `None` on any failure
    async fn query(&self, entries: &str, file_path: &Path) -> Option<String> {
        let args = Self::probe_args(entries, file_path);
        match self.process.run(&self.ffprobe, &args).await {
            Ok(output) if output.success() => Some(output.stdout),
            Ok(output) => {
                info!(
                    "ffprobe exited with {} for {}: {}",
                    output.exit_code,
                    file_path.display(),
                    output.stderr_tail(1)
                );
                None
            }
            Err(e) => {
                info!("ffprobe could not run for {}: {}", file_path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe_duration(&self, file_path: &Path) -> Option<f64> {
        let stdout = self.query("format=duration", file_path).await?;
        let duration = parse_duration(&stdout);
        if duration.is_none() {
            info!("No usable duration reported for {}", file_path.display());
        }
        duration
    }

    async fn probe_video_stream(
        &self,
        file_path: &Path,
    ) -> (Option<u32>, Option<u32>, Option<f64>) {
        match self
            .query("stream=width,height,avg_frame_rate", file_path)
            .await
        {
            Some(stdout) => {
                let measured = parse_video_stream(&stdout);
                debug!(?measured, "probed video stream of {}", file_path.display());
                measured
            }
            None => (None, None, None),
        }
    }
}

/// Positive `format.duration` from an ffprobe JSON document
pub fn parse_duration(json: &str) -> Option<f64> {
    let document: ProbeDocument = serde_json::from_str(json).ok()?;
    let duration: f64 = document.format?.duration?.trim().parse().ok()?;
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

/// Width, height and frame rate of `streams[0]`; zero or unparseable values are absent
pub fn parse_video_stream(json: &str) -> (Option<u32>, Option<u32>, Option<f64>) {
    let document: ProbeDocument = match serde_json::from_str(json) {
        Ok(document) => document,
        Err(_) => return (None, None, None),
    };
    let stream = match document.streams.into_iter().next() {
        Some(stream) => stream,
        None => return (None, None, None),
    };
    let width = stream.width.filter(|&w| w > 0);
    let height = stream.height.filter(|&h| h > 0);
    let frame_rate = stream.avg_frame_rate.as_deref().and_then(parse_frame_rate);
    (width, height, frame_rate)
}

/// Rational "num/den" frame rate; a zero denominator or a non-positive result is absent
pub fn parse_frame_rate(rational: &str) -> Option<f64> {
    let (num, den) = rational.trim().split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    let fps = num / den;
    (fps.is_finite() && fps > 0.0).then_some(fps)
}
