//! Two-pass argument assembly

use std::path::Path;

use tracing::debug;

use crate::domain::model::*;
use crate::planner::{AUDIO_CODEC, PIXEL_FORMAT, VIDEO_CODEC};
use crate::utils::path::{null_sink, stats_log_path};

/// Builds the pass-1/pass-2 transcoder arguments of an export
#[derive(Debug, Clone)]
pub struct EncodePlanBuilder {
    /// x264 preset shared by both passes
    preset: String,
    /// Audio at or below this bitrate is downmixed to mono
    mono_threshold_kbps: u32,
    /// Output target of the analysis pass
    null_sink: String,
}

impl Default for EncodePlanBuilder {
    fn default() -> Self {
        Self::from_settings(&PlannerSettings::default())
    }
}

impl EncodePlanBuilder {
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self {
            preset: settings.preset.clone(),
            mono_threshold_kbps: settings.mono_threshold_kbps,
            null_sink: null_sink().to_string(),
        }
    }

    /// Set the encoding preset (ultrafast, fast, medium, slow, veryslow)
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    /// Send pass-1 output somewhere other than the platform null device
    pub fn with_null_sink(mut self, sink: impl Into<String>) -> Self {
        self.null_sink = sink.into();
        self
    }

    /// Assemble both passes. Pure: nothing is spawned or written.
    pub fn build(
        &self,
        source: &Path,
        destination: &Path,
        range: &ClipRange,
        bitrates: &BitratePlan,
        scale: Option<&ScalePlan>,
    ) -> EncodePlan {
        let log_path = stats_log_path(destination);
        let log_arg = log_path.to_string_lossy().into_owned();
        let video_bitrate = format!("{}k", bitrates.video_kbps);
        let mono = bitrates.audio_kbps <= self.mono_threshold_kbps;

        // Identical prefix in both passes so pass-1 statistics stay valid for pass 2
        let mut common = vec!["-y".to_string()];
        common.extend(range_args(range));
        common.push("-i".to_string());
        common.push(source.to_string_lossy().into_owned());
        if let Some(scale) = scale {
            common.push("-vf".to_string());
            common.push(scale.filter());
        }
        common.extend(
            [
                "-c:v",
                VIDEO_CODEC,
                "-b:v",
                video_bitrate.as_str(),
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        let mut pass1_args = common.clone();
        pass1_args.extend(
            ["-pass", "1", "-preset", self.preset.as_str(), "-pix_fmt", PIXEL_FORMAT, "-an"]
                .iter()
                .map(|s| s.to_string()),
        );
        if mono {
            pass1_args.extend(["-ac".to_string(), "1".to_string()]);
        }
        pass1_args.extend(
            ["-f", "mp4", "-passlogfile", log_arg.as_str(), self.null_sink.as_str()]
                .iter()
                .map(|s| s.to_string()),
        );

        let audio_bitrate = format!("{}k", bitrates.audio_kbps);
        let mut pass2_args = common;
        pass2_args.extend(
            [
                "-pass",
                "2",
                "-preset",
                self.preset.as_str(),
                "-pix_fmt",
                PIXEL_FORMAT,
                "-c:a",
                AUDIO_CODEC,
                "-b:a",
                audio_bitrate.as_str(),
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        if mono {
            pass2_args.extend(["-ac".to_string(), "1".to_string()]);
        }
        pass2_args.extend(
            ["-movflags", "+faststart", "-passlogfile", log_arg.as_str()]
                .iter()
                .map(|s| s.to_string()),
        );
        pass2_args.push(destination.to_string_lossy().into_owned());

        debug!(
            video_kbps = bitrates.video_kbps,
            audio_kbps = bitrates.audio_kbps,
            mono,
            scale = ?scale,
            "built two-pass plan"
        );

        EncodePlan {
            pass1_args,
            pass2_args,
            log_path,
            destination: destination.to_path_buf(),
        }
    }
}

/// `-ss` only for a non-zero start, `-t` only for a closed range
fn range_args(range: &ClipRange) -> Vec<String> {
    let mut args = Vec::new();
    if range.start_seconds > 0.0 {
        args.push("-ss".to_string());
        args.push(format!("{:.3}", range.start_seconds));
    }
    if let Some(duration) = range.duration_seconds() {
        args.push("-t".to_string());
        args.push(format!("{:.3}", duration));
    }
    args
}
