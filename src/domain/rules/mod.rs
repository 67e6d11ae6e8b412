// Domain rules - Bitrate allocation and downscale policy

use crate::domain::errors::*;
use crate::domain::model::*;

/// Bits in one megabyte of target size
const BITS_PER_MEGABYTE: f64 = BYTES_PER_MEGABYTE * 8.0;

/// Video never gets less than this many bits in total, even if audio eats the budget
const MIN_VIDEO_BITS: f64 = 1_000_000.0;

/// Video bitrate floor (kbps)
const MIN_VIDEO_KBPS: u32 = 100;

/// Video bitrate ceiling (kbps); tiny clips with huge targets stop here
pub const MAX_VIDEO_KBPS: u32 = 1_000_000;

/// Splits a target file size into video and audio bitrates.
///
/// Closed-form and deterministic: the audio share starts at a fixed fraction of the
/// budget, is clamped to the configured bitrate bounds, and video takes the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct BitrateAllocator {
    pub min_audio_kbps: u32,
    pub max_audio_kbps: u32,
    pub overhead_ratio: f64,
    pub audio_budget_share: f64,
}

impl Default for BitrateAllocator {
    fn default() -> Self {
        Self::from_settings(&PlannerSettings::default())
    }
}

impl BitrateAllocator {
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self {
            min_audio_kbps: settings.min_audio_kbps,
            max_audio_kbps: settings.max_audio_kbps,
            overhead_ratio: settings.overhead_ratio,
            audio_budget_share: settings.audio_budget_share,
        }
    }

    /// Compute the bitrate plan for a clip of `clip_seconds` that should weigh `target_size_mb`
    pub fn allocate(&self, clip_seconds: f64, target_size_mb: f64) -> Result<BitratePlan, DomainError> {
        if !(clip_seconds > 0.0 && clip_seconds.is_finite()) {
            return Err(DomainError::InvalidRange(format!(
                "clip length must be positive, got {}",
                clip_seconds
            )));
        }
        if !(target_size_mb > 0.0 && target_size_mb.is_finite()) {
            return Err(DomainError::InvalidTargetSize(target_size_mb));
        }
        if self.min_audio_kbps == 0 || self.min_audio_kbps > self.max_audio_kbps {
            return Err(DomainError::BadArgs(format!(
                "audio bounds must satisfy 0 < min ({}) <= max ({})",
                self.min_audio_kbps, self.max_audio_kbps
            )));
        }

        let target_bits = target_size_mb * BITS_PER_MEGABYTE * self.overhead_ratio;

        let audio_floor_bits = self.min_audio_kbps as f64 * 1000.0 * clip_seconds;
        let audio_ceiling_bits = self.max_audio_kbps as f64 * 1000.0 * clip_seconds;
        let audio_bits_guess =
            (target_bits * self.audio_budget_share).clamp(audio_floor_bits, audio_ceiling_bits);

        let audio_kbps = ((audio_bits_guess / 1000.0 / clip_seconds).round() as u32)
            .clamp(self.min_audio_kbps, self.max_audio_kbps);

        let video_bits_available =
            (target_bits - audio_kbps as f64 * 1000.0 * clip_seconds).max(MIN_VIDEO_BITS);
        let video_kbps = (video_bits_available / 1000.0 / clip_seconds)
            .round()
            .clamp(MIN_VIDEO_KBPS as f64, MAX_VIDEO_KBPS as f64) as u32;

        Ok(BitratePlan {
            video_kbps,
            audio_kbps,
        })
    }
}

/// Decides whether frames should shrink so each pixel keeps enough bits.
#[derive(Debug, Clone, PartialEq)]
pub struct DownscaleAdvisor {
    pub min_bits_per_pixel: f64,
    pub min_dimension: u32,
}

impl Default for DownscaleAdvisor {
    fn default() -> Self {
        Self::from_settings(&PlannerSettings::default())
    }
}

impl DownscaleAdvisor {
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self {
            min_bits_per_pixel: settings.min_bits_per_pixel,
            min_dimension: settings.min_scaled_dimension,
        }
    }

    /// Bits spent on each pixel of each frame at `video_kbps`
    pub fn bits_per_pixel(width: u32, height: u32, frame_rate: f64, video_kbps: u32) -> f64 {
        video_kbps as f64 * 1000.0 / (width as f64 * height as f64 * frame_rate)
    }

    /// Return a smaller even frame size when density falls under the threshold.
    ///
    /// `None` when any measurement is missing, when density is already sufficient,
    /// or when the computed size would not be strictly smaller on both axes.
    pub fn advise(
        &self,
        width: Option<u32>,
        height: Option<u32>,
        frame_rate: Option<f64>,
        video_kbps: u32,
    ) -> Option<ScalePlan> {
        let (width, height, frame_rate) = match (width, height, frame_rate) {
            (Some(w), Some(h), Some(fps)) if w > 0 && h > 0 && fps > 0.0 && fps.is_finite() => {
                (w, h, fps)
            }
            _ => return None,
        };

        let bits_per_pixel = Self::bits_per_pixel(width, height, frame_rate, video_kbps);
        if bits_per_pixel >= self.min_bits_per_pixel {
            return None;
        }

        let scale_factor = (bits_per_pixel / self.min_bits_per_pixel).sqrt();
        let target_width = self.scaled_dimension(width, scale_factor);
        let target_height = self.scaled_dimension(height, scale_factor);

        if target_width < width && target_height < height {
            Some(ScalePlan {
                target_width,
                target_height,
            })
        } else {
            None
        }
    }

    /// Floor to even, then clamp to the minimum dimension
    fn scaled_dimension(&self, dimension: u32, scale_factor: f64) -> u32 {
        let even = ((dimension as f64 * scale_factor) / 2.0).floor() as u32 * 2;
        even.max(self.min_dimension)
    }
}
