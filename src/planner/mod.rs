//! Two-pass encode planning
//!
//! Turns a clip range, a bitrate plan and an optional downscale into the exact
//! argument vectors of the analysis and encode passes.

pub mod two_pass;

pub use two_pass::EncodePlanBuilder;

/// Video encoder used by both passes
pub const VIDEO_CODEC: &str = "libx264";

/// Audio encoder used by pass 2
pub const AUDIO_CODEC: &str = "aac";

/// Pixel format both passes normalize to
pub const PIXEL_FORMAT: &str = "yuv420p";
