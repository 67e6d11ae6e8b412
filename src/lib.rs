//! sizeclip library
//!
//! Size-targeted two-pass transcode planning: bitrate allocation, a
//! bits-per-pixel downscale heuristic, ffmpeg argument assembly and an
//! orchestrator that runs both passes and checks the result against the target.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    BitratePlan, ClipRange, EncodePlan, ExportOutcome, ExportPhase, MediaProperties,
    PlannerSettings, ScalePlan,
};
pub use domain::rules::{BitrateAllocator, DownscaleAdvisor};
