// Inspect interactor - Orchestrates media file inspection use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::format_file_size;
use crate::utils::time::format_seconds;

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
    fs_port: Arc<dyn FsPort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(probe_port: Arc<dyn ProbePort>, fs_port: Arc<dyn FsPort>) -> Self {
        Self {
            probe_port,
            fs_port,
        }
    }

    /// Execute media file inspection
    pub async fn inspect(&self, path: &Path) -> Result<InspectReport, DomainError> {
        info!("Starting media file inspection for: {}", path.display());

        if !self.fs_port.file_exists(path).await? {
            return Err(DomainError::SourceNotFound(path.display().to_string()));
        }

        let size_bytes = self.fs_port.file_size(path).await?;
        let media = self.probe_port.probe(path).await;

        Ok(InspectReport {
            path: path.to_path_buf(),
            size_bytes,
            media,
        })
    }
}

/// Result of a media file inspection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub media: MediaProperties,
}

impl InspectReport {
    /// Human-readable summary; unmeasured fields print as "unknown"
    pub fn summary(&self) -> String {
        let unknown = || "unknown".to_string();
        let duration = self
            .media
            .duration_seconds
            .map(|d| format!("{} ({:.3}s)", format_seconds(d), d))
            .unwrap_or_else(unknown);
        let resolution = match (self.media.width, self.media.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => unknown(),
        };
        let frame_rate = self
            .media
            .frame_rate
            .map(|fps| format!("{:.3} fps", fps))
            .unwrap_or_else(unknown);

        let mut output = String::new();
        output.push_str("Media File Information:\n");
        output.push_str(&format!("  File: {}\n", self.path.display()));
        output.push_str(&format!("  Size: {}\n", format_file_size(self.size_bytes)));
        output.push_str(&format!("  Duration: {}\n", duration));
        output.push_str(&format!("  Resolution: {}\n", resolution));
        output.push_str(&format!("  Frame rate: {}\n", frame_rate));
        output
    }
}
