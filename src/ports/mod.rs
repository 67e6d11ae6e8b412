// Ports - Interface definitions (contracts)

use std::path::Path;

use crate::domain::errors::*;
use crate::domain::model::*;
use async_trait::async_trait;

/// Captured result of one finished process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last non-empty lines of stderr, the part of an ffmpeg log that names the failure
    pub fn stderr_tail(&self, lines: usize) -> String {
        let kept: Vec<&str> = self
            .stderr
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let skip = kept.len().saturating_sub(lines);
        kept[skip..].join("\n")
    }

    /// Tail of stderr, or of stdout when the tool wrote nothing to stderr
    pub fn diagnostic_tail(&self, lines: usize) -> String {
        let tail = self.stderr_tail(lines);
        if !tail.is_empty() {
            return tail;
        }
        Self {
            stderr: self.stdout.clone(),
            ..Self::default()
        }
        .stderr_tail(lines)
    }
}

/// Port for running external programs to completion
#[async_trait]
pub trait ProcessPort: Send + Sync {
    /// Run `program` with `args`, wait for exit and capture both streams.
    ///
    /// A non-zero exit is a normal `Ok` result; only a failure to spawn or
    /// collect the process is an error.
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, DomainError>;
}

/// Port for media file probing
///
/// Probing never fails the caller: anything that cannot be measured comes back absent.
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Container duration in seconds
    async fn probe_duration(&self, file_path: &Path) -> Option<f64>;

    /// Width, height and average frame rate of the first video stream
    async fn probe_video_stream(&self, file_path: &Path)
        -> (Option<u32>, Option<u32>, Option<f64>);

    /// Everything the planner needs in one go
    async fn probe(&self, file_path: &Path) -> MediaProperties {
        let duration_seconds = self.probe_duration(file_path).await;
        let (width, height, frame_rate) = self.probe_video_stream(file_path).await;
        MediaProperties {
            duration_seconds,
            width,
            height,
            frame_rate,
        }
    }
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if a regular file exists
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError>;

    /// Get file size in bytes
    async fn file_size(&self, file_path: &Path) -> Result<u64, DomainError>;

    /// Create directory (including parent directories)
    async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError>;

    /// Delete a file; returns whether something was removed
    async fn remove_file_if_exists(&self, file_path: &Path) -> Result<bool, DomainError>;
}
