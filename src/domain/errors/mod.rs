// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Time string that is not SS, MM:SS or HH:MM:SS
    #[error("Invalid time format: '{0}'. Expected SS(.mmm), MM:SS(.mmm) or HH:MM:SS(.mmm)")]
    InvalidTimeFormat(String),

    /// Clip range that cannot be encoded
    #[error("Invalid clip range: {0}")]
    InvalidRange(String),

    /// Non-positive or non-finite target size
    #[error("Target size must be a positive number of megabytes, got {0}")]
    InvalidTargetSize(f64),

    /// Source file missing
    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// External tool could not be located or spawned
    #[error("{tool} not found. {hint}")]
    ToolUnavailable { tool: String, hint: String },

    /// Transcoder exited non-zero
    #[error("ffmpeg pass {pass} failed: {detail}")]
    EncodeFailure { pass: u8, detail: String },

    /// Export stopped between passes on request
    #[error("Export aborted before pass 2")]
    Aborted,

    /// Configuration could not be loaded or is incoherent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem operation failed
    #[error("File system error: {0}")]
    FsFail(String),

    /// Process could not be run or its output read
    #[error("Process error: {0}")]
    ProcessFail(String),
}

impl DomainError {
    /// Build the actionable error reported when ffmpeg/ffprobe are missing
    pub fn tool_unavailable(tool: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            hint: "Install ffmpeg (which ships ffprobe) and make sure both are on PATH, \
                   or point [tools] ffmpeg/ffprobe at them in the config file."
                .to_string(),
        }
    }

    /// True for the input-validation family that is raised before any process runs
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidTimeFormat(_)
                | DomainError::InvalidRange(_)
                | DomainError::InvalidTargetSize(_)
                | DomainError::SourceNotFound(_)
                | DomainError::BadArgs(_)
        )
    }
}
