// Adapters - External system implementations

pub mod exec_process;
pub mod fs_local;
pub mod probe_ffprobe;
pub mod tool_locator;
pub mod toml_config;

// Re-export adapters
pub use exec_process::TokioProcessAdapter;
pub use fs_local::LocalFsAdapter;
pub use probe_ffprobe::FfprobeAdapter;
pub use tool_locator::{ToolLocator, ToolPaths};
pub use toml_config::{SizeClipConfig, TomlConfigAdapter};
