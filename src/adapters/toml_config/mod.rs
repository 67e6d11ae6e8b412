// TOML config adapter - Configuration management using TOML files

use crate::domain::errors::*;
use crate::domain::model::PlannerSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENV_FFMPEG: &str = "SIZECLIP_FFMPEG";
pub const ENV_FFPROBE: &str = "SIZECLIP_FFPROBE";
pub const ENV_OUTPUT_DIR: &str = "SIZECLIP_OUTPUT_DIR";
pub const ENV_PRESET: &str = "SIZECLIP_PRESET";
pub const ENV_SIZE_TOLERANCE: &str = "SIZECLIP_SIZE_TOLERANCE";

/// File name looked up in the working directory when no user config exists
pub const LOCAL_CONFIG_FILE: &str = "sizeclip.toml";

/// `[tools]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

/// `[output]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeClipConfig {
    pub planner: PlannerSettings,
    pub tools: ToolsConfig,
    pub output: OutputConfig,
}

/// TOML configuration adapter
#[derive(Debug, Clone)]
pub struct TomlConfigAdapter {
    search_paths: Vec<PathBuf>,
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TomlConfigAdapter {
    /// Search the user config directory, then the working directory
    pub fn new() -> Self {
        let mut search_paths = Vec::new();
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }
        search_paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
        Self { search_paths }
    }

    /// Use an explicit list of candidate files instead of the default locations
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// `<config dir>/sizeclip/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sizeclip").join("config.toml"))
    }

    /// Load `explicit` (which must exist) or the first existing search path.
    ///
    /// Returns the defaults when nothing is found, along with the file actually read.
    pub fn load(
        &self,
        explicit: Option<&Path>,
    ) -> Result<(SizeClipConfig, Option<PathBuf>), DomainError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(DomainError::Config(format!(
                    "Config file does not exist: {}",
                    path.display()
                )));
            }
            return Ok((Self::load_file(path)?, Some(path.to_path_buf())));
        }

        for path in &self.search_paths {
            if path.is_file() {
                return Ok((Self::load_file(path)?, Some(path.clone())));
            }
            debug!("No config at {}", path.display());
        }

        info!("No config file found, using defaults");
        Ok((SizeClipConfig::default(), None))
    }

    fn load_file(path: &Path) -> Result<SizeClipConfig, DomainError> {
        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| DomainError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text; missing keys keep their defaults
    pub fn parse(content: &str) -> Result<SizeClipConfig, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Apply `SIZECLIP_*` variables from the process environment
    pub fn apply_env(config: &mut SizeClipConfig) -> Result<(), DomainError> {
        Self::apply_env_with(config, |key| std::env::var(key).ok())
    }

    /// Apply `SIZECLIP_*` overrides read through `lookup`; empty values are ignored
    pub fn apply_env_with<F>(config: &mut SizeClipConfig, lookup: F) -> Result<(), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut applied = 0;

        if let Some(value) = get(ENV_FFMPEG) {
            config.tools.ffmpeg = Some(PathBuf::from(value));
            applied += 1;
        }
        if let Some(value) = get(ENV_FFPROBE) {
            config.tools.ffprobe = Some(PathBuf::from(value));
            applied += 1;
        }
        if let Some(value) = get(ENV_OUTPUT_DIR) {
            config.output.directory = Some(PathBuf::from(value));
            applied += 1;
        }
        if let Some(value) = get(ENV_PRESET) {
            config.planner.preset = value.trim().to_string();
            applied += 1;
        }
        if let Some(value) = get(ENV_SIZE_TOLERANCE) {
            config.planner.size_tolerance = value.trim().parse().map_err(|e| {
                DomainError::Config(format!("Invalid {} '{}': {}", ENV_SIZE_TOLERANCE, value, e))
            })?;
            applied += 1;
        }

        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = TomlConfigAdapter::parse(
            r#"
            [planner]
            max_audio_kbps = 128
            preset = "slow"

            [tools]
            ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
            "#,
        )
        .unwrap();

        assert_eq!(config.planner.max_audio_kbps, 128);
        assert_eq!(config.planner.preset, "slow");
        assert_eq!(config.planner.min_audio_kbps, 48);
        assert_eq!(config.planner.size_tolerance, 0.08);
        assert_eq!(config.tools.ffmpeg, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(config.tools.ffprobe, None);
        assert_eq!(config.output.directory, None);
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(matches!(
            TomlConfigAdapter::parse("[planner\nmax_audio_kbps = "),
            Err(DomainError::Config(_))
        ));
        assert!(TomlConfigAdapter::parse("[planner]\nmax_audio_kbps = \"lots\"").is_err());
    }

    #[test]
    fn test_load_first_existing_search_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("sizeclip.toml");
        std::fs::write(&present, "[output]\ndirectory = \"/srv/clips\"\n").unwrap();

        let adapter = TomlConfigAdapter::with_search_paths(vec![missing, present.clone()]);
        let (config, source) = adapter.load(None).unwrap();
        assert_eq!(source, Some(present));
        assert_eq!(config.output.directory, Some(PathBuf::from("/srv/clips")));
    }

    #[test]
    fn test_load_without_files_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let adapter = TomlConfigAdapter::with_search_paths(vec![dir.path().join("none.toml")]);
        let (config, source) = adapter.load(None).unwrap();
        assert_eq!(config, SizeClipConfig::default());
        assert_eq!(source, None);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let adapter = TomlConfigAdapter::with_search_paths(vec![]);
        assert!(matches!(
            adapter.load(Some(&dir.path().join("absent.toml"))),
            Err(DomainError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = TomlConfigAdapter::parse("[planner]\npreset = \"slow\"").unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_PRESET, "veryslow"),
            (ENV_SIZE_TOLERANCE, "0.05"),
            (ENV_OUTPUT_DIR, "/tmp/out"),
            (ENV_FFPROBE, ""),
        ]
        .into_iter()
        .collect();

        TomlConfigAdapter::apply_env_with(&mut config, |key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.planner.preset, "veryslow");
        assert_eq!(config.planner.size_tolerance, 0.05);
        assert_eq!(config.output.directory, Some(PathBuf::from("/tmp/out")));
        // Empty variables leave the value alone
        assert_eq!(config.tools.ffprobe, None);
    }

    #[test]
    fn test_env_rejects_bad_tolerance() {
        let mut config = SizeClipConfig::default();
        let result = TomlConfigAdapter::apply_env_with(&mut config, |key| {
            (key == ENV_SIZE_TOLERANCE).then(|| "eight percent".to_string())
        });
        assert!(matches!(result, Err(DomainError::Config(_))));
    }
}
