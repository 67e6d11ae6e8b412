//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::{SizeClipConfig, TomlConfigAdapter};
use crate::cli::Cli;

/// Build the effective configuration: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> Result<SizeClipConfig> {
    initialize_with(cli, &TomlConfigAdapter::new(), |key| std::env::var(key).ok())
}

/// Same hierarchy with injectable file locations and environment
pub fn initialize_with<F>(cli: &Cli, adapter: &TomlConfigAdapter, env: F) -> Result<SizeClipConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, source) = adapter
        .load(cli.config.as_deref())
        .context("Failed to load configuration file")?;
    if let Some(path) = source {
        info!("Configuration file: {}", path.display());
    }

    TomlConfigAdapter::apply_env_with(&mut config, env)
        .context("Invalid environment override")?;
    apply_cli_overrides(&mut config, cli);

    config.planner.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Apply command-line flags on top of everything else
pub fn apply_cli_overrides(config: &mut SizeClipConfig, cli: &Cli) {
    let mut applied = 0;

    if let Some(ffmpeg) = &cli.ffmpeg {
        config.tools.ffmpeg = Some(ffmpeg.clone());
        applied += 1;
    }
    if let Some(ffprobe) = &cli.ffprobe {
        config.tools.ffprobe = Some(ffprobe.clone());
        applied += 1;
    }

    if let Some(overrides) = cli.command.encode_overrides() {
        if let Some(dir) = &overrides.output_dir {
            config.output.directory = Some(dir.clone());
            applied += 1;
        }
        if let Some(preset) = &overrides.preset {
            config.planner.preset = preset.clone();
            applied += 1;
        }
        if let Some(tolerance) = overrides.size_tolerance {
            config.planner.size_tolerance = tolerance;
            applied += 1;
        }
    }

    if applied > 0 {
        info!("Applied {} CLI configuration overrides", applied);
    }
}
