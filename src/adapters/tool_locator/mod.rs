//! ffmpeg/ffprobe discovery
//!
//! Looks on `PATH` first, then in a short list of places people usually unpack
//! ffmpeg builds. Both tools of a discovered pair come from the same place.
//! The process environment is never modified; callers get absolute paths.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::errors::*;

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Resolved locations of the external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// Finds ffmpeg and ffprobe
#[derive(Debug, Clone)]
pub struct ToolLocator {
    ffmpeg_override: Option<PathBuf>,
    ffprobe_override: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
    use_path: bool,
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolLocator {
    pub fn new() -> Self {
        Self {
            ffmpeg_override: None,
            ffprobe_override: None,
            search_dirs: Self::known_locations(),
            use_path: true,
        }
    }

    /// Use explicit tool paths (or bare names to look up) instead of discovery
    pub fn with_overrides(mut self, ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        self.ffmpeg_override = ffmpeg;
        self.ffprobe_override = ffprobe;
        self
    }

    /// Replace the fallback directories searched after `PATH`
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    /// Skip the `PATH` lookup and only search the fallback directories
    pub fn without_path_lookup(mut self) -> Self {
        self.use_path = false;
        self
    }

    /// Usual unpack locations: next to the executable, the Downloads folder, and on
    /// Windows the common install roots
    pub fn known_locations() -> Vec<PathBuf> {
        let mut locations = Vec::new();
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            locations.push(exe_dir.join("bin"));
            locations.push(exe_dir.join("ffmpeg"));
            locations.push(exe_dir.join("ffmpeg").join("bin"));
            locations.insert(0, exe_dir);
        }
        if let Some(home) = dirs::home_dir() {
            locations.push(home.join("Downloads").join("ffmpeg").join("bin"));
        }
        if cfg!(windows) {
            locations.extend(
                [
                    r"C:\ffmpeg\bin",
                    r"C:\Program Files\ffmpeg\bin",
                    r"C:\Program Files (x86)\ffmpeg\bin",
                    r"C:\ProgramData\chocolatey\bin",
                ]
                .iter()
                .map(PathBuf::from),
            );
        }
        locations
    }

    /// Resolve both tools or fail with an actionable [`DomainError::ToolUnavailable`]
    pub fn locate(&self) -> Result<ToolPaths, DomainError> {
        let ffmpeg = self.ffmpeg_override.as_deref().map(|p| resolve_explicit(FFMPEG, p));
        let ffprobe = self.ffprobe_override.as_deref().map(|p| resolve_explicit(FFPROBE, p));

        let paths = match (ffmpeg, ffprobe) {
            (Some(ffmpeg), Some(ffprobe)) => ToolPaths {
                ffmpeg: ffmpeg?,
                ffprobe: ffprobe?,
            },
            (Some(ffmpeg), None) => ToolPaths {
                ffmpeg: ffmpeg?,
                ffprobe: self.discover_one(FFPROBE)?,
            },
            (None, Some(ffprobe)) => ToolPaths {
                ffmpeg: self.discover_one(FFMPEG)?,
                ffprobe: ffprobe?,
            },
            (None, None) => self.discover_pair()?,
        };

        info!(
            "Using ffmpeg at {} and ffprobe at {}",
            paths.ffmpeg.display(),
            paths.ffprobe.display()
        );
        Ok(paths)
    }

    fn discover_pair(&self) -> Result<ToolPaths, DomainError> {
        match self.discover(&[FFMPEG, FFPROBE]).as_deref() {
            Some([ffmpeg, ffprobe]) => Ok(ToolPaths {
                ffmpeg: ffmpeg.clone(),
                ffprobe: ffprobe.clone(),
            }),
            _ => Err(DomainError::tool_unavailable("ffmpeg/ffprobe")),
        }
    }

    fn discover_one(&self, tool: &str) -> Result<PathBuf, DomainError> {
        self.discover(&[tool])
            .and_then(|mut found| found.pop())
            .ok_or_else(|| DomainError::tool_unavailable(tool))
    }

    /// All `tools` from one place: `PATH`, else the first fallback directory holding every one
    fn discover(&self, tools: &[&str]) -> Option<Vec<PathBuf>> {
        if self.use_path {
            let on_path: Option<Vec<PathBuf>> =
                tools.iter().map(|tool| which::which(tool).ok()).collect();
            if on_path.is_some() {
                debug!("Found {:?} on PATH", tools);
                return on_path;
            }
        }

        self.search_dirs.iter().find_map(|dir| {
            let found: Option<Vec<PathBuf>> = tools
                .iter()
                .map(|tool| {
                    let candidate = dir.join(executable_name(tool));
                    candidate.is_file().then_some(candidate)
                })
                .collect();
            if found.is_some() {
                debug!("Found {:?} in {}", tools, dir.display());
            }
            found
        })
    }
}

fn resolve_explicit(tool: &str, path: &Path) -> Result<PathBuf, DomainError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    which::which(path).map_err(|e| {
        debug!("Configured {} at {} is unusable: {}", tool, path.display(), e);
        DomainError::tool_unavailable(format!("{} ({})", tool, path.display()))
    })
}

/// Platform file name of a tool
pub fn executable_name(tool: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", tool)
    } else {
        tool.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, tool: &str) -> PathBuf {
        let path = dir.join(executable_name(tool));
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_finds_pair_in_fallback_dir() {
        let empty = TempDir::new().unwrap();
        let install = TempDir::new().unwrap();
        let ffmpeg = touch(install.path(), FFMPEG);
        let ffprobe = touch(install.path(), FFPROBE);

        let paths = ToolLocator::new()
            .without_path_lookup()
            .with_search_dirs(vec![empty.path().to_path_buf(), install.path().to_path_buf()])
            .locate()
            .unwrap();
        assert_eq!(paths, ToolPaths { ffmpeg, ffprobe });
    }

    #[test]
    fn test_pair_must_share_a_directory() {
        let only_ffmpeg = TempDir::new().unwrap();
        let only_ffprobe = TempDir::new().unwrap();
        touch(only_ffmpeg.path(), FFMPEG);
        touch(only_ffprobe.path(), FFPROBE);

        let result = ToolLocator::new()
            .without_path_lookup()
            .with_search_dirs(vec![
                only_ffmpeg.path().to_path_buf(),
                only_ffprobe.path().to_path_buf(),
            ])
            .locate();
        assert!(matches!(result, Err(DomainError::ToolUnavailable { .. })));
    }

    #[test]
    fn test_explicit_paths_win() {
        let dir = TempDir::new().unwrap();
        let ffmpeg = touch(dir.path(), "custom-ffmpeg");
        let ffprobe = touch(dir.path(), "custom-ffprobe");

        let paths = ToolLocator::new()
            .without_path_lookup()
            .with_search_dirs(vec![])
            .with_overrides(Some(ffmpeg.clone()), Some(ffprobe.clone()))
            .locate()
            .unwrap();
        assert_eq!(paths.ffmpeg, ffmpeg);
        assert_eq!(paths.ffprobe, ffprobe);
    }

    #[test]
    fn test_single_override_discovers_the_other() {
        let dir = TempDir::new().unwrap();
        let ffmpeg = touch(dir.path(), "my-ffmpeg");
        let ffprobe = touch(dir.path(), FFPROBE);

        let paths = ToolLocator::new()
            .without_path_lookup()
            .with_search_dirs(vec![dir.path().to_path_buf()])
            .with_overrides(Some(ffmpeg.clone()), None)
            .locate()
            .unwrap();
        assert_eq!(paths, ToolPaths { ffmpeg, ffprobe });
    }

    #[test]
    fn test_missing_explicit_path_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let result = ToolLocator::new()
            .without_path_lookup()
            .with_overrides(Some(dir.path().join("nope")), Some(dir.path().join("nope2")))
            .locate();
        match result {
            Err(DomainError::ToolUnavailable { tool, hint }) => {
                assert!(tool.starts_with("ffmpeg"));
                assert!(hint.contains("Install ffmpeg"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
