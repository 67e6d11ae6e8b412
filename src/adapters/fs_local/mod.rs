// Local filesystem adapter - File system operations through tokio::fs

use crate::domain::errors::*;
use crate::ports::*;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Local filesystem adapter
#[derive(Debug, Clone, Default)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
        match fs::metadata(file_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to inspect {}: {}",
                file_path.display(),
                e
            ))),
        }
    }

    async fn file_size(&self, file_path: &Path) -> Result<u64, DomainError> {
        let metadata = fs::metadata(file_path).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to get size of {}: {}", file_path.display(), e))
        })?;
        Ok(metadata.len())
    }

    async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError> {
        fs::create_dir_all(dir_path).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create directory {}: {}",
                dir_path.display(),
                e
            ))
        })
    }

    async fn remove_file_if_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
        match fs::remove_file(file_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to delete {}: {}",
                file_path.display(),
                e
            ))),
        }
    }
}
