//! File system storage backend
//!
//! All paths are resolved below a base directory. `..` components are
//! rejected outright, and symlinks met on the way (dangling ones included)
//! must resolve inside the base.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct FileSystemStorageBackend {
    base_path: PathBuf,
}

impl FileSystemStorageBackend {
    /// # Example
    ///
    /// ```rust
    /// use cwmp_data_model::storage::filesystem::FileSystemStorageBackend;
    ///
    /// let backend = FileSystemStorageBackend::new("/var/lib/cwmp");
    /// assert_eq!(backend.base_path().to_str(), Some("/var/lib/cwmp"));
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let mut full = self.base_path.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => full.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    return Err(StorageError::PermissionDenied(format!(
                        "Path traversal not allowed: {}",
                        path
                    )));
                }
            }
        }

        // Every existing component is checked without following links; a
        // symlink must resolve to somewhere inside the base
        let base = self
            .base_path
            .canonicalize()
            .unwrap_or_else(|_| self.base_path.clone());
        let mut current = self.base_path.clone();
        for part in full.strip_prefix(&self.base_path).unwrap_or(Path::new("")).components() {
            current.push(part);
            let metadata = match std::fs::symlink_metadata(&current) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => break,
                Err(e) => return Err(StorageError::IoError(format!("Failed to resolve {}: {}", path, e))),
            };
            if !metadata.file_type().is_symlink() {
                continue;
            }
            let escapes = match current.canonicalize() {
                Ok(target) => !target.starts_with(&base),
                Err(_) => true,
            };
            if escapes {
                return Err(StorageError::PermissionDenied(format!(
                    "Path escapes base directory: {}",
                    path
                )));
            }
        }
        Ok(full)
    }
}

fn io_error(action: &str, path: &str, e: std::io::Error) -> StorageError {
    StorageError::IoError(format!("Failed to {} {}: {}", action, path, e))
}

#[async_trait(?Send)]
impl StorageBackend for FileSystemStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve_path(path)?;
        fs::read(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("read", path, e),
        })
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", path, e))?;
        }
        fs::write(&full_path, content)
            .await
            .map_err(|e| io_error("write", path, e))?;
        debug!("Wrote {} bytes to {}", content.len(), full_path.display());
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let full_path = self.resolve_path(dir)?;
        let mut read_dir = fs::read_dir(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::DirectoryNotFound(dir.to_string()),
            _ => io_error("read directory", dir, e),
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| io_error("read directory", dir, e))?
        {
            if let Ok(file_type) = entry.file_type().await
                && file_type.is_file()
                && let Some(file_name) = entry.file_name().to_str()
            {
                entries.push(file_name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;
        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("stat", path, e)),
        }
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;
        fs::remove_file(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("delete", path, e),
        })
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;
        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| io_error("create directory", path, e))
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;
        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("stat", path, e)),
        }
    }
}
