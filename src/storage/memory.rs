//! In-memory storage backend
//!
//! Holds files in a map keyed by normalised path. Directories exist
//! implicitly once a file lives below them, or explicitly after
//! `create_dir`.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStorageBackend {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    dirs: RwLock<BTreeSet<String>>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for seeding fixtures
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        if let Ok(key) = normalize(path)
            && let Ok(mut files) = self.files.write()
        {
            files.insert(key, content.into());
        }
        self
    }
}

fn normalize(path: &str) -> Result<String, StorageError> {
    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                return Err(StorageError::PermissionDenied(format!(
                    "Path traversal not allowed: {}",
                    path
                )));
            }
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

fn poisoned() -> StorageError {
    StorageError::IoError("Storage lock poisoned".to_string())
}

#[async_trait(?Send)]
impl StorageBackend for MemoryStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = normalize(path)?;
        self.files
            .read()
            .map_err(|_| poisoned())?
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let key = normalize(path)?;
        if key.is_empty() {
            return Err(StorageError::IoError("Cannot write to the root".to_string()));
        }
        self.files.write().map_err(|_| poisoned())?.insert(key, content.to_vec());
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let key = normalize(dir)?;
        if !self.dir_exists(dir).await? {
            return Err(StorageError::DirectoryNotFound(dir.to_string()));
        }
        let prefix = if key.is_empty() { String::new() } else { format!("{}/", key) };
        let files = self.files.read().map_err(|_| poisoned())?;
        Ok(files
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect())
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = normalize(path)?;
        Ok(self.files.read().map_err(|_| poisoned())?.contains_key(&key))
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize(path)?;
        self.files
            .write()
            .map_err(|_| poisoned())?
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize(path)?;
        self.dirs.write().map_err(|_| poisoned())?.insert(key);
        Ok(())
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = normalize(path)?;
        if key.is_empty() || self.dirs.read().map_err(|_| poisoned())?.contains(&key) {
            return Ok(true);
        }
        let prefix = format!("{}/", key);
        Ok(self
            .files
            .read()
            .map_err(|_| poisoned())?
            .keys()
            .any(|path| path.starts_with(&prefix)))
    }
}
