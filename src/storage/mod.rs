//! Storage backend abstraction
//!
//! Schema files and tree snapshots are read and written through the
//! [`StorageBackend`] trait:
//! - [`filesystem::FileSystemStorageBackend`]: native file system rooted at
//!   a base directory (feature `native-fs`)
//! - [`memory::MemoryStorageBackend`]: in-process map, for embedding and
//!   tests

use async_trait::async_trait;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Trait for storage backends
///
/// Paths are `/`-separated and relative to the backend's root.
#[async_trait(?Send)]
pub trait StorageBackend: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a file, creating missing parent directories
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Names of the files (not subdirectories) directly inside `dir`
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError>;

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError>;

    async fn delete_file(&self, path: &str) -> Result<(), StorageError>;

    async fn create_dir(&self, path: &str) -> Result<(), StorageError>;

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Read a file as UTF-8 text
    async fn read_to_string(&self, path: &str) -> Result<String, StorageError> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| StorageError::SerializationError(format!("{} is not UTF-8: {}", path, e)))
    }
}

/// Join a directory and a file name the way every backend expects them
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

// Storage backend implementations
#[cfg(feature = "native-fs")]
pub mod filesystem;
pub mod memory;

pub use memory::MemoryStorageBackend;
