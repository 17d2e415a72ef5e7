//! CLI error type

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::import::ImportError;
use crate::tree::TreeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidArgument(_) => 2,
            CliError::ValidationError(_) | CliError::Tree(_) => 1,
            _ => 3,
        }
    }
}
