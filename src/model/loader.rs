//! Model loading functionality
//!
//! Loads schema files and tree snapshots from a storage backend.
//!
//! Every `.xml`, `.yaml`, `.yml` and `.json` file of a directory is read in
//! name order. XML documents whose model extends a model from another file
//! are retried once that file has been imported, so file order does not
//! matter. A file that cannot be read or parsed is reported in
//! [`ModelLoadResult::failures`] and does not stop the others from loading.

use crate::config::ValidationConfig;
use crate::import::{BbfXmlImporter, ImportError, SchemaImporter};
use crate::models::data_model::DataModel;
use crate::storage::{StorageBackend, StorageError, join_path};
use crate::tree::{DeviceTree, TreeSnapshot};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SCHEMA_EXTENSIONS: [&str; 4] = ["xml", "yaml", "yml", "json"];

/// A schema file that loaded successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedFile {
    pub path: String,
    /// SHA-256 of the file content, hex encoded
    pub digest: String,
    /// Names of the models the file defines
    pub models: Vec<String>,
    /// Import warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A schema file that could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ModelLoadResult {
    pub models: Vec<DataModel>,
    pub files: Vec<LoadedFile>,
    pub failures: Vec<FileFailure>,
}

impl ModelLoadResult {
    pub fn model(&self, name: &str) -> Option<&DataModel> {
        self.models.iter().find(|m| m.name == name)
    }
}

struct PendingFile {
    path: String,
    digest: String,
    content: String,
    is_xml: bool,
}

/// Model loader that uses a storage backend
pub struct ModelLoader<B: StorageBackend> {
    storage: B,
}

impl<B: StorageBackend> ModelLoader<B> {
    pub fn new(storage: B) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &B {
        &self.storage
    }

    /// Load every schema file in `dir`
    pub async fn load_models(&self, dir: &str) -> Result<ModelLoadResult, StorageError> {
        let mut result = ModelLoadResult::default();
        let mut pending = Vec::new();

        let mut files = self.storage.list_files(dir).await?;
        files.sort();
        for file_name in files {
            let Some(extension) = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) else {
                continue;
            };
            if !SCHEMA_EXTENSIONS.contains(&extension.as_str()) {
                debug!("Skipping {}", file_name);
                continue;
            }

            let path = join_path(dir, &file_name);
            match self.storage.read_file(&path).await {
                Ok(bytes) => {
                    let digest = format!("{:x}", Sha256::digest(&bytes));
                    match String::from_utf8(bytes) {
                        Ok(content) => pending.push(PendingFile {
                            path,
                            digest,
                            content,
                            is_xml: extension == "xml",
                        }),
                        Err(e) => fail(&mut result, path, format!("not UTF-8: {}", e)),
                    }
                }
                Err(e) => fail(&mut result, path, e.to_string()),
            }
        }

        // Each pass imports what it can; stop once a pass makes no progress
        loop {
            let before = pending.len();
            let mut deferred = Vec::new();
            for file in pending {
                match self.import_file(&file, &result.models) {
                    Ok(imported) => {
                        let names: Vec<String> = imported.models.iter().map(|m| m.name.clone()).collect();
                        for warning in &imported.errors {
                            warn!("{}: {}", file.path, warning);
                        }
                        info!("Loaded {} from {}", names.join(", "), file.path);
                        result.files.push(LoadedFile {
                            path: file.path,
                            digest: file.digest,
                            models: names,
                            warnings: imported.errors.iter().map(ToString::to_string).collect(),
                        });
                        result.models.extend(imported.models);
                    }
                    Err(ImportError::NotFound(missing)) if file.is_xml => {
                        debug!("Deferring {} until {} is loaded", file.path, missing);
                        deferred.push((file, missing));
                    }
                    Err(e) => fail(&mut result, file.path, e.to_string()),
                }
            }
            if deferred.is_empty() || deferred.len() == before {
                for (file, missing) in deferred {
                    fail(&mut result, file.path, format!("missing {}", missing));
                }
                break;
            }
            pending = deferred.into_iter().map(|(file, _)| file).collect();
        }

        info!(
            "Loaded {} model(s) from {} ({} file(s) failed)",
            result.models.len(),
            dir,
            result.failures.len()
        );
        Ok(result)
    }

    fn import_file(&self, file: &PendingFile, loaded: &[DataModel]) -> Result<crate::import::ImportResult, ImportError> {
        if file.is_xml {
            BbfXmlImporter::new()
                .with_base_models(loaded.iter().cloned())
                .import(&file.content)
        } else {
            SchemaImporter::new().import(&file.content)
        }
    }

    /// Read a tree snapshot (YAML or JSON)
    pub async fn load_snapshot(&self, path: &str) -> Result<TreeSnapshot, StorageError> {
        let content = self.storage.read_to_string(path).await?;
        let snapshot = if path.ends_with(".json") {
            serde_json::from_str(&content)
                .map_err(|e| StorageError::SerializationError(format!("{}: {}", path, e)))?
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| StorageError::SerializationError(format!("{}: {}", path, e)))?
        };
        Ok(snapshot)
    }

    /// Read a snapshot and rebuild its tree over `model`
    pub async fn load_tree(&self, path: &str, model: Arc<DataModel>, config: ValidationConfig) -> Result<DeviceTree> {
        let snapshot = self
            .load_snapshot(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path))?;
        let tree = DeviceTree::from_snapshot(model, config, &snapshot)
            .with_context(|| format!("Failed to restore snapshot {}", path))?;
        info!("Restored {} object(s) from {}", tree.object_paths().len(), path);
        Ok(tree)
    }
}

fn fail(result: &mut ModelLoadResult, path: String, error: String) {
    warn!("Failed to load {}: {}", path, error);
    result.failures.push(FileFailure { path, error });
}
