//! Model saving functionality
//!
//! Writes data models as YAML, JSON or BBF DM XML, and tree snapshots as
//! YAML or JSON.

use crate::export::{BbfXmlExporter, ExportError, SchemaExporter};
use crate::import::schema::SchemaFormat;
use crate::models::data_model::DataModel;
use crate::storage::{StorageBackend, StorageError, join_path};
use crate::tree::TreeSnapshot;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// On-disk format of a saved model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Yaml,
    Json,
    Xml,
}

impl ModelFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ModelFormat::Yaml => "yaml",
            ModelFormat::Json => "json",
            ModelFormat::Xml => "xml",
        }
    }

    /// Render a model in this format
    pub fn render(&self, model: &DataModel) -> Result<String, ExportError> {
        Ok(match self {
            ModelFormat::Yaml => SchemaExporter::export(model, SchemaFormat::Yaml)?.content,
            ModelFormat::Json => SchemaExporter::export(model, SchemaFormat::Json)?.content,
            ModelFormat::Xml => BbfXmlExporter::export(model)?.content,
        })
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ModelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(ModelFormat::Yaml),
            "json" => Ok(ModelFormat::Json),
            "xml" | "bbf" => Ok(ModelFormat::Xml),
            other => Err(format!("Unknown model format: {}", other)),
        }
    }
}

/// Model saver that uses a storage backend
pub struct ModelSaver<B: StorageBackend> {
    storage: B,
}

impl<B: StorageBackend> ModelSaver<B> {
    pub fn new(storage: B) -> Self {
        Self { storage }
    }

    pub fn into_storage(self) -> B {
        self.storage
    }

    /// Save a model into `dir`, named after the model
    /// (`Device:2.11` becomes `Device_2.11.yaml`). Returns the written path.
    pub async fn save_model(
        &self,
        dir: &str,
        model: &DataModel,
        format: ModelFormat,
    ) -> Result<String, StorageError> {
        if !self.storage.dir_exists(dir).await? {
            self.storage.create_dir(dir).await?;
        }

        let content = format
            .render(model)
            .map_err(|e| StorageError::SerializationError(format!("Failed to serialize {}: {}", model.name, e)))?;
        let path = join_path(
            dir,
            &format!("{}.{}", sanitize_filename(&model.name), format.extension()),
        );
        self.storage.write_file(&path, content.as_bytes()).await?;

        info!("Saved model {} to {}", model.name, path);
        Ok(path)
    }

    /// Save a tree snapshot; `.json` paths are written as JSON, anything
    /// else as YAML
    pub async fn save_snapshot(&self, path: &str, snapshot: &TreeSnapshot) -> Result<(), StorageError> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(snapshot)
                .map_err(|e| StorageError::SerializationError(format!("Failed to write JSON: {}", e)))?
        } else {
            serde_yaml::to_string(snapshot)
                .map_err(|e| StorageError::SerializationError(format!("Failed to write YAML: {}", e)))?
        };
        self.storage.write_file(path, content.as_bytes()).await?;

        info!(
            "Saved snapshot of {} ({} values) to {}",
            snapshot.model,
            snapshot.values.len(),
            path
        );
        Ok(())
    }
}

/// Replace characters that are invalid in file names on common platforms
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
