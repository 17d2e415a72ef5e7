//! YAML / JSON schema importer
//!
//! Reads the serde form of a [`DataModel`], as written by
//! [`crate::export::SchemaExporter`]. A file may hold one model or a list of
//! models.

use super::{ImportError, ImportResult};
use crate::models::data_model::DataModel;
use serde::Deserialize;
use tracing::info;

/// Serialization format of a schema file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Many(Vec<DataModel>),
    One(Box<DataModel>),
}

#[derive(Debug, Default)]
pub struct SchemaImporter;

impl SchemaImporter {
    pub fn new() -> Self {
        Self
    }

    /// Detect format (YAML or JSON) from content
    pub fn detect_format(&self, content: &str) -> SchemaFormat {
        // JSON is the stricter of the two
        if serde_json::from_str::<serde_json::Value>(content).is_ok() {
            SchemaFormat::Json
        } else {
            SchemaFormat::Yaml
        }
    }

    pub fn import(&self, content: &str) -> Result<ImportResult, ImportError> {
        let format = self.detect_format(content);
        self.import_as(content, format)
    }

    pub fn import_as(&self, content: &str, format: SchemaFormat) -> Result<ImportResult, ImportError> {
        let document: SchemaDocument = match format {
            SchemaFormat::Json => serde_json::from_str(content)
                .map_err(|e| ImportError::ParseError(format!("Invalid JSON schema: {}", e)))?,
            SchemaFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ImportError::ParseError(format!("Invalid YAML schema: {}", e)))?,
        };

        let mut models = match document {
            SchemaDocument::Many(models) => models,
            SchemaDocument::One(model) => vec![*model],
        };
        for model in &mut models {
            if model.name.is_empty() {
                return Err(ImportError::ValidationError("Model without a name".to_string()));
            }
            // Older files may predate the specification field
            if model.specification.is_none() {
                model.specification = crate::models::Specification::from_model_name(&model.name);
            }
            info!("Imported model {} ({} objects)", model.name, model.objects.len());
        }

        Ok(ImportResult {
            models,
            errors: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaseType, MaxEntries, Specification};

    const YAML: &str = r#"
name: Device:2.11
objects:
  - name: Device.
    parameters:
      - name: HostNumberOfEntries
        syntax:
          base: unsignedInt
  - name: Device.Host.{i}.
    access: readWrite
    minEntries: 0
    maxEntries: unbounded
    numEntriesParameter: HostNumberOfEntries
    uniqueKeys:
      - functional: false
        parameters: [Alias]
    parameters:
      - name: Alias
        access: readWrite
        syntax:
          dataType: Alias
"#;

    #[test]
    fn test_import_yaml() {
        let importer = SchemaImporter::new();
        assert_eq!(importer.detect_format(YAML), SchemaFormat::Yaml);
        let model = importer.import(YAML).unwrap().into_single_model().unwrap();
        assert_eq!(model.specification, Some(Specification::Tr181));

        let device = model.object("Device.").unwrap();
        assert_eq!(device.min_entries, 1);
        assert_eq!(device.max_entries, MaxEntries::Bounded(1));
        assert_eq!(
            device.parameter("HostNumberOfEntries").unwrap().syntax.base,
            BaseType::UnsignedInt
        );

        let host = model.object("Device.Host.{i}.").unwrap();
        assert_eq!(host.max_entries, MaxEntries::Unbounded);
        assert!(!host.unique_keys[0].functional);
    }

    #[test]
    fn test_import_json_list() {
        let json = r#"[{"name":"Device:2.11"},{"name":"InternetGatewayDevice:1.14"}]"#;
        let result = SchemaImporter::new().import(json).unwrap();
        assert_eq!(result.models.len(), 2);
        assert!(result.model("InternetGatewayDevice:1.14").is_some());
        assert!(result.into_single_model().is_err());
    }

    #[test]
    fn test_invalid_documents() {
        let importer = SchemaImporter::new();
        assert!(importer.import("name: [unclosed").is_err());
        assert!(matches!(
            importer.import_as(r#"{"name":""}"#, SchemaFormat::Json),
            Err(ImportError::ValidationError(_))
        ));
    }
}
