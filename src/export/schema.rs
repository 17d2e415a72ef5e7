//! YAML / JSON schema exporter

use crate::export::{ExportError, ExportResult};
use crate::import::schema::SchemaFormat;
use crate::models::data_model::DataModel;

/// Exporter for the serde form of a [`DataModel`]
pub struct SchemaExporter;

impl SchemaExporter {
    pub fn export(model: &DataModel, format: SchemaFormat) -> Result<ExportResult, ExportError> {
        let (content, format) = match format {
            SchemaFormat::Yaml => (
                serde_yaml::to_string(model).map_err(|e| ExportError::SerializationError(e.to_string()))?,
                "yaml",
            ),
            SchemaFormat::Json => (
                serde_json::to_string_pretty(model)
                    .map_err(|e| ExportError::SerializationError(e.to_string()))?,
                "json",
            ),
        };
        Ok(ExportResult {
            content,
            format: format.to_string(),
        })
    }

    pub fn export_yaml(model: &DataModel) -> Result<String, ExportError> {
        Ok(Self::export(model, SchemaFormat::Yaml)?.content)
    }

    pub fn export_json(model: &DataModel) -> Result<String, ExportError> {
        Ok(Self::export(model, SchemaFormat::Json)?.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::SchemaImporter;
    use crate::models::bundled_model;

    #[test]
    fn test_yaml_and_json_reimport() {
        let model = bundled_model("tr-098").unwrap();
        for format in [SchemaFormat::Yaml, SchemaFormat::Json] {
            let exported = SchemaExporter::export(&model, format).unwrap();
            let importer = SchemaImporter::new();
            assert_eq!(importer.detect_format(&exported.content), format);
            let reimported = importer
                .import(&exported.content)
                .unwrap()
                .into_single_model()
                .unwrap();
            assert_eq!(reimported, model);
        }
    }

    #[test]
    fn test_yaml_uses_camel_case() {
        let yaml = SchemaExporter::export_yaml(&bundled_model("tr-181").unwrap()).unwrap();
        assert!(yaml.contains("numEntriesParameter: InterfaceNumberOfEntries"));
        assert!(yaml.contains("maxEntries: unbounded"));
        assert!(!yaml.contains("num_entries_parameter"));
    }
}
