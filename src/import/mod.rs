//! Import functionality
//!
//! Provides parsers for importing data models and parameter lists:
//! - Broadband Forum DM XML (`dm:document`)
//! - CWMP `ParameterList` arrays and SOAP envelopes
//! - YAML / JSON schema files

pub mod bbf_xml;
pub mod parameter_list;
pub mod schema;
mod xml;

use crate::models::data_model::DataModel;

/// Result of a model import operation
#[derive(Debug, Default)]
pub struct ImportResult {
    /// Models defined by the document, in document order
    pub models: Vec<DataModel>,
    /// Parse warnings that did not stop the import
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    /// The only model of the document
    pub fn into_single_model(self) -> Result<DataModel, ImportError> {
        let count = self.models.len();
        let mut models = self.models.into_iter();
        match (models.next(), count) {
            (Some(model), 1) => Ok(model),
            (None, _) => Err(ImportError::NotFound("model in document".to_string())),
            _ => Err(ImportError::ValidationError(format!(
                "Expected one model, document defines {}",
                count
            ))),
        }
    }

    pub fn model(&self, name: &str) -> Option<&DataModel> {
        self.models.iter().find(|m| m.name == name)
    }
}

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

// Re-export for convenience
pub use bbf_xml::BbfXmlImporter;
pub use parameter_list::{ParameterList, ParameterListImporter};
pub use schema::{SchemaFormat, SchemaImporter};
