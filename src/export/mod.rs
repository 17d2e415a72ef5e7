//! Export functionality
//!
//! Provides exporters for:
//! - CWMP parameter structures (`ParameterList`, `ParameterInfoStruct`,
//!   `ParameterAttributeStruct` arrays)
//! - Broadband Forum DM XML
//! - YAML / JSON schema files

pub mod bbf_xml;
pub mod parameter_list;
pub mod schema;

/// Result of an export operation
#[derive(Debug)]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

// Re-export for convenience
pub use bbf_xml::BbfXmlExporter;
pub use parameter_list::ParameterListExporter;
pub use schema::SchemaExporter;
