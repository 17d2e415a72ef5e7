//! CWMP Data Model SDK - schema-driven TR-069 device data models
//!
//! Provides unified interfaces for:
//! - Data model definitions (objects, parameters, syntax, data types)
//! - BBF DM XML, YAML and JSON import/export
//! - Typed parameter values and path addressing
//! - Device trees implementing the CWMP parameter RPC semantics
//! - Model and tree validation
//! - Model loading/saving (via storage backends)

pub mod config;
pub mod export;
pub mod import;
pub mod model;
pub mod models;
pub mod path;
pub mod rpc;
pub mod storage;
pub mod tree;
pub mod validation;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use config::{ConfigError, ValidationConfig};
pub use storage::{MemoryStorageBackend, StorageBackend, StorageError};
#[cfg(feature = "native-fs")]
pub use storage::filesystem::FileSystemStorageBackend;

pub use model::{ModelFormat, ModelLoader, ModelSaver};
pub use import::{BbfXmlImporter, ImportError, ImportResult, ParameterListImporter, SchemaImporter};
pub use export::{BbfXmlExporter, ExportError, ExportResult, ParameterListExporter, SchemaExporter};
pub use validation::{ModelValidator, TreeValidator, ValidationReport};

// Re-export models
pub use models::{
    Access, ActiveNotify, BaseType, DataModel, MaxEntries, NotificationLevel, ObjectDef, ParameterDef,
    Specification, Syntax, UniqueKey, bundled_model,
};
pub use path::{ParameterPath, PathError};
pub use rpc::{ChangeStatus, ParameterFault, ParameterValueStruct};
pub use tree::{DeviceTree, TreeError, TreeSnapshot};
pub use value::{ParameterValue, ValueError};
