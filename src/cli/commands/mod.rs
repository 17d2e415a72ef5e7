//! Subcommand implementations

pub mod apply;
pub mod convert;
pub mod inspect;
pub mod validate;

use crate::cli::error::CliError;
use crate::import::{BbfXmlImporter, ImportResult, SchemaImporter};
use crate::models::bundled_model;
use crate::models::data_model::DataModel;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Load input content from file or stdin
pub(crate) fn load_input(input: &Path) -> Result<String, CliError> {
    if input.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        std::fs::read_to_string(input).map_err(|e| CliError::FileReadError(input.to_path_buf(), e.to_string()))
    }
}

/// Import a schema file, choosing the importer by extension (or by content
/// for stdin)
pub(crate) fn import_file(path: &Path, base_models: &[DataModel]) -> Result<ImportResult, CliError> {
    let content = load_input(path)?;
    let is_xml = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("xml"),
        None => content.trim_start().starts_with('<'),
    };
    let result = if is_xml {
        BbfXmlImporter::new()
            .with_base_models(base_models.iter().cloned())
            .import(&content)?
    } else {
        SchemaImporter::new().import(&content)?
    };
    Ok(result)
}

/// Model named on the command line: a schema file or a bundled model
pub(crate) fn resolve_model(file: Option<&PathBuf>, builtin: Option<&str>) -> Result<DataModel, CliError> {
    match (file, builtin) {
        (_, Some(name)) => Ok(bundled_model(name)?),
        (Some(path), None) => Ok(import_file(path, &[])?.into_single_model()?),
        (None, None) => Err(CliError::InvalidArgument(
            "either a schema file or --builtin is required".to_string(),
        )),
    }
}
