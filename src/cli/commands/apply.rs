//! Apply command implementation
//!
//! Builds a fresh device tree for a model and runs one SetParameterValues
//! against it, the way an ACS request would be processed.

use super::{load_input, resolve_model};
use crate::cli::error::CliError;
use crate::cli::output::{format_faults, format_values};
use crate::config::ValidationConfig;
use crate::import::ParameterListImporter;
use crate::tree::{DeviceTree, TreeError};
use std::path::PathBuf;
use std::sync::Arc;

pub fn handle_apply(
    file: Option<&PathBuf>,
    builtin: Option<&str>,
    parameters: &PathBuf,
    config: Option<&PathBuf>,
) -> Result<(), CliError> {
    let config = match config {
        Some(path) => ValidationConfig::from_toml_file(path)?,
        None => ValidationConfig::default(),
    };
    let model = resolve_model(file, builtin)?;
    let list = ParameterListImporter::new().import(&load_input(parameters)?)?;
    if list.values.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "{} holds no ParameterValueStruct entries",
            parameters.display()
        )));
    }

    let mut tree = DeviceTree::new(Arc::new(model), config)?;
    let key = list.parameter_key.as_deref().unwrap_or_default();
    match tree.set_parameter_values(&list.values, key) {
        Ok(status) => {
            let names: Vec<&str> = list.values.iter().map(|v| v.name.as_str()).collect();
            print!("{}", format_values(&tree.get_parameter_values(&names)?));
            println!("Status: {}", status.as_u8());
            Ok(())
        }
        Err(TreeError::SetRejected(faults)) => {
            print!("{}", format_faults(&faults));
            Err(CliError::ValidationError(format!("{} fault(s)", faults.len())))
        }
        Err(e) => Err(e.into()),
    }
}
