//! Convert command implementation

use super::resolve_model;
use crate::cli::error::CliError;
use crate::model::ModelFormat;
use std::path::PathBuf;
use tracing::info;

pub fn handle_convert(
    file: Option<&PathBuf>,
    builtin: Option<&str>,
    format: &str,
    output: Option<&PathBuf>,
) -> Result<(), CliError> {
    let format: ModelFormat = format.parse().map_err(CliError::InvalidArgument)?;
    let model = resolve_model(file, builtin)?;
    let content = format.render(&model)?;

    match output {
        Some(path) => {
            std::fs::write(path, &content).map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
            info!("Wrote {} as {} to {}", model.name, format, path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
