//! Inspect command implementation

use super::resolve_model;
use crate::cli::error::CliError;
use crate::cli::output::format_outline;
use std::path::PathBuf;

pub fn handle_inspect(file: Option<&PathBuf>, builtin: Option<&str>, object: Option<&str>) -> Result<(), CliError> {
    let model = resolve_model(file, builtin)?;
    if let Some(prefix) = object
        && !model.objects.keys().any(|name| name.starts_with(prefix))
    {
        return Err(CliError::InvalidArgument(format!(
            "{} has no object under {}",
            model.name, prefix
        )));
    }
    print!("{}", format_outline(&model, object));
    Ok(())
}
