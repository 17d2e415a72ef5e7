//! Validate command implementation

use super::import_file;
use crate::cli::error::CliError;
use crate::cli::output::format_report;
use crate::models::data_model::DataModel;
use crate::validation::{ModelValidator, ValidationReport};
use std::path::PathBuf;

/// Handle the validate command
///
/// Files are imported in the order given; later XML files may extend models
/// from earlier ones. Fails when any file has an error-level issue.
pub fn handle_validate(files: &[PathBuf]) -> Result<(), CliError> {
    let mut loaded: Vec<DataModel> = Vec::new();
    let mut failed = 0;

    for file in files {
        let source = file.display().to_string();
        let result = match import_file(file, &loaded) {
            Ok(result) => result,
            Err(e) => {
                println!("❌ {}: {}", source, e);
                failed += 1;
                continue;
            }
        };

        let mut report = ValidationReport::new();
        for warning in &result.errors {
            report.warning(&source, warning.to_string());
        }
        for model in &result.models {
            report.merge(ModelValidator::new().validate(model));
        }
        print!("{}", format_report(&source, &report));
        if report.has_errors() {
            failed += 1;
        }
        loaded.extend(result.models);
    }

    if failed > 0 {
        return Err(CliError::ValidationError(format!("{} of {} file(s) failed", failed, files.len())));
    }
    println!("Validation successful");
    Ok(())
}
