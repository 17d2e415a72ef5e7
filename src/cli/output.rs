//! Output formatting for CLI

use crate::models::data_model::DataModel;
use crate::models::object::ObjectDef;
use crate::rpc::{ParameterFault, ParameterValueStruct};
use crate::validation::ValidationReport;

/// Format a validation report, one issue per line
pub fn format_report(source: &str, report: &ValidationReport) -> String {
    let mut output = String::new();
    if report.is_clean() {
        output.push_str(&format!("✅ {}: no issues\n", source));
        return output;
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    let marker = if errors > 0 { "❌" } else { "⚠️ " };
    output.push_str(&format!(
        "{} {}: {} error(s), {} warning(s)\n",
        marker, source, errors, warnings
    ));
    for issue in &report.issues {
        output.push_str(&format!("  - {}\n", issue));
    }
    output
}

/// Outline of a model's objects and parameters
///
/// With `filter`, only objects whose template starts with it are listed.
pub fn format_outline(model: &DataModel, filter: Option<&str>) -> String {
    let mut output = format!(
        "{} ({} objects, {} parameters)\n",
        model.name,
        model.objects.len(),
        model.parameter_count()
    );
    if let Some(spec) = model.specification {
        output.push_str(&format!("  defined in {} ({})\n", spec, spec.title()));
    }

    for object in model
        .objects()
        .filter(|o| filter.is_none_or(|f| o.name.starts_with(f)))
    {
        output.push_str(&format_object_line(object));
        for parameter in &object.parameters {
            let type_name = parameter
                .syntax
                .data_type
                .clone()
                .unwrap_or_else(|| parameter.syntax.base.to_string());
            let list = if parameter.syntax.is_list() { "[]" } else { "" };
            output.push_str(&format!(
                "    {:<40} {:<20} {}\n",
                parameter.name,
                format!("{}{}", type_name, list),
                parameter.access
            ));
        }
    }
    output
}

fn format_object_line(object: &ObjectDef) -> String {
    let mut line = format!("  {} [{}", object.name, object.access);
    if object.is_table() {
        line.push_str(&format!(", {}..{}", object.min_entries, object.max_entries));
    }
    if !object.unique_keys.is_empty() {
        let keys: Vec<String> = object
            .unique_keys
            .iter()
            .map(|k| k.parameters.join("+"))
            .collect();
        line.push_str(&format!(", keys: {}", keys.join(" | ")));
    }
    line.push_str("]\n");
    line
}

pub fn format_faults(faults: &[ParameterFault]) -> String {
    let mut output = format!("❌ SetParameterValues rejected ({} fault(s)):\n", faults.len());
    for fault in faults {
        output.push_str(&format!(
            "  - {} {}: {}\n",
            fault.fault_code, fault.parameter_name, fault.fault_string
        ));
    }
    output
}

pub fn format_values(values: &[ParameterValueStruct]) -> String {
    let mut output = String::new();
    for value in values {
        output.push_str(&format!(
            "{} = {} ({})\n",
            value.name,
            value.value,
            value.xsi_type.as_deref().unwrap_or("xsd:string")
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bundled_model;

    #[test]
    fn test_outline_filter() {
        let model = bundled_model("tr-181").unwrap();
        let outline = format_outline(&model, Some("Device.IP."));
        assert!(outline.starts_with("Device:2.11"));
        assert!(outline.contains("  Device.IP.Interface.{i}. [readWrite, 0..unbounded"));
        assert!(!outline.contains("Device.DeviceInfo."));
    }

    #[test]
    fn test_report_format() {
        let mut report = ValidationReport::new();
        assert!(format_report("a.xml", &report).contains("no issues"));
        report.warning("Device.Host.{i}.", "writable table has no unique key");
        let text = format_report("a.xml", &report);
        assert!(text.contains("0 error(s), 1 warning(s)"));
        assert!(text.contains("warning: Device.Host.{i}.: writable table has no unique key"));
    }
}
