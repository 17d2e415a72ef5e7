//! Consistency checks over a populated [`DeviceTree`]
//!
//! The tree enforces most rules as values are written; this pass catches
//! state that arrived another way (snapshots, relaxed configs, internal
//! writes with unique key checks disabled).

use super::ValidationReport;
use crate::models::object::{ObjectDef, UniqueKey};
use crate::path::ParameterPath;
use crate::tree::DeviceTree;
use crate::value::ParameterValue;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TreeValidator;

impl TreeValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, tree: &DeviceTree) -> ValidationReport {
        let mut report = ValidationReport::new();
        let model = tree.model();

        for collection in tree.collections() {
            let table = match model.table_for_collection(&collection) {
                Ok(table) => table,
                Err(e) => {
                    report.error(&collection, e.to_string());
                    continue;
                }
            };
            let rows = tree.rows(&collection);
            self.check_cardinality(&collection, table, rows.len(), &mut report);
            self.check_counter(tree, &collection, table, rows.len(), &mut report);
            for key in &table.unique_keys {
                self.check_unique_key(tree, &collection, table, key, &rows, &mut report);
            }
        }

        for object_path in tree.object_paths() {
            let Ok(object) = model.object_for_path(&object_path) else {
                report.error(&object_path, "instance has no object definition");
                continue;
            };
            for parameter in &object.parameters {
                let path = format!("{}{}", object_path, parameter.name);
                let Ok(value) = tree.value(&path) else {
                    report.error(&path, "parameter missing from instance");
                    continue;
                };
                if matches!(value, ParameterValue::String(s) if s.is_empty()) {
                    continue;
                }
                match model.effective_syntax(&parameter.syntax) {
                    Ok(syntax) => {
                        if let Err(e) = value.validate(&syntax) {
                            report.error(&path, e.to_string());
                        }
                    }
                    Err(e) => report.error(&path, e.to_string()),
                }
            }
        }

        report
    }

    fn check_cardinality(&self, collection: &str, table: &ObjectDef, count: usize, report: &mut ValidationReport) {
        if count < table.min_entries as usize {
            report.error(
                collection,
                format!("{} row(s), at least {} required", count, table.min_entries),
            );
        }
        if !table.max_entries.allows(count) {
            report.error(
                collection,
                format!("{} row(s), at most {} allowed", count, table.max_entries),
            );
        }
    }

    fn check_counter(
        &self,
        tree: &DeviceTree,
        collection: &str,
        table: &ObjectDef,
        count: usize,
        report: &mut ValidationReport,
    ) {
        let Some(counter) = table.num_entries_parameter.as_deref() else {
            return;
        };
        let Some(parent) = ParameterPath::parse(collection).ok().and_then(|p| p.parent()) else {
            return;
        };
        let path = format!("{}{}", parent, counter);
        match tree.value(&path) {
            Ok(ParameterValue::UnsignedInt(n)) if *n as usize == count => {}
            Ok(other) => report.error(&path, format!("reads {} but {} holds {} row(s)", other, collection, count)),
            Err(_) => report.error(&path, "NumberOfEntries parameter missing"),
        }
    }

    /// Functional key clashes among enabled rows are errors; clashes on
    /// non-functional keys are warnings
    fn check_unique_key(
        &self,
        tree: &DeviceTree,
        collection: &str,
        table: &ObjectDef,
        key: &UniqueKey,
        rows: &[u32],
        report: &mut ValidationReport,
    ) {
        let mut owners: HashMap<Vec<String>, u32> = HashMap::new();
        for row in rows {
            let row_path = format!("{}{}.", collection, row);
            if key.functional
                && let Some(enable) = table.enable_parameter.as_deref()
                && !matches!(
                    tree.value(&format!("{}{}", row_path, enable)),
                    Ok(ParameterValue::Boolean(true))
                )
            {
                continue;
            }

            let tuple: Vec<String> = key
                .parameters
                .iter()
                .map(|name| {
                    tree.value(&format!("{}{}", row_path, name))
                        .map(ParameterValue::to_cwmp_string)
                        .unwrap_or_default()
                })
                .collect();
            if tuple.iter().all(String::is_empty) {
                continue;
            }

            if let Some(first) = owners.get(&tuple) {
                let message = format!(
                    "unique key ({}) = ({}) also used by {}{}.",
                    key.parameters.join(", "),
                    tuple.join(", "),
                    collection,
                    first
                );
                if key.functional {
                    report.error(&row_path, message);
                } else {
                    report.warning(&row_path, message);
                }
            } else {
                owners.insert(tuple, *row);
            }
        }
    }
}
