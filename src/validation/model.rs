//! Consistency checks over a [`DataModel`]

use super::ValidationReport;
use super::input::{validate_name, validate_object_template};
use crate::models::data_model::DataModel;
use crate::models::object::{MaxEntries, ObjectDef};
use crate::models::parameter::ParameterDef;
use crate::models::types::{BaseType, Syntax};
use crate::value::{ParameterValue, compile_pattern};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Checks a data model for definitions a device tree could not honour
#[derive(Debug, Default)]
pub struct ModelValidator;

impl ModelValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, model: &DataModel) -> ValidationReport {
        let mut report = ValidationReport::new();
        if model.name.is_empty() {
            report.error("", "model has no name");
        }
        if model.root_objects().is_empty() {
            report.error(&model.name, "model defines no root object");
        }

        self.check_data_types(model, &mut report);
        for object in model.objects() {
            self.check_object(model, object, &mut report);
        }

        debug!(
            "Validated {}: {} error(s), {} warning(s)",
            model.name,
            report.errors().count(),
            report.warnings().count()
        );
        report
    }

    /// Unknown bases and derivation cycles, found with a strongly connected
    /// component pass over the base-type graph
    fn check_data_types(&self, model: &DataModel, report: &mut ValidationReport) {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for data_type in &model.data_types {
            if let Err(e) = validate_name(&data_type.name) {
                report.error(&data_type.name, e.to_string());
            }
            let node = *nodes
                .entry(data_type.name.as_str())
                .or_insert_with(|| graph.add_node(data_type.name.as_str()));
            if let Some(base) = data_type.base.as_deref().or(data_type.syntax.data_type.as_deref()) {
                if model.data_type(base).is_none() {
                    report.error(&data_type.name, format!("unknown base data type {}", base));
                    continue;
                }
                let target = *nodes.entry(base).or_insert_with(|| graph.add_node(base));
                graph.add_edge(node, target, ());
            }
        }

        let mut cyclic = HashSet::new();
        for component in tarjan_scc(&graph) {
            let self_loop = component.len() == 1 && graph.contains_edge(component[0], component[0]);
            if component.len() > 1 || self_loop {
                let mut names: Vec<&str> = component.iter().map(|n| graph[*n]).collect();
                names.sort_unstable();
                for name in &names {
                    cyclic.insert(*name);
                    report.error(*name, format!("data type derivation cycle: {}", names.join(" -> ")));
                }
            }
        }

        for data_type in &model.data_types {
            if !cyclic.contains(data_type.name.as_str()) {
                self.check_patterns(&data_type.name, &data_type.syntax, report);
            }
        }
    }

    fn check_object(&self, model: &DataModel, object: &ObjectDef, report: &mut ValidationReport) {
        let path = object.name.as_str();
        if let Err(e) = validate_object_template(path) {
            report.error(path, e.to_string());
            return;
        }

        if let Some(parent) = object.parent_template()
            && model.object(&parent).is_none()
        {
            report.error(path, format!("parent object {} is not defined", parent));
        }

        if object.is_table() {
            if let Some(max) = object.max_entries.limit()
                && object.min_entries > max
            {
                report.error(
                    path,
                    format!("minEntries {} exceeds maxEntries {}", object.min_entries, max),
                );
            }
            if object.max_entries == MaxEntries::Bounded(0) {
                report.error(path, "maxEntries must be at least 1");
            }
        } else if object.min_entries != 1 || object.max_entries != MaxEntries::Bounded(1) {
            report.error(
                path,
                format!(
                    "single-instance object has {}..{} entries; tables must end in {{i}}.",
                    object.min_entries, object.max_entries
                ),
            );
        }

        let mut seen = HashSet::new();
        for parameter in &object.parameters {
            if !seen.insert(parameter.name.as_str()) {
                report.error(format!("{}{}", path, parameter.name), "duplicate parameter name");
            }
            self.check_parameter(model, object, parameter, report);
        }

        self.check_unique_keys(object, report);
        self.check_table_parameters(model, object, report);
    }

    fn check_parameter(
        &self,
        model: &DataModel,
        object: &ObjectDef,
        parameter: &ParameterDef,
        report: &mut ValidationReport,
    ) {
        let path = format!("{}{}", object.name, parameter.name);
        if let Err(e) = validate_name(&parameter.name) {
            report.error(&path, e.to_string());
        }

        let syntax = match model.effective_syntax(&parameter.syntax) {
            Ok(syntax) => syntax,
            Err(e) => {
                report.error(&path, e.to_string());
                return;
            }
        };
        if !self.check_patterns(&path, &syntax, report) {
            return;
        }

        if let Some(default) = syntax.default.as_deref()
            && let Err(e) = ParameterValue::parse_with_syntax(&syntax, default)
        {
            report.error(&path, format!("default '{}' is invalid: {}", default, e));
        }
        if !syntax.ranges.is_empty() && !syntax.base.is_numeric() {
            report.warning(&path, format!("range facet on non-numeric type {}", syntax.base.xml_name()));
        }
    }

    /// Returns false when any pattern fails to compile
    fn check_patterns(&self, path: &str, syntax: &Syntax, report: &mut ValidationReport) -> bool {
        let mut ok = true;
        for pattern in &syntax.patterns {
            if let Err(e) = compile_pattern(pattern) {
                report.error(path, format!("pattern '{}' does not compile: {}", pattern, e));
                ok = false;
            }
        }
        ok
    }

    fn check_unique_keys(&self, object: &ObjectDef, report: &mut ValidationReport) {
        if !object.unique_keys.is_empty() && !object.is_table() {
            report.warning(&object.name, "unique keys on a single-instance object have no effect");
        }
        for key in &object.unique_keys {
            if key.parameters.is_empty() {
                report.error(&object.name, "unique key lists no parameters");
            }
            for name in &key.parameters {
                if object.parameter(name).is_none() {
                    report.error(&object.name, format!("unique key parameter {} is not defined", name));
                }
            }
        }
        if object.is_table() && object.access.is_writable() && object.unique_keys.is_empty() {
            report.warning(&object.name, "writable table has no unique key");
        }
    }

    fn check_table_parameters(&self, model: &DataModel, object: &ObjectDef, report: &mut ValidationReport) {
        if let Some(counter) = object.num_entries_parameter.as_deref() {
            let parameter = object
                .parent_template()
                .and_then(|parent| model.object(&parent))
                .and_then(|parent| parent.parameter(counter));
            match parameter {
                _ if !object.is_table() => {
                    report.error(&object.name, "numEntriesParameter on a single-instance object");
                }
                None => report.error(
                    &object.name,
                    format!("numEntriesParameter {} is not defined in the parent object", counter),
                ),
                Some(p) if self.base_of(model, &p.syntax) != Some(BaseType::UnsignedInt) => report.error(
                    &object.name,
                    format!("numEntriesParameter {} must be an unsignedInt", counter),
                ),
                Some(_) => {}
            }
        }

        if let Some(enable) = object.enable_parameter.as_deref() {
            match object.parameter(enable) {
                None => report.error(&object.name, format!("enableParameter {} is not defined", enable)),
                Some(p) if self.base_of(model, &p.syntax) != Some(BaseType::Boolean) => report.error(
                    &object.name,
                    format!("enableParameter {} must be a boolean", enable),
                ),
                Some(_) => {}
            }
        }
    }

    fn base_of(&self, model: &DataModel, syntax: &Syntax) -> Option<BaseType> {
        model.effective_syntax(syntax).ok().map(|s| s.base)
    }
}
