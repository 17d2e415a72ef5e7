//! Broadband Forum DM XML importer
//!
//! Reads `dm:document` files (TR-106 data model schema) into [`DataModel`]s.
//! Only the parts a device tree needs are kept: data types, objects,
//! parameters, syntax facets, unique keys and descriptions. Profiles,
//! components and bibliographies are skipped with a warning.

use super::xml::{XmlElement, parse_document};
use super::{ImportError, ImportResult};
use crate::models::data_model::DataModel;
use crate::models::object::{MaxEntries, ObjectDef, UniqueKey};
use crate::models::parameter::{Access, ActiveNotify, ParameterDef, Status};
use crate::models::types::{BaseType, DataTypeDef, ListConstraint, SizeRange, Syntax, ValueRange};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Elements that carry no model content and are skipped silently
const IGNORED_ELEMENTS: &[&str] = &["description", "import", "annotation"];

/// Importer for BBF DM XML documents
///
/// # Example
///
/// ```rust
/// use cwmp_data_model::import::BbfXmlImporter;
///
/// let xml = r#"<dm:document xmlns:dm="urn:broadband-forum-org:cwmp:datamodel-1-8">
///   <model name="Device:2.11">
///     <object name="Device." access="readOnly" minEntries="1" maxEntries="1">
///       <parameter name="RootDataModelVersion" access="readOnly">
///         <syntax><string><size maxLength="32"/></string></syntax>
///       </parameter>
///     </object>
///   </model>
/// </dm:document>"#;
///
/// let model = BbfXmlImporter::new().import(xml).unwrap().into_single_model().unwrap();
/// assert_eq!(model.name, "Device:2.11");
/// assert_eq!(model.parameter_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct BbfXmlImporter {
    /// Models that `base` attributes may refer to, from other documents
    base_models: Vec<DataModel>,
}

impl BbfXmlImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_models(mut self, models: impl IntoIterator<Item = DataModel>) -> Self {
        self.base_models.extend(models);
        self
    }

    /// Parse a document. Structural problems fail the import; unknown
    /// elements and unparsable attribute values are reported in
    /// [`ImportResult::errors`].
    pub fn import(&self, xml: &str) -> Result<ImportResult, ImportError> {
        let root = parse_document(xml)?;
        if root.name != "document" {
            return Err(ImportError::ParseError(format!(
                "Expected a dm:document root element, found <{}>",
                root.name
            )));
        }

        let mut result = ImportResult::default();
        let mut data_types = Vec::new();
        let mut models: Vec<DataModel> = Vec::new();

        for element in &root.children {
            match element.name.as_str() {
                "dataType" => data_types.push(self.parse_data_type(element, &mut result)?),
                "model" => {
                    let model = self.parse_model(element, &data_types, &models, &mut result)?;
                    info!(
                        "Imported model {} ({} objects, {} parameters)",
                        model.name,
                        model.objects.len(),
                        model.parameter_count()
                    );
                    models.push(model);
                }
                name if IGNORED_ELEMENTS.contains(&name) => {}
                other => note(&mut result, format!("Ignoring <{}> in document", other)),
            }
        }

        if models.is_empty() {
            note(&mut result, "Document defines no model".to_string());
        }
        result.models = models;
        Ok(result)
    }

    fn parse_data_type(&self, element: &XmlElement, result: &mut ImportResult) -> Result<DataTypeDef, ImportError> {
        let name = required(element, "name")?;
        let mut syntax = Syntax::default();
        self.parse_type_content(element, &mut syntax, result);

        let mut data_type = DataTypeDef::new(name, syntax);
        data_type.base = element.attr("base").map(str::to_string);
        data_type.description = description_of(element);
        debug!("Parsed data type {}", data_type.name);
        Ok(data_type)
    }

    fn parse_model(
        &self,
        element: &XmlElement,
        data_types: &[DataTypeDef],
        earlier: &[DataModel],
        result: &mut ImportResult,
    ) -> Result<DataModel, ImportError> {
        let name = required(element, "name")?;
        let mut model = DataModel::new(name);
        model.description = description_of(element);

        if let Some(base) = element.attr("base") {
            let base_model = earlier
                .iter()
                .chain(self.base_models.iter())
                .find(|m| m.name == base)
                .ok_or_else(|| ImportError::NotFound(format!("base model {} of {}", base, name)))?;
            model.merge_from(base_model);
        }
        for data_type in data_types {
            model.add_data_type(data_type.clone());
        }

        for child in &element.children {
            match child.name.as_str() {
                "object" => self.apply_object(&mut model, child, result)?,
                "parameter" => note(result, format!("Ignoring top-level parameter in model {}", name)),
                name if IGNORED_ELEMENTS.contains(&name) => {}
                other => note(result, format!("Ignoring <{}> in model {}", other, model.name)),
            }
        }
        Ok(model)
    }

    /// Add a new object (`name=`) or modify an inherited one (`base=`)
    fn apply_object(
        &self,
        model: &mut DataModel,
        element: &XmlElement,
        result: &mut ImportResult,
    ) -> Result<(), ImportError> {
        let (mut object, is_new) = match (element.attr("name"), element.attr("base")) {
            (Some(name), _) => (ObjectDef::new(name), true),
            (None, Some(base)) => {
                let existing = model
                    .object(base)
                    .cloned()
                    .ok_or_else(|| ImportError::ValidationError(format!("Object base {} is not defined", base)))?;
                (existing, false)
            }
            (None, None) => {
                return Err(ImportError::ParseError("<object> needs a name or base attribute".to_string()));
            }
        };

        if let Some(access) = element.attr("access") {
            object.access = parse_attr(access, "access", &object.name, result).unwrap_or(object.access);
        }
        if let Some(min) = element.attr("minEntries") {
            object.min_entries = parse_attr(min, "minEntries", &object.name, result).unwrap_or(object.min_entries);
        }
        if let Some(max) = element.attr("maxEntries") {
            object.max_entries =
                parse_attr::<MaxEntries>(max, "maxEntries", &object.name, result).unwrap_or(object.max_entries);
        }
        if let Some(counter) = element.attr("numEntriesParameter") {
            object.num_entries_parameter = Some(counter.to_string());
        }
        if let Some(enable) = element.attr("enableParameter") {
            object.enable_parameter = Some(enable.to_string());
        }
        if let Some(status) = element.attr("status") {
            object.status = parse_attr(status, "status", &object.name, result).unwrap_or(object.status);
        }
        if is_new && element.attr("minEntries").is_none() && element.attr("maxEntries").is_none() && object.is_table()
        {
            object.min_entries = 0;
            object.max_entries = MaxEntries::Unbounded;
        }

        let description = description_of(element);
        if !description.is_empty() {
            object.description = description;
        }

        for child in &element.children {
            match child.name.as_str() {
                "parameter" => self.apply_parameter(&mut object, child, result)?,
                "uniqueKey" => {
                    let functional = child.attr("functional").is_none_or(|f| f == "true");
                    let parameters: Vec<&str> = child.children_named("parameter").filter_map(|p| p.attr("ref")).collect();
                    object.unique_keys.push(if functional {
                        UniqueKey::functional(parameters)
                    } else {
                        UniqueKey::non_functional(parameters)
                    });
                }
                name if IGNORED_ELEMENTS.contains(&name) => {}
                other => note(result, format!("Ignoring <{}> in object {}", other, object.name)),
            }
        }

        model.add_object(object);
        Ok(())
    }

    fn apply_parameter(
        &self,
        object: &mut ObjectDef,
        element: &XmlElement,
        result: &mut ImportResult,
    ) -> Result<(), ImportError> {
        let mut parameter = match (element.attr("name"), element.attr("base")) {
            (Some(name), _) => ParameterDef::new(name, BaseType::String),
            (None, Some(base)) => object.parameter(base).cloned().ok_or_else(|| {
                ImportError::ValidationError(format!("Parameter base {}{} is not defined", object.name, base))
            })?,
            (None, None) => {
                return Err(ImportError::ParseError(format!(
                    "<parameter> in {} needs a name or base attribute",
                    object.name
                )));
            }
        };
        let path = format!("{}{}", object.name, parameter.name);

        if let Some(access) = element.attr("access") {
            parameter.access = parse_attr::<Access>(access, "access", &path, result).unwrap_or(parameter.access);
        }
        if let Some(notify) = element.attr("activeNotify") {
            parameter.active_notify =
                parse_attr::<ActiveNotify>(notify, "activeNotify", &path, result).unwrap_or(parameter.active_notify);
        }
        if let Some(forced) = element.attr("forcedInform") {
            parameter.forced_inform = forced == "true";
        }
        if let Some(status) = element.attr("status") {
            parameter.status = parse_attr::<Status>(status, "status", &path, result).unwrap_or(parameter.status);
        }

        let description = description_of(element);
        if !description.is_empty() {
            parameter.description = description;
        }

        match element.child("syntax") {
            Some(syntax) => parameter.syntax = self.parse_syntax(syntax, &path, result),
            None if element.attr("name").is_some() => {
                note(result, format!("Parameter {} has no syntax; assuming string", path));
            }
            None => {}
        }

        object.upsert_parameter(parameter);
        Ok(())
    }

    fn parse_syntax(&self, element: &XmlElement, path: &str, result: &mut ImportResult) -> Syntax {
        let mut syntax = Syntax {
            hidden: element.attr("hidden") == Some("true"),
            ..Syntax::default()
        };

        for child in &element.children {
            match child.name.as_str() {
                "list" => {
                    let list = ListConstraint {
                        min_items: child.attr("minItems").and_then(|v| v.parse().ok()),
                        max_items: child
                            .attr("maxItems")
                            .filter(|v| *v != "unbounded")
                            .and_then(|v| v.parse().ok()),
                        size: child.child("size").map(parse_size),
                    };
                    syntax.list = Some(list);
                }
                "default" => {
                    if matches!(child.attr("type"), None | Some("object") | Some("factory")) {
                        syntax.default = child.attr("value").map(str::to_string);
                    }
                }
                "dataType" => {
                    syntax.data_type = child.attr("ref").or(child.attr("base")).map(str::to_string);
                    self.parse_facets(child, &mut syntax, path, result);
                }
                "units" => syntax.units = child.attr("value").map(str::to_string),
                name => match BaseType::from_xml_name(name) {
                    Some(base) => {
                        syntax.base = base;
                        self.parse_facets(child, &mut syntax, path, result);
                    }
                    None if IGNORED_ELEMENTS.contains(&name) => {}
                    None => note(result, format!("Ignoring <{}> in syntax of {}", name, path)),
                },
            }
        }
        syntax
    }

    /// Content of a `dataType` element: either a base type element holding
    /// facets, or facets directly when the type restricts another
    fn parse_type_content(&self, element: &XmlElement, syntax: &mut Syntax, result: &mut ImportResult) {
        let name = element.attr("name").unwrap_or_default().to_string();
        for child in &element.children {
            if let Some(base) = BaseType::from_xml_name(&child.name) {
                syntax.base = base;
                self.parse_facets(child, syntax, &name, result);
            } else if child.name == "list" {
                syntax.list = Some(ListConstraint {
                    min_items: child.attr("minItems").and_then(|v| v.parse().ok()),
                    max_items: child.attr("maxItems").and_then(|v| v.parse().ok()),
                    size: child.child("size").map(parse_size),
                });
            }
        }
        self.parse_facets(element, syntax, &name, result);
    }

    fn parse_facets(&self, element: &XmlElement, syntax: &mut Syntax, path: &str, result: &mut ImportResult) {
        for facet in &element.children {
            match facet.name.as_str() {
                "size" => syntax.sizes.push(parse_size(facet)),
                "range" => {
                    let bound = |name: &str| -> Option<i128> {
                        let raw = facet.attr(name)?;
                        match raw.parse() {
                            Ok(v) => Some(v),
                            Err(_) => {
                                warn!("Ignoring {}=\"{}\" on {}", name, raw, path);
                                None
                            }
                        }
                    };
                    let mut range = ValueRange::new(bound("minInclusive"), bound("maxInclusive"));
                    if let Some(step) = bound("step") {
                        range = range.with_step(step);
                    }
                    syntax.ranges.push(range);
                }
                "pattern" => {
                    if let Some(value) = facet.attr("value") {
                        syntax.patterns.push(value.to_string());
                    }
                }
                "enumeration" => {
                    if let Some(value) = facet.attr("value") {
                        syntax.enumerations.push(value.to_string());
                    }
                }
                "units" => syntax.units = facet.attr("value").map(str::to_string),
                "pathRef" | "instanceRef" | "enumerationRef" => {
                    debug!("Skipping reference facet <{}> on {}", facet.name, path);
                }
                name if IGNORED_ELEMENTS.contains(&name) => {}
                name if BaseType::from_xml_name(name).is_some() || name == "list" => {}
                other => note(result, format!("Ignoring facet <{}> on {}", other, path)),
            }
        }
    }
}

fn parse_size(element: &XmlElement) -> SizeRange {
    SizeRange::new(
        element.attr("minLength").and_then(|v| v.parse().ok()),
        element.attr("maxLength").and_then(|v| v.parse().ok()),
    )
}

fn required<'a>(element: &'a XmlElement, name: &str) -> Result<&'a str, ImportError> {
    element
        .attr(name)
        .ok_or_else(|| ImportError::ParseError(format!("<{}> is missing the {} attribute", element.name, name)))
}

fn description_of(element: &XmlElement) -> String {
    element
        .child("description")
        .map(|d| d.text().to_string())
        .unwrap_or_default()
}

fn parse_attr<T: FromStr>(raw: &str, attribute: &str, owner: &str, result: &mut ImportResult) -> Option<T> {
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            note(result, format!("Invalid {}=\"{}\" on {}", attribute, raw, owner));
            None
        }
    }
}

fn note(result: &mut ImportResult, message: String) {
    warn!("{}", message);
    result.errors.push(ImportError::ParseError(message));
}
