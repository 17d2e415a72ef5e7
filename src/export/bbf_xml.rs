//! BBF DM XML exporter
//!
//! Writes a flattened `dm:document`: every object is emitted with its full
//! definition, so the output imports without its base model.

use crate::export::{ExportError, ExportResult};
use crate::models::data_model::DataModel;
use crate::models::object::ObjectDef;
use crate::models::parameter::{ParameterDef, Status};
use crate::models::types::{DataTypeDef, ListConstraint, SizeRange, Syntax};
use quick_xml::escape::escape;

const DM_NAMESPACE: &str = "urn:broadband-forum-org:cwmp:datamodel-1-8";

/// Exporter for Broadband Forum DM XML
pub struct BbfXmlExporter;

impl BbfXmlExporter {
    pub fn export(model: &DataModel) -> Result<ExportResult, ExportError> {
        Self::export_models(std::slice::from_ref(model))
    }

    /// Export several models into one document. Data types are written once
    /// at document level, which makes them visible to every model on import.
    pub fn export_models(models: &[DataModel]) -> Result<ExportResult, ExportError> {
        if let Some(unnamed) = models.iter().position(|m| m.name.is_empty()) {
            return Err(ExportError::ValidationError(format!(
                "Model #{} has no name",
                unnamed + 1
            )));
        }

        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!("<dm:document xmlns:dm=\"{}\">\n", DM_NAMESPACE));

        let mut written: Vec<&str> = Vec::new();
        for data_type in models.iter().flat_map(|m| m.data_types.iter()) {
            if !written.contains(&data_type.name.as_str()) {
                written.push(&data_type.name);
                write_data_type(&mut xml, data_type);
            }
        }

        for model in models {
            xml.push_str(&format!("  <model name=\"{}\">\n", escape(model.name.as_str())));
            write_description(&mut xml, &model.description, 4);
            for object in model.objects() {
                write_object(&mut xml, object);
            }
            xml.push_str("  </model>\n");
        }
        xml.push_str("</dm:document>\n");

        Ok(ExportResult {
            content: xml,
            format: "bbf-xml".to_string(),
        })
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(depth)
}

fn write_description(xml: &mut String, description: &str, depth: usize) {
    if !description.is_empty() {
        xml.push_str(&format!(
            "{}<description>{}</description>\n",
            indent(depth),
            escape(description)
        ));
    }
}

fn write_data_type(xml: &mut String, data_type: &DataTypeDef) {
    xml.push_str(&format!("  <dataType name=\"{}\"", escape(data_type.name.as_str())));
    if let Some(base) = &data_type.base {
        xml.push_str(&format!(" base=\"{}\"", escape(base.as_str())));
    }
    xml.push_str(">\n");
    write_description(xml, &data_type.description, 4);
    if let Some(list) = &data_type.syntax.list {
        write_list(xml, list, 4);
    }
    if data_type.base.is_some() {
        write_facets(xml, &data_type.syntax, 4);
    } else {
        xml.push_str(&format!("    <{}>\n", data_type.syntax.base.xml_name()));
        write_facets(xml, &data_type.syntax, 6);
        xml.push_str(&format!("    </{}>\n", data_type.syntax.base.xml_name()));
    }
    xml.push_str("  </dataType>\n");
}

fn write_object(xml: &mut String, object: &ObjectDef) {
    xml.push_str(&format!(
        "    <object name=\"{}\" access=\"{}\" minEntries=\"{}\" maxEntries=\"{}\"",
        escape(object.name.as_str()),
        object.access,
        object.min_entries,
        object.max_entries
    ));
    if let Some(counter) = &object.num_entries_parameter {
        xml.push_str(&format!(" numEntriesParameter=\"{}\"", escape(counter.as_str())));
    }
    if let Some(enable) = &object.enable_parameter {
        xml.push_str(&format!(" enableParameter=\"{}\"", escape(enable.as_str())));
    }
    write_status(xml, object.status);
    xml.push_str(">\n");

    write_description(xml, &object.description, 6);
    for key in &object.unique_keys {
        if key.functional {
            xml.push_str("      <uniqueKey>");
        } else {
            xml.push_str("      <uniqueKey functional=\"false\">");
        }
        for parameter in &key.parameters {
            xml.push_str(&format!("<parameter ref=\"{}\"/>", escape(parameter.as_str())));
        }
        xml.push_str("</uniqueKey>\n");
    }
    for parameter in &object.parameters {
        write_parameter(xml, parameter);
    }
    xml.push_str("    </object>\n");
}

fn write_status(xml: &mut String, status: Status) {
    if !status.is_current() {
        xml.push_str(&format!(" status=\"{}\"", status.as_str()));
    }
}

fn write_parameter(xml: &mut String, parameter: &ParameterDef) {
    xml.push_str(&format!(
        "      <parameter name=\"{}\" access=\"{}\"",
        escape(parameter.name.as_str()),
        parameter.access
    ));
    if !parameter.active_notify.is_normal() {
        xml.push_str(&format!(" activeNotify=\"{}\"", parameter.active_notify));
    }
    if parameter.forced_inform {
        xml.push_str(" forcedInform=\"true\"");
    }
    write_status(xml, parameter.status);
    xml.push_str(">\n");
    write_description(xml, &parameter.description, 8);
    write_syntax(xml, &parameter.syntax);
    xml.push_str("      </parameter>\n");
}

fn write_syntax(xml: &mut String, syntax: &Syntax) {
    if syntax.hidden {
        xml.push_str("        <syntax hidden=\"true\">\n");
    } else {
        xml.push_str("        <syntax>\n");
    }
    if let Some(list) = &syntax.list {
        write_list(xml, list, 10);
    }

    let (element, reference) = match &syntax.data_type {
        Some(name) => ("dataType", format!(" ref=\"{}\"", escape(name.as_str()))),
        None => (syntax.base.xml_name(), String::new()),
    };
    let mut facets = String::new();
    write_facets(&mut facets, syntax, 12);
    if facets.is_empty() {
        xml.push_str(&format!("          <{}{}/>\n", element, reference));
    } else {
        xml.push_str(&format!("          <{}{}>\n", element, reference));
        xml.push_str(&facets);
        xml.push_str(&format!("          </{}>\n", element));
    }

    if let Some(default) = &syntax.default {
        xml.push_str(&format!(
            "          <default type=\"object\" value=\"{}\"/>\n",
            escape(default.as_str())
        ));
    }
    xml.push_str("        </syntax>\n");
}

fn write_list(xml: &mut String, list: &ListConstraint, depth: usize) {
    xml.push_str(&format!("{}<list", indent(depth)));
    if let Some(min) = list.min_items {
        xml.push_str(&format!(" minItems=\"{}\"", min));
    }
    if let Some(max) = list.max_items {
        xml.push_str(&format!(" maxItems=\"{}\"", max));
    }
    match &list.size {
        Some(size) => {
            xml.push_str(">");
            write_size(xml, size, 0);
            xml.push_str("</list>\n");
        }
        None => xml.push_str("/>\n"),
    }
}

fn write_size(xml: &mut String, size: &SizeRange, depth: usize) {
    xml.push_str(&format!("{}<size", indent(depth)));
    if let Some(min) = size.min_length {
        xml.push_str(&format!(" minLength=\"{}\"", min));
    }
    if let Some(max) = size.max_length {
        xml.push_str(&format!(" maxLength=\"{}\"", max));
    }
    xml.push_str("/>");
}

/// Facet elements of a syntax, each on its own line
fn write_facets(xml: &mut String, syntax: &Syntax, depth: usize) {
    let pad = indent(depth);
    for size in &syntax.sizes {
        write_size(xml, size, depth);
        xml.push('\n');
    }
    for range in &syntax.ranges {
        xml.push_str(&format!("{}<range", pad));
        if let Some(min) = range.min_inclusive {
            xml.push_str(&format!(" minInclusive=\"{}\"", min));
        }
        if let Some(max) = range.max_inclusive {
            xml.push_str(&format!(" maxInclusive=\"{}\"", max));
        }
        if let Some(step) = range.step {
            xml.push_str(&format!(" step=\"{}\"", step));
        }
        xml.push_str("/>\n");
    }
    for pattern in &syntax.patterns {
        xml.push_str(&format!("{}<pattern value=\"{}\"/>\n", pad, escape(pattern.as_str())));
    }
    for value in &syntax.enumerations {
        xml.push_str(&format!("{}<enumeration value=\"{}\"/>\n", pad, escape(value.as_str())));
    }
    if let Some(units) = &syntax.units {
        xml.push_str(&format!("{}<units value=\"{}\"/>\n", pad, escape(units.as_str())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::BbfXmlImporter;
    use crate::models::{
        Access, ActiveNotify, BaseType, MaxEntries, UniqueKey, bundled_model,
    };

    #[test]
    fn test_bundled_models_round_trip() {
        for name in crate::models::BUNDLED_MODELS {
            let model = bundled_model(name).unwrap();
            let exported = BbfXmlExporter::export(&model).unwrap();
            assert_eq!(exported.format, "bbf-xml");
            let reimported = BbfXmlImporter::new()
                .import(&exported.content)
                .unwrap()
                .into_single_model()
                .unwrap();
            assert_eq!(reimported, model, "{} changed on round trip", name);
        }
    }

    #[test]
    fn test_metadata_survives_export() {
        let model = DataModel::new("Device:2.11")
            .with_data_type(DataTypeDef::derived(
                "Percent",
                "Counter",
                Syntax::default().with_range(Some(0), Some(100)),
            ))
            .with_data_type(DataTypeDef::new("Counter", Syntax::new(BaseType::UnsignedInt)))
            .with_object(ObjectDef::new("Device.").with_parameter(ParameterDef::new(
                "HostNumberOfEntries",
                BaseType::UnsignedInt,
            )))
            .with_object(
                ObjectDef::table("Device.Host.{i}.")
                    .with_access(Access::ReadWrite)
                    .with_entries(0, MaxEntries::Bounded(32))
                    .with_num_entries_parameter("HostNumberOfEntries")
                    .with_enable_parameter("Enable")
                    .with_unique_key(UniqueKey::functional(["Name"]))
                    .with_description("Known hosts <LAN & WLAN>")
                    .with_status(Status::Deprecated)
                    .with_parameter(ParameterDef::new("Enable", BaseType::Boolean).writable())
                    .with_parameter(
                        ParameterDef::with_syntax_of("Name", Syntax::new(BaseType::String).with_max_length(16))
                            .writable()
                            .with_forced_inform(true),
                    )
                    .with_parameter(
                        ParameterDef::with_syntax_of("Load", Syntax::of_data_type("Percent").with_units("%"))
                            .with_active_notify(ActiveNotify::ForceEnabled),
                    )
                    .with_parameter(ParameterDef::with_syntax_of(
                        "Key",
                        Syntax::new(BaseType::HexBinary).hidden().with_default(""),
                    )),
            );

        let exported = BbfXmlExporter::export(&model).unwrap();
        assert!(exported.content.contains("Known hosts &lt;LAN &amp; WLAN&gt;"));
        let reimported = BbfXmlImporter::new()
            .import(&exported.content)
            .unwrap()
            .into_single_model()
            .unwrap();
        assert_eq!(reimported, model);
    }

    #[test]
    fn test_unnamed_model_rejected() {
        let result = BbfXmlExporter::export(&DataModel::default());
        assert!(matches!(result, Err(ExportError::ValidationError(_))));
    }
}
