//! CWMP parameter list importer
//!
//! Accepts a bare `ParameterList`, a single RPC body such as
//! `cwmp:SetParameterValues`, or a whole SOAP envelope. Namespace prefixes
//! are ignored, so documents from ACSs using `cwmp:`, `ns1:` or no prefix
//! all parse the same way.

use super::ImportError;
use super::xml::{XmlElement, parse_document};
use crate::rpc::ParameterValueStruct;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters carried by an RPC or a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterList {
    /// Local name of the RPC element, when the input held one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ParameterValueStruct>,
    /// Entries of a `ParameterNames` string array (GetParameterValues)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

/// Importer for CWMP `ParameterValueStruct` arrays
///
/// # Example
///
/// ```rust
/// use cwmp_data_model::import::ParameterListImporter;
///
/// let xml = r#"<cwmp:SetParameterValues xmlns:cwmp="urn:dslforum-org:cwmp-1-2">
///   <ParameterList>
///     <ParameterValueStruct>
///       <Name>Device.ManagementServer.PeriodicInformInterval</Name>
///       <Value xsi:type="xsd:unsignedInt">300</Value>
///     </ParameterValueStruct>
///   </ParameterList>
///   <ParameterKey>cfg-7</ParameterKey>
/// </cwmp:SetParameterValues>"#;
///
/// let list = ParameterListImporter::new().import(xml).unwrap();
/// assert_eq!(list.parameter_key.as_deref(), Some("cfg-7"));
/// assert_eq!(list.values[0].value, "300");
/// assert_eq!(list.values[0].xsi_type.as_deref(), Some("xsd:unsignedInt"));
/// ```
#[derive(Debug, Default)]
pub struct ParameterListImporter;

impl ParameterListImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import(&self, xml: &str) -> Result<ParameterList, ImportError> {
        let root = parse_document(xml)?;
        let body = match root.name.as_str() {
            "Envelope" => root
                .child("Body")
                .and_then(|b| b.children.first())
                .ok_or_else(|| ImportError::ParseError("SOAP envelope has an empty Body".to_string()))?,
            _ => &root,
        };

        if body.name == "Fault" {
            return Err(ImportError::ValidationError(format!(
                "Document is a SOAP fault: {}",
                body.find("FaultString").map(XmlElement::text).unwrap_or_default()
            )));
        }

        let mut list = ParameterList {
            method: (body.name != "ParameterList" && body.name != "ParameterNames").then(|| body.name.clone()),
            parameter_key: body.child("ParameterKey").map(|k| k.text().to_string()),
            ..ParameterList::default()
        };

        if let Some(values) = body.find("ParameterList") {
            for entry in values.children_named("ParameterValueStruct") {
                list.values.push(parse_value_struct(entry)?);
            }
        }
        if let Some(names) = body.find("ParameterNames") {
            list.names = names.children_named("string").map(|s| s.text().to_string()).collect();
        }

        if list.values.is_empty() && list.names.is_empty() && body.find("ParameterList").is_none() {
            return Err(ImportError::ParseError(format!(
                "<{}> holds neither a ParameterList nor ParameterNames",
                body.name
            )));
        }

        debug!(
            "Imported {} parameter value(s) and {} name(s)",
            list.values.len(),
            list.names.len()
        );
        Ok(list)
    }
}

fn parse_value_struct(entry: &XmlElement) -> Result<ParameterValueStruct, ImportError> {
    let name = entry
        .child("Name")
        .map(|n| n.text().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ImportError::ParseError("ParameterValueStruct without a Name".to_string()))?;
    let value = entry
        .child("Value")
        .ok_or_else(|| ImportError::ParseError(format!("ParameterValueStruct {} without a Value", name)))?;

    let mut parsed = ParameterValueStruct::new(name, value.text.as_str());
    if let Some(xsi_type) = value.attr("type") {
        parsed = parsed.with_xsi_type(xsi_type);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_soap_envelope() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap-env:Envelope xmlns:soap-env="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:soap-enc="http://schemas.xmlsoap.org/soap/encoding/"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:cwmp="urn:dslforum-org:cwmp-1-0">
  <soap-env:Header><cwmp:ID soap-env:mustUnderstand="1">42</cwmp:ID></soap-env:Header>
  <soap-env:Body>
    <cwmp:SetParameterValues>
      <ParameterList soap-enc:arrayType="cwmp:ParameterValueStruct[2]">
        <ParameterValueStruct>
          <Name>Device.IP.Interface.1.Enable</Name>
          <Value xsi:type="xsd:boolean">1</Value>
        </ParameterValueStruct>
        <ParameterValueStruct>
          <Name>Device.IP.Interface.1.Name</Name>
          <Value>wan &amp; lan</Value>
        </ParameterValueStruct>
      </ParameterList>
      <ParameterKey></ParameterKey>
    </cwmp:SetParameterValues>
  </soap-env:Body>
</soap-env:Envelope>"#;

        let list = ParameterListImporter::new().import(xml).unwrap();
        assert_eq!(list.method.as_deref(), Some("SetParameterValues"));
        assert_eq!(list.parameter_key.as_deref(), Some(""));
        assert_eq!(
            list.values,
            vec![
                ParameterValueStruct::new("Device.IP.Interface.1.Enable", "1").with_xsi_type("xsd:boolean"),
                ParameterValueStruct::new("Device.IP.Interface.1.Name", "wan & lan"),
            ]
        );
    }

    #[test]
    fn test_import_parameter_names() {
        let xml = r#"<GetParameterValues>
  <ParameterNames soap-enc:arrayType="xsd:string[2]">
    <string>Device.DeviceInfo.</string>
    <string>Device.ManagementServer.URL</string>
  </ParameterNames>
</GetParameterValues>"#;
        let list = ParameterListImporter::new().import(xml).unwrap();
        assert_eq!(list.names, vec!["Device.DeviceInfo.", "Device.ManagementServer.URL"]);
        assert!(list.parameter_key.is_none());
    }

    #[test]
    fn test_bare_list_and_empty_value() {
        let xml = r#"<ParameterList>
  <ParameterValueStruct><Name>Device.X_Vendor.Note</Name><Value/></ParameterValueStruct>
</ParameterList>"#;
        let list = ParameterListImporter::new().import(xml).unwrap();
        assert!(list.method.is_none());
        assert_eq!(list.values[0].value, "");
    }

    #[test]
    fn test_malformed_input() {
        let importer = ParameterListImporter::new();
        assert!(importer
            .import("<ParameterList><ParameterValueStruct><Value>1</Value></ParameterValueStruct></ParameterList>")
            .is_err());
        assert!(importer.import("<Inform/>").is_err());
        let fault = r#"<Envelope><Body><Fault><detail><Fault><FaultCode>9003</FaultCode>
<FaultString>Invalid arguments</FaultString></Fault></detail></Fault></Body></Envelope>"#;
        assert!(matches!(importer.import(fault), Err(ImportError::ValidationError(m)) if m.contains("Invalid arguments")));
    }
}
