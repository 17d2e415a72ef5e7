//! CWMP parameter structure exporter
//!
//! Produces the SOAP-encoded arrays carried in RPC bodies. Element names
//! carry no namespace prefix; the array and value types use the customary
//! `soap-enc`, `xsi`, `xsd` and `cwmp` prefixes, which the enclosing
//! envelope is expected to declare.

use crate::export::{ExportError, ExportResult};
use crate::rpc::{ParameterAttributeStruct, ParameterInfoStruct, ParameterValueStruct};
use quick_xml::escape::escape;

/// Exporter for CWMP parameter arrays
pub struct ParameterListExporter;

impl ParameterListExporter {
    /// `ParameterList` of `ParameterValueStruct`s. Entries without a type
    /// are written as `xsd:string`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cwmp_data_model::export::ParameterListExporter;
    /// use cwmp_data_model::rpc::ParameterValueStruct;
    ///
    /// let xml = ParameterListExporter::export_values(&[
    ///     ParameterValueStruct::new("Device.DeviceInfo.Manufacturer", "ACME & Co"),
    /// ]);
    /// assert!(xml.contains(r#"soap-enc:arrayType="cwmp:ParameterValueStruct[1]""#));
    /// assert!(xml.contains(r#"<Value xsi:type="xsd:string">ACME &amp; Co</Value>"#));
    /// ```
    pub fn export_values(values: &[ParameterValueStruct]) -> String {
        let mut xml = String::new();
        write_values(&mut xml, values, "");
        xml
    }

    /// `ParameterList` of `ParameterInfoStruct`s (GetParameterNamesResponse)
    pub fn export_infos(infos: &[ParameterInfoStruct]) -> String {
        let mut xml = format!(
            "<ParameterList soap-enc:arrayType=\"cwmp:ParameterInfoStruct[{}]\">\n",
            infos.len()
        );
        for info in infos {
            xml.push_str("  <ParameterInfoStruct>\n");
            xml.push_str(&format!("    <Name>{}</Name>\n", escape(info.name.as_str())));
            xml.push_str(&format!("    <Writable>{}</Writable>\n", u8::from(info.writable)));
            xml.push_str("  </ParameterInfoStruct>\n");
        }
        xml.push_str("</ParameterList>\n");
        xml
    }

    /// `ParameterList` of `ParameterAttributeStruct`s
    /// (GetParameterAttributesResponse)
    pub fn export_attributes(attributes: &[ParameterAttributeStruct]) -> String {
        let mut xml = format!(
            "<ParameterList soap-enc:arrayType=\"cwmp:ParameterAttributeStruct[{}]\">\n",
            attributes.len()
        );
        for attribute in attributes {
            xml.push_str("  <ParameterAttributeStruct>\n");
            xml.push_str(&format!("    <Name>{}</Name>\n", escape(attribute.name.as_str())));
            xml.push_str(&format!(
                "    <Notification>{}</Notification>\n",
                attribute.notification.as_u8()
            ));
            xml.push_str(&format!(
                "    <AccessList soap-enc:arrayType=\"xsd:string[{}]\">",
                attribute.access_list.len()
            ));
            for entity in &attribute.access_list {
                xml.push_str(&format!("<string>{}</string>", escape(entity.as_str())));
            }
            xml.push_str("</AccessList>\n");
            xml.push_str("  </ParameterAttributeStruct>\n");
        }
        xml.push_str("</ParameterList>\n");
        xml
    }

    /// A complete `cwmp:SetParameterValues` body, readable by
    /// [`crate::import::ParameterListImporter`]
    pub fn export_set_parameter_values(
        values: &[ParameterValueStruct],
        parameter_key: &str,
    ) -> Result<ExportResult, ExportError> {
        if let Some(entry) = values.iter().find(|v| v.name.is_empty()) {
            return Err(ExportError::ValidationError(format!(
                "ParameterValueStruct with value {:?} has no name",
                entry.value
            )));
        }

        let mut xml = String::from(
            "<cwmp:SetParameterValues xmlns:cwmp=\"urn:dslforum-org:cwmp-1-2\" \
             xmlns:soap-enc=\"http://schemas.xmlsoap.org/soap/encoding/\" \
             xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n",
        );
        write_values(&mut xml, values, "  ");
        xml.push_str(&format!(
            "  <ParameterKey>{}</ParameterKey>\n",
            escape(parameter_key)
        ));
        xml.push_str("</cwmp:SetParameterValues>\n");

        Ok(ExportResult {
            content: xml,
            format: "cwmp-xml".to_string(),
        })
    }
}

/// Value text is written verbatim; only the markup around it is indented
fn write_values(xml: &mut String, values: &[ParameterValueStruct], indent: &str) {
    xml.push_str(&format!(
        "{}<ParameterList soap-enc:arrayType=\"cwmp:ParameterValueStruct[{}]\">\n",
        indent,
        values.len()
    ));
    for entry in values {
        xml.push_str(&format!("{}  <ParameterValueStruct>\n", indent));
        xml.push_str(&format!("{}    <Name>{}</Name>\n", indent, escape(entry.name.as_str())));
        xml.push_str(&format!(
            "{}    <Value xsi:type=\"{}\">{}</Value>\n",
            indent,
            escape(entry.xsi_type.as_deref().unwrap_or("xsd:string")),
            escape(entry.value.as_str())
        ));
        xml.push_str(&format!("{}  </ParameterValueStruct>\n", indent));
    }
    xml.push_str(&format!("{}</ParameterList>\n", indent));
}
