//! Import and export tests across formats

use cwmp_data_model::export::{BbfXmlExporter, ParameterListExporter, SchemaExporter};
use cwmp_data_model::import::{BbfXmlImporter, ImportError, ParameterListImporter, SchemaFormat, SchemaImporter};
use cwmp_data_model::rpc::{ParameterAttributeStruct, ParameterInfoStruct};
use cwmp_data_model::{
    DeviceTree, MaxEntries, ModelValidator, NotificationLevel, ParameterValue, ParameterValueStruct, Specification,
    bundled_model,
};

const VENDOR_EXTENSION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dm:document xmlns:dm="urn:broadband-forum-org:cwmp:datamodel-1-8" spec="urn:acme-com:device-2-12">
  <model name="Device:2.12" base="Device:2.11">
    <object base="Device.IP.Interface.{i}." maxEntries="8"/>
    <object name="Device.X_ACME_Radio." access="readOnly" minEntries="1" maxEntries="1">
      <description>Vendor radio settings.</description>
      <parameter name="Channel" access="readWrite">
        <syntax>
          <unsignedInt><range minInclusive="1" maxInclusive="13"/></unsignedInt>
          <default type="object" value="6"/>
        </syntax>
      </parameter>
      <parameter name="Region" access="readWrite">
        <syntax>
          <string>
            <enumeration value="EU"/>
            <enumeration value="US"/>
          </string>
          <default type="object" value="EU"/>
        </syntax>
      </parameter>
    </object>
  </model>
</dm:document>"#;

mod bbf_xml_tests {
    use super::*;

    #[test]
    fn test_vendor_extension_on_bundled_base() {
        let base = bundled_model("tr-181").unwrap();
        let missing = BbfXmlImporter::new().import(VENDOR_EXTENSION);
        assert!(matches!(missing, Err(ImportError::NotFound(_))));

        let model = BbfXmlImporter::new()
            .with_base_models([base])
            .import(VENDOR_EXTENSION)
            .unwrap()
            .into_single_model()
            .unwrap();

        assert_eq!(model.name, "Device:2.12");
        assert_eq!(model.specification, Some(Specification::Tr181));
        assert_eq!(
            model.object("Device.IP.Interface.{i}.").unwrap().max_entries,
            MaxEntries::Bounded(8)
        );
        assert!(model.object("Device.ManagementServer.").is_some());
        assert!(!ModelValidator::new().validate(&model).has_errors());

        let mut tree = DeviceTree::from_model(model).unwrap();
        assert_eq!(
            tree.value("Device.X_ACME_Radio.Channel").unwrap(),
            &ParameterValue::UnsignedInt(6)
        );
        tree.set_parameter_values(&[ParameterValueStruct::new("Device.X_ACME_Radio.Region", "US")], "v")
            .unwrap();
        let err = tree
            .set_parameter_values(&[ParameterValueStruct::new("Device.X_ACME_Radio.Channel", "14")], "v")
            .unwrap_err();
        assert_eq!(err.parameter_faults()[0].fault_code, 9007);
    }

    #[test]
    fn test_flattened_export_stands_alone() {
        let model = BbfXmlImporter::new()
            .with_base_models([bundled_model("tr-181").unwrap()])
            .import(VENDOR_EXTENSION)
            .unwrap()
            .into_single_model()
            .unwrap();

        let exported = BbfXmlExporter::export(&model).unwrap();
        assert_eq!(exported.format, "bbf-xml");
        assert!(!exported.content.contains("base=\"Device:2.11\""));

        let reimported = BbfXmlImporter::new()
            .import(&exported.content)
            .unwrap()
            .into_single_model()
            .unwrap();
        assert_eq!(reimported.base, None);
        assert_eq!(reimported.objects, model.objects);
    }

    #[test]
    fn test_export_several_models() {
        let models = vec![bundled_model("tr-181").unwrap(), bundled_model("tr-098").unwrap()];
        let exported = BbfXmlExporter::export_models(&models).unwrap();
        let result = BbfXmlImporter::new().import(&exported.content).unwrap();
        assert_eq!(result.models.len(), 2);
        assert!(result.model("InternetGatewayDevice:1.14").is_some());
        assert!(result.into_single_model().is_err());
    }
}

mod schema_tests {
    use super::*;

    #[test]
    fn test_bundled_models_survive_yaml_and_json() {
        for name in ["tr-181", "tr-098"] {
            let model = bundled_model(name).unwrap();
            for format in [SchemaFormat::Yaml, SchemaFormat::Json] {
                let exported = SchemaExporter::export(&model, format).unwrap();
                let importer = SchemaImporter::new();
                assert_eq!(importer.detect_format(&exported.content), format);

                let back = importer
                    .import(&exported.content)
                    .unwrap()
                    .into_single_model()
                    .unwrap();
                assert_eq!(back.fingerprint().unwrap(), model.fingerprint().unwrap(), "{} {:?}", name, format);
            }
        }
    }

    #[test]
    fn test_hand_written_yaml_model() {
        let yaml = r#"
name: "Device:2.11"
objects:
  - name: "Device."
    access: readOnly
    minEntries: 1
    maxEntries: 1
    parameters:
      - name: RootDataModelVersion
        syntax:
          base: string
          default: "2.11"
"#;
        let model = SchemaImporter::new()
            .import(yaml)
            .unwrap()
            .into_single_model()
            .unwrap();
        assert_eq!(model.specification, Some(Specification::Tr181));
        let tree = DeviceTree::from_model(model).unwrap();
        assert_eq!(tree.value("Device.RootDataModelVersion").unwrap().to_string(), "2.11");
    }
}

mod parameter_list_tests {
    use super::*;

    #[test]
    fn test_get_parameter_values_response() {
        let mut tree = DeviceTree::from_model(bundled_model("tr-181").unwrap()).unwrap();
        tree.set_internal("Device.DeviceInfo.Manufacturer", "ACME & Sons").unwrap();
        let values = tree.get_parameter_values(&["Device.DeviceInfo."]).unwrap();

        let xml = ParameterListExporter::export_values(&values);
        let list = ParameterListImporter::new().import(&xml).unwrap();
        assert_eq!(list.method, None);
        assert_eq!(list.values, values);
        assert!(
            list.values
                .iter()
                .any(|v| v.name == "Device.DeviceInfo.Manufacturer" && v.value == "ACME & Sons")
        );
    }

    #[test]
    fn test_info_and_attribute_lists() {
        let infos = ParameterListExporter::export_infos(&[ParameterInfoStruct {
            name: "Device.IP.Interface.".to_string(),
            writable: true,
        }]);
        assert!(infos.contains("cwmp:ParameterInfoStruct[1]"));
        assert!(infos.contains("<Writable>1</Writable>"));

        let attributes = ParameterListExporter::export_attributes(&[ParameterAttributeStruct {
            name: "Device.ManagementServer.URL".to_string(),
            notification: NotificationLevel::Active,
            access_list: vec!["Subscriber".to_string()],
        }]);
        assert!(attributes.contains("<Notification>2</Notification>"));
        assert!(attributes.contains("xsd:string[1]"));
        assert!(attributes.contains("<string>Subscriber</string>"));
    }

    #[test]
    fn test_soap_fault_is_not_a_parameter_list() {
        let fault = r#"<soap-env:Envelope xmlns:soap-env="http://schemas.xmlsoap.org/soap/envelope/">
  <soap-env:Body>
    <soap-env:Fault>
      <faultcode>Client</faultcode>
      <faultstring>CWMP fault</faultstring>
      <detail><cwmp:Fault xmlns:cwmp="urn:dslforum-org:cwmp-1-2">
        <FaultCode>9005</FaultCode>
        <FaultString>Invalid parameter name</FaultString>
      </cwmp:Fault></detail>
    </soap-env:Fault>
  </soap-env:Body>
</soap-env:Envelope>"#;
        let err = ParameterListImporter::new().import(fault).unwrap_err();
        assert!(matches!(err, ImportError::ValidationError(ref m) if m.contains("Invalid parameter name")));
    }
}
