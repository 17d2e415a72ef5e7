//! Device tree tests against the bundled data models

use cwmp_data_model::export::ParameterListExporter;
use cwmp_data_model::import::ParameterListImporter;
use cwmp_data_model::rpc::SetParameterAttributesStruct;
use cwmp_data_model::{
    ChangeStatus, DeviceTree, NotificationLevel, ParameterValue, ParameterValueStruct, TreeSnapshot, TreeValidator,
    ValidationConfig, bundled_model,
};
use std::sync::Arc;

fn tr181() -> DeviceTree {
    DeviceTree::from_model(bundled_model("tr-181").unwrap()).unwrap()
}

mod provisioning_tests {
    use super::*;

    const SET_REQUEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap-env:Envelope xmlns:soap-env="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:soap-enc="http://schemas.xmlsoap.org/soap/encoding/"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:cwmp="urn:dslforum-org:cwmp-1-2">
  <soap-env:Body>
    <cwmp:SetParameterValues>
      <ParameterList soap-enc:arrayType="cwmp:ParameterValueStruct[3]">
        <ParameterValueStruct>
          <Name>Device.ManagementServer.URL</Name>
          <Value xsi:type="xsd:string">https://acs.example.net/cwmp</Value>
        </ParameterValueStruct>
        <ParameterValueStruct>
          <Name>Device.ManagementServer.PeriodicInformEnable</Name>
          <Value xsi:type="xsd:boolean">1</Value>
        </ParameterValueStruct>
        <ParameterValueStruct>
          <Name>Device.ManagementServer.PeriodicInformInterval</Name>
          <Value xsi:type="xsd:unsignedInt">600</Value>
        </ParameterValueStruct>
      </ParameterList>
      <ParameterKey>bootstrap-1</ParameterKey>
    </cwmp:SetParameterValues>
  </soap-env:Body>
</soap-env:Envelope>"#;

    #[test]
    fn test_apply_imported_request() {
        let request = ParameterListImporter::new().import(SET_REQUEST).unwrap();
        assert_eq!(request.method.as_deref(), Some("SetParameterValues"));

        let mut tree = tr181();
        let key = request.parameter_key.as_deref().unwrap_or_default();
        let status = tree.set_parameter_values(&request.values, key).unwrap();

        assert_eq!(status, ChangeStatus::Applied);
        assert_eq!(tree.parameter_key(), "bootstrap-1");
        assert_eq!(
            tree.value("Device.ManagementServer.PeriodicInformEnable").unwrap(),
            &ParameterValue::Boolean(true)
        );
        assert_eq!(
            tree.value("Device.ManagementServer.PeriodicInformInterval").unwrap(),
            &ParameterValue::UnsignedInt(600)
        );
        assert_eq!(tree.pending_notifications(), 0);
    }

    #[test]
    fn test_exported_request_applies_the_same() {
        let values = vec![
            ParameterValueStruct::new("Device.ManagementServer.URL", "http://acs/<path>&x").with_xsi_type("xsd:string"),
            ParameterValueStruct::typed("Device.ManagementServer.PeriodicInformInterval", &ParameterValue::UnsignedInt(30)),
        ];
        let exported = ParameterListExporter::export_set_parameter_values(&values, "round").unwrap();
        let request = ParameterListImporter::new().import(&exported.content).unwrap();
        assert_eq!(request.values, values);

        let mut tree = tr181();
        tree.set_parameter_values(&request.values, request.parameter_key.as_deref().unwrap_or_default())
            .unwrap();
        assert_eq!(
            tree.value("Device.ManagementServer.URL").unwrap().to_string(),
            "http://acs/<path>&x"
        );
        assert_eq!(tree.parameter_key(), "round");
    }

    #[test]
    fn test_rejected_request_changes_nothing() {
        let mut tree = tr181();
        tree.add_object("Device.IP.Interface.", "").unwrap();
        let before = tree.snapshot();

        let err = tree
            .set_parameter_values(
                &[
                    ParameterValueStruct::new("Device.ManagementServer.URL", "http://acs"),
                    ParameterValueStruct::new("Device.IP.Interface.1.MaxMTUSize", "10"),
                    ParameterValueStruct::new("Device.DeviceInfo.SerialNumber", "X1"),
                ],
                "never",
            )
            .unwrap_err();

        assert_eq!(err.fault_code(), 9003);
        let faults: Vec<(&str, u32)> = err
            .parameter_faults()
            .iter()
            .map(|f| (f.parameter_name.as_str(), f.fault_code))
            .collect();
        assert_eq!(
            faults,
            vec![
                ("Device.IP.Interface.1.MaxMTUSize", 9007),
                ("Device.DeviceInfo.SerialNumber", 9008),
            ]
        );
        assert_eq!(tree.snapshot(), before);
    }
}

mod object_tests {
    use super::*;

    #[test]
    fn test_nested_rows_by_alias() {
        let mut tree = tr181();
        let (interface, _) = tree.add_object("Device.IP.Interface.", "a").unwrap();
        assert_eq!(interface, 1);

        let (address, _) = tree.add_object("Device.IP.Interface.[cpe-1].IPv4Address.", "b").unwrap();
        assert_eq!(address, 1);
        assert_eq!(tree.parameter_key(), "b");
        assert_eq!(
            tree.value("Device.IP.Interface.1.IPv4AddressNumberOfEntries").unwrap(),
            &ParameterValue::UnsignedInt(1)
        );
        assert_eq!(
            tree.value("Device.IP.Interface.1.IPv4Address.1.AddressingType")
                .unwrap()
                .to_string(),
            "Static"
        );

        tree.delete_object("Device.IP.Interface.1.", "c").unwrap();
        assert!(!tree.contains_object("Device.IP.Interface.1.IPv4Address.1."));
        assert_eq!(
            tree.value("Device.IP.InterfaceNumberOfEntries").unwrap(),
            &ParameterValue::UnsignedInt(0)
        );
    }

    #[test]
    fn test_read_only_table_rejects_add() {
        let mut tree = tr181();
        let err = tree.add_object("Device.DSL.BondingGroup.", "").unwrap_err();
        assert_eq!(err.fault_code(), 9008);
        assert!(tree.rows("Device.DSL.BondingGroup.").is_empty());
    }

    #[test]
    fn test_functional_key_on_enabled_addresses() {
        let mut tree = tr181();
        tree.add_object("Device.IP.Interface.", "").unwrap();
        tree.add_object("Device.IP.Interface.1.IPv4Address.", "").unwrap();
        tree.add_object("Device.IP.Interface.1.IPv4Address.", "").unwrap();

        let address = |n: u32, field: &str, value: &str| {
            ParameterValueStruct::new(format!("Device.IP.Interface.1.IPv4Address.{}.{}", n, field), value)
        };
        tree.set_parameter_values(
            &[
                address(1, "IPAddress", "192.168.1.1"),
                address(1, "SubnetMask", "255.255.255.0"),
                address(1, "Enable", "true"),
                address(2, "IPAddress", "192.168.1.1"),
                address(2, "SubnetMask", "255.255.255.0"),
            ],
            "",
        )
        .unwrap();

        let err = tree
            .set_parameter_values(&[address(2, "Enable", "true")], "")
            .unwrap_err();
        assert_eq!(err.parameter_faults()[0].fault_code, 9007);
    }
}

mod attribute_tests {
    use super::*;

    #[test]
    fn test_forced_notification_cannot_be_disabled() {
        let mut tree = tr181();
        let version = "Device.DeviceInfo.SoftwareVersion";
        assert_eq!(
            tree.get_parameter_attributes(&[version]).unwrap()[0].notification,
            NotificationLevel::Active
        );

        let err = tree
            .set_parameter_attributes(&[SetParameterAttributesStruct::notification(version, NotificationLevel::Off)])
            .unwrap_err();
        assert_eq!(err.fault_code(), 9009);
    }

    #[test]
    fn test_device_changes_are_notified() {
        let mut tree = tr181();
        tree.set_parameter_attributes(&[SetParameterAttributesStruct::notification(
            "Device.DeviceInfo.UpTime",
            NotificationLevel::Passive,
        )])
        .unwrap();

        tree.set_internal("Device.DeviceInfo.UpTime", "120").unwrap();
        tree.set_internal("Device.DeviceInfo.SoftwareVersion", "1.2.3").unwrap();
        let changes = tree.take_notifications();
        let names: Vec<_> = changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Device.DeviceInfo.SoftwareVersion", "Device.DeviceInfo.UpTime"]);
        assert_eq!(changes[1].value, "120");
    }

    #[test]
    fn test_forced_inform_parameters() {
        let mut tree = tr181();
        tree.set_internal("Device.DeviceInfo.SerialNumber", "SN-0042").unwrap();
        let forced = tree.forced_inform_parameters();
        assert!(forced.iter().any(|(name, value)| {
            name == "Device.DeviceInfo.SerialNumber" && value.to_string() == "SN-0042"
        }));
        assert!(forced.iter().any(|(name, _)| name == "Device.ManagementServer.ParameterKey"));
        assert!(!forced.iter().any(|(name, _)| name == "Device.ManagementServer.URL"));
    }
}

mod snapshot_tests {
    use super::*;

    fn populated() -> DeviceTree {
        let mut tree = tr181();
        tree.add_object("Device.IP.Interface.", "").unwrap();
        tree.add_object("Device.IP.Interface.", "").unwrap();
        tree.delete_object("Device.IP.Interface.1.", "").unwrap();
        tree.set_parameter_values(
            &[
                ParameterValueStruct::new("Device.IP.Interface.2.Name", "wan0"),
                ParameterValueStruct::new("Device.DeviceInfo.ProvisioningCode", "ISP.1"),
            ],
            "snap",
        )
        .unwrap();
        tree.set_parameter_attributes(&[SetParameterAttributesStruct::access_list(
            "Device.ManagementServer.URL",
            ["Subscriber"],
        )])
        .unwrap();
        tree
    }

    #[test]
    fn test_snapshot_survives_serialization() {
        let tree = populated();
        let snapshot = tree.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: TreeSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);

        let mut restored = DeviceTree::from_snapshot(tree.shared_model(), ValidationConfig::default(), &parsed).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.parameter_key(), "snap");
        assert_eq!(
            restored.get_parameter_values(&[""]).unwrap(),
            tree.get_parameter_values(&[""]).unwrap()
        );

        let (instance, _) = restored.add_object("Device.IP.Interface.", "").unwrap();
        assert_eq!(instance, 3);
    }

    #[test]
    fn test_snapshot_keeps_attributes() {
        let mut tree = populated();
        tree.set_parameter_attributes(&[SetParameterAttributesStruct::notification(
            "Device.DeviceInfo.UpTime",
            NotificationLevel::Passive,
        )])
        .unwrap();

        let snapshot = tree.snapshot();
        assert_eq!(
            snapshot.notifications.get("Device.DeviceInfo.UpTime"),
            Some(&NotificationLevel::Passive)
        );
        let restored = DeviceTree::from_snapshot(tree.shared_model(), ValidationConfig::default(), &snapshot).unwrap();
        let attrs = restored
            .get_parameter_attributes(&["Device.DeviceInfo.UpTime", "Device.ManagementServer.URL"])
            .unwrap();
        assert_eq!(attrs[0].notification, NotificationLevel::Passive);
        assert_eq!(attrs[1].access_list, vec!["Subscriber".to_string()]);
    }

    #[test]
    fn test_snapshot_for_other_model_rejected() {
        let snapshot = populated().snapshot();
        let igd = Arc::new(bundled_model("tr-098").unwrap());
        assert!(DeviceTree::from_snapshot(igd, ValidationConfig::default(), &snapshot).is_err());
    }

    #[test]
    fn test_restored_tree_validates() {
        let tree = populated();
        let report = TreeValidator::new().validate(&tree);
        assert!(!report.has_errors(), "{:?}", report.issues);
    }
}
