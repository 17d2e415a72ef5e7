//! Data shapes exchanged by the CWMP parameter RPCs
//!
//! Only the payload structures are defined here; SOAP envelopes and the
//! session are outside this crate.

use crate::models::parameter::NotificationLevel;
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};

pub const FAULT_METHOD_NOT_SUPPORTED: u32 = 9000;
pub const FAULT_REQUEST_DENIED: u32 = 9001;
pub const FAULT_INTERNAL_ERROR: u32 = 9002;
pub const FAULT_INVALID_ARGUMENTS: u32 = 9003;
pub const FAULT_RESOURCES_EXCEEDED: u32 = 9004;
pub const FAULT_INVALID_PARAMETER_NAME: u32 = 9005;
pub const FAULT_INVALID_TYPE: u32 = 9006;
pub const FAULT_INVALID_VALUE: u32 = 9007;
pub const FAULT_NON_WRITABLE: u32 = 9008;
pub const FAULT_NOTIFICATION_REJECTED: u32 = 9009;

/// FaultString TR-069 assigns to a CPE fault code
pub fn fault_string(code: u32) -> &'static str {
    match code {
        FAULT_METHOD_NOT_SUPPORTED => "Method not supported",
        FAULT_REQUEST_DENIED => "Request denied",
        FAULT_INTERNAL_ERROR => "Internal error",
        FAULT_INVALID_ARGUMENTS => "Invalid arguments",
        FAULT_RESOURCES_EXCEEDED => "Resources exceeded",
        FAULT_INVALID_PARAMETER_NAME => "Invalid parameter name",
        FAULT_INVALID_TYPE => "Invalid parameter type",
        FAULT_INVALID_VALUE => "Invalid parameter value",
        FAULT_NON_WRITABLE => "Attempt to set a non-writable parameter",
        FAULT_NOTIFICATION_REJECTED => "Notification request rejected",
        _ => "Vendor defined fault",
    }
}

/// `ParameterValueStruct`: name, string value and optional `xsi:type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterValueStruct {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xsi_type: Option<String>,
}

impl ParameterValueStruct {
    /// Untyped entry, as an ACS that omits `xsi:type` would send it
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            xsi_type: None,
        }
    }

    pub fn typed(name: impl Into<String>, value: &ParameterValue) -> Self {
        Self {
            name: name.into(),
            value: value.to_cwmp_string(),
            xsi_type: Some(value.xsi_type().to_string()),
        }
    }

    pub fn with_xsi_type(mut self, xsi_type: impl Into<String>) -> Self {
        self.xsi_type = Some(xsi_type.into());
        self
    }
}

/// `ParameterInfoStruct` returned by GetParameterNames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfoStruct {
    pub name: String,
    pub writable: bool,
}

/// `ParameterAttributeStruct` returned by GetParameterAttributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterAttributeStruct {
    pub name: String,
    pub notification: NotificationLevel,
    #[serde(default)]
    pub access_list: Vec<String>,
}

/// `SetParameterAttributesStruct`; a partial path applies to every parameter
/// below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetParameterAttributesStruct {
    pub name: String,
    #[serde(default)]
    pub notification_change: bool,
    #[serde(default)]
    pub notification: NotificationLevel,
    #[serde(default)]
    pub access_list_change: bool,
    #[serde(default)]
    pub access_list: Vec<String>,
}

impl SetParameterAttributesStruct {
    pub fn notification(name: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            name: name.into(),
            notification_change: true,
            notification: level,
            access_list_change: false,
            access_list: Vec::new(),
        }
    }

    pub fn access_list<I, S>(name: impl Into<String>, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            notification_change: false,
            notification: NotificationLevel::Off,
            access_list_change: true,
            access_list: entities.into_iter().map(Into::into).collect(),
        }
    }
}

/// One entry of a SetParameterValuesFault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterFault {
    pub parameter_name: String,
    pub fault_code: u32,
    pub fault_string: String,
}

impl ParameterFault {
    pub fn new(parameter_name: impl Into<String>, fault_code: u32, detail: impl AsRef<str>) -> Self {
        let detail = detail.as_ref();
        let fault_string = if detail.is_empty() {
            fault_string(fault_code).to_string()
        } else {
            format!("{}: {}", fault_string(fault_code), detail)
        };
        Self {
            parameter_name: parameter_name.into(),
            fault_code,
            fault_string,
        }
    }
}

/// Status returned by modifying RPCs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeStatus {
    /// Changes have been applied
    #[default]
    Applied,
    /// Changes are committed but take effect later (e.g. after a reboot)
    Pending,
}

impl ChangeStatus {
    pub fn as_u8(&self) -> u8 {
        match self {
            ChangeStatus::Applied => 0,
            ChangeStatus::Pending => 1,
        }
    }
}

/// A value change awaiting an Inform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub name: String,
    pub value: String,
    pub notification: NotificationLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_strings() {
        assert_eq!(fault_string(9005), "Invalid parameter name");
        assert_eq!(fault_string(9899), "Vendor defined fault");
        let fault = ParameterFault::new("Device.X", FAULT_INVALID_VALUE, "too long");
        assert_eq!(fault.fault_string, "Invalid parameter value: too long");
        let bare = ParameterFault::new("Device.X", FAULT_NON_WRITABLE, "");
        assert_eq!(bare.fault_string, "Attempt to set a non-writable parameter");
    }

    #[test]
    fn test_typed_value_struct() {
        let entry = ParameterValueStruct::typed("Device.ManagementServer.PeriodicInformInterval", &ParameterValue::UnsignedInt(60));
        assert_eq!(entry.value, "60");
        assert_eq!(entry.xsi_type.as_deref(), Some("xsd:unsignedInt"));
    }
}
