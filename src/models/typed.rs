//! Typed views of well-known objects
//!
//! Each struct mirrors the parameters of one object template. Fields are
//! optional so a partial struct can be written back without touching the
//! parameters it leaves out. Conversion to and from the generic tree goes
//! through `serde_json::Value`, see [`crate::tree::DeviceTree::read_typed`].

use crate::path::INSTANCE_PLACEHOLDER;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A struct bound to one object template
pub trait CwmpObject: Serialize + DeserializeOwned {
    /// Object template, e.g. `Device.DSL.BondingGroup.{i}.`
    const PATH: &'static str;

    /// Fill the template's `{i}` placeholders in order.
    ///
    /// Returns `None` when the number of instances does not match.
    fn instance_path(instances: &[u32]) -> Option<String> {
        let mut remaining = instances.iter();
        let mut path = String::with_capacity(Self::PATH.len());
        for segment in Self::PATH.trim_end_matches('.').split('.') {
            if segment == INSTANCE_PLACEHOLDER {
                path.push_str(&remaining.next()?.to_string());
            } else {
                path.push_str(segment);
            }
            path.push('.');
        }
        match remaining.next() {
            Some(_) => None,
            None => Some(path),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(rename = "ManufacturerOUI", default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_oui: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_code: Option<String>,
    /// Seconds since last restart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_time: Option<u32>,
}

impl CwmpObject for DeviceInfo {
    const PATH: &'static str = "Device.DeviceInfo.";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagementServer {
    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodic_inform_enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodic_inform_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodic_inform_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_key: Option<String>,
    #[serde(rename = "ConnectionRequestURL", default, skip_serializing_if = "Option::is_none")]
    pub connection_request_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_request_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_request_password: Option<String>,
    #[serde(
        rename = "CWMPRetryMinimumWaitInterval",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cwmp_retry_minimum_wait_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_based_addressing: Option<bool>,
}

impl CwmpObject for ManagementServer {
    const PATH: &'static str = "Device.ManagementServer.";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BondingGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_change: Option<u32>,
    /// Comma-separated list of lower layer paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_layers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bond_scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonded_channel_number_of_entries: Option<u32>,
}

impl CwmpObject for BondingGroup {
    const PATH: &'static str = "Device.DSL.BondingGroup.{i}.";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BondedChannel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl CwmpObject for BondedChannel {
    const PATH: &'static str = "Device.DSL.BondingGroup.{i}.BondedChannel.{i}.";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BondedChannelEthernetStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underflow_errors_sent: Option<u32>,
    #[serde(rename = "CRCErrorsReceived", default, skip_serializing_if = "Option::is_none")]
    pub crc_errors_received: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_errors_received: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_packets_received: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_packets_received: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow_errors_received: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_frames_received: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_dropped: Option<u32>,
}

impl CwmpObject for BondedChannelEthernetStats {
    const PATH: &'static str = "Device.DSL.BondingGroup.{i}.BondedChannel.{i}.Ethernet.Stats.";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_change: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_layers: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<String>,
    #[serde(rename = "MaxMTUSize", default, skip_serializing_if = "Option::is_none")]
    pub max_mtu_size: Option<u32>,
    #[serde(
        rename = "IPv4AddressNumberOfEntries",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ipv4_address_number_of_entries: Option<u32>,
}

impl CwmpObject for IpInterface {
    const PATH: &'static str = "Device.IP.Interface.{i}.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_path() {
        assert_eq!(
            BondedChannel::instance_path(&[2, 5]).as_deref(),
            Some("Device.DSL.BondingGroup.2.BondedChannel.5.")
        );
        assert_eq!(DeviceInfo::instance_path(&[]).as_deref(), Some("Device.DeviceInfo."));
        assert!(BondedChannel::instance_path(&[2]).is_none());
        assert!(IpInterface::instance_path(&[1, 2]).is_none());
    }

    #[test]
    fn test_field_names_match_parameters() {
        let value = serde_json::to_value(IpInterface {
            max_mtu_size: Some(1500),
            interface_type: Some("Normal".to_string()),
            ipv4_address_number_of_entries: Some(1),
            ..Default::default()
        })
        .unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("MaxMTUSize"));
        assert!(object.contains_key("Type"));
        assert!(object.contains_key("IPv4AddressNumberOfEntries"));
        assert_eq!(object.len(), 3);
    }
}
