//! Broadband Forum specifications and bundled model excerpts

use super::data_model::DataModel;
use crate::import::{BbfXmlImporter, ImportError};
use serde::{Deserialize, Serialize};
use std::fmt;

const TR181_CORE: &str = include_str!("../../schemas/tr-181-2-core.xml");
const TR098_CORE: &str = include_str!("../../schemas/tr-098-1-core.xml");

/// Names accepted by [`bundled_model`]
pub const BUNDLED_MODELS: [&str; 2] = ["tr-181", "tr-098"];

/// Technical Report a data model is defined in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specification {
    #[serde(rename = "TR-069")]
    Tr069,
    #[serde(rename = "TR-098")]
    Tr098,
    #[serde(rename = "TR-104")]
    Tr104,
    #[serde(rename = "TR-106")]
    Tr106,
    #[serde(rename = "TR-135")]
    Tr135,
    #[serde(rename = "TR-143")]
    Tr143,
    #[serde(rename = "TR-157")]
    Tr157,
    #[serde(rename = "TR-181")]
    Tr181,
    #[serde(rename = "TR-196")]
    Tr196,
    #[serde(rename = "TR-262")]
    Tr262,
}

impl Specification {
    pub const ALL: [Specification; 10] = [
        Specification::Tr069,
        Specification::Tr098,
        Specification::Tr104,
        Specification::Tr106,
        Specification::Tr135,
        Specification::Tr143,
        Specification::Tr157,
        Specification::Tr181,
        Specification::Tr196,
        Specification::Tr262,
    ];

    pub fn number(&self) -> u16 {
        match self {
            Specification::Tr069 => 69,
            Specification::Tr098 => 98,
            Specification::Tr104 => 104,
            Specification::Tr106 => 106,
            Specification::Tr135 => 135,
            Specification::Tr143 => 143,
            Specification::Tr157 => 157,
            Specification::Tr181 => 181,
            Specification::Tr196 => 196,
            Specification::Tr262 => 262,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Specification::Tr069 => "CPE WAN Management Protocol",
            Specification::Tr098 => "Internet Gateway Device Data Model for TR-069",
            Specification::Tr104 => "Provisioning Parameters for VoIP CPE",
            Specification::Tr106 => "Data Model Template for TR-069-Enabled Devices",
            Specification::Tr135 => "Data Model for a TR-069 Enabled STB",
            Specification::Tr143 => "Enabling Network Throughput Performance Tests and Statistical Monitoring",
            Specification::Tr157 => "Component Objects for CWMP",
            Specification::Tr181 => "Device Data Model for TR-069",
            Specification::Tr196 => "Femto Access Point Service Data Model",
            Specification::Tr262 => "Femto Component Objects",
        }
    }

    /// Root (or service) objects the specification defines
    pub fn root_objects(&self) -> &'static [&'static str] {
        match self {
            Specification::Tr069 => &[],
            Specification::Tr098 => &["InternetGatewayDevice."],
            Specification::Tr104 => &["VoiceService.{i}."],
            Specification::Tr106 => &["Device."],
            Specification::Tr135 => &["STBService.{i}."],
            Specification::Tr143 => &["Device.IP.Diagnostics."],
            Specification::Tr157 => &["Device.SoftwareModules.", "Device.SmartCardReaders."],
            Specification::Tr181 => &["Device."],
            Specification::Tr196 => &["FAPService.{i}."],
            Specification::Tr262 => &["Device.Services.FAPService.{i}.", "Device.FAP."],
        }
    }

    /// Guess the specification from a model name such as `Device:2.11`.
    ///
    /// `Device:1.x` is the TR-106 device model; `Device:2.x` is TR-181.
    pub fn from_model_name(name: &str) -> Option<Self> {
        let (root, version) = name.split_once(':').unwrap_or((name, ""));
        let major = version.split('.').next().unwrap_or("");
        match root {
            "InternetGatewayDevice" => Some(Specification::Tr098),
            "Device" if major == "1" => Some(Specification::Tr106),
            "Device" => Some(Specification::Tr181),
            "VoiceService" => Some(Specification::Tr104),
            "STBService" => Some(Specification::Tr135),
            "FAPService" => Some(Specification::Tr196),
            _ => None,
        }
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TR-{:03}", self.number())
    }
}

/// Load one of the model excerpts compiled into the crate
///
/// Accepts `tr-181` / `Device:2` and `tr-098` / `InternetGatewayDevice:1`.
pub fn bundled_model(name: &str) -> Result<DataModel, ImportError> {
    let source = match name.to_ascii_lowercase().as_str() {
        "tr-181" | "tr181" | "device:2" => TR181_CORE,
        "tr-098" | "tr098" | "internetgatewaydevice:1" => TR098_CORE,
        _ => return Err(ImportError::NotFound(name.to_string())),
    };
    BbfXmlImporter::new().import(source)?.into_single_model()
}
