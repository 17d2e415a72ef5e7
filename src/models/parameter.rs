//! Parameter definitions and their CWMP metadata

use super::types::{BaseType, Syntax, is_false};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access mode of a parameter or object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Access {
    #[default]
    ReadOnly,
    ReadWrite,
    /// Writable until the first successful write, read-only afterwards
    WriteOnceReadOnly,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::ReadOnly => "readOnly",
            Access::ReadWrite => "readWrite",
            Access::WriteOnceReadOnly => "writeOnceReadOnly",
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Access {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "readOnly" => Ok(Access::ReadOnly),
            "readWrite" => Ok(Access::ReadWrite),
            "writeOnceReadOnly" => Ok(Access::WriteOnceReadOnly),
            other => Err(format!("Unknown access mode: {}", other)),
        }
    }
}

/// Policy governing active notification requests for a parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActiveNotify {
    #[default]
    Normal,
    /// Active notification is always on and cannot be changed
    ForceEnabled,
    /// Active notification is on by default but may be turned off
    ForceDefaultEnabled,
    /// The CPE may reject requests for active notification
    CanDeny,
}

impl ActiveNotify {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveNotify::Normal => "normal",
            ActiveNotify::ForceEnabled => "forceEnabled",
            ActiveNotify::ForceDefaultEnabled => "forceDefaultEnabled",
            ActiveNotify::CanDeny => "canDeny",
        }
    }

    pub fn is_normal(&self) -> bool {
        *self == ActiveNotify::Normal
    }

    /// Notification level a freshly created parameter starts with
    pub fn initial_level(&self) -> NotificationLevel {
        match self {
            ActiveNotify::ForceEnabled | ActiveNotify::ForceDefaultEnabled => {
                NotificationLevel::Active
            }
            _ => NotificationLevel::Off,
        }
    }
}

impl fmt::Display for ActiveNotify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveNotify {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(ActiveNotify::Normal),
            "forceEnabled" => Ok(ActiveNotify::ForceEnabled),
            "forceDefaultEnabled" => Ok(ActiveNotify::ForceDefaultEnabled),
            "canDeny" => Ok(ActiveNotify::CanDeny),
            other => Err(format!("Unknown activeNotify value: {}", other)),
        }
    }
}

/// Notification attribute of a parameter (0 off, 1 passive, 2 active)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationLevel {
    #[default]
    Off,
    Passive,
    Active,
}

impl NotificationLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            NotificationLevel::Off => 0,
            NotificationLevel::Passive => 1,
            NotificationLevel::Active => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NotificationLevel::Off),
            1 => Some(NotificationLevel::Passive),
            2 => Some(NotificationLevel::Active),
            _ => None,
        }
    }
}

/// Lifecycle status of a definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    #[default]
    Current,
    Deprecated,
    Obsoleted,
    Deleted,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Current => "current",
            Status::Deprecated => "deprecated",
            Status::Obsoleted => "obsoleted",
            Status::Deleted => "deleted",
        }
    }

    pub fn is_current(&self) -> bool {
        *self == Status::Current
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Status::Current),
            "deprecated" => Ok(Status::Deprecated),
            "obsoleted" => Ok(Status::Obsoleted),
            "deleted" => Ok(Status::Deleted),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// Leaf parameter of a schema object
///
/// # Example
///
/// ```rust
/// use cwmp_data_model::models::{Access, ActiveNotify, BaseType, ParameterDef};
///
/// let uptime = ParameterDef::new("UpTime", BaseType::UnsignedInt)
///     .with_active_notify(ActiveNotify::CanDeny);
/// assert_eq!(uptime.access, Access::ReadOnly);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDef {
    pub name: String,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub syntax: Syntax,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "ActiveNotify::is_normal")]
    pub active_notify: ActiveNotify,
    /// Parameter is included in every Inform
    #[serde(default, skip_serializing_if = "is_false")]
    pub forced_inform: bool,
    #[serde(default, skip_serializing_if = "Status::is_current")]
    pub status: Status,
}

impl ParameterDef {
    pub fn new(name: impl Into<String>, base: BaseType) -> Self {
        Self::with_syntax_of(name, Syntax::new(base))
    }

    pub fn with_syntax_of(name: impl Into<String>, syntax: Syntax) -> Self {
        Self {
            name: name.into(),
            access: Access::ReadOnly,
            syntax,
            description: String::new(),
            active_notify: ActiveNotify::Normal,
            forced_inform: false,
            status: Status::Current,
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn writable(self) -> Self {
        self.with_access(Access::ReadWrite)
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_active_notify(mut self, active_notify: ActiveNotify) -> Self {
        self.active_notify = active_notify;
        self
    }

    pub fn with_forced_inform(mut self, forced_inform: bool) -> Self {
        self.forced_inform = forced_inform;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn is_writable(&self) -> bool {
        self.access.is_writable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_round_trip() {
        let param = ParameterDef::new("Password", BaseType::String)
            .with_access(Access::ReadWrite)
            .with_syntax(Syntax::new(BaseType::String).with_max_length(256).hidden())
            .with_description("Connection password")
            .with_active_notify(ActiveNotify::CanDeny)
            .with_forced_inform(true)
            .with_status(Status::Deprecated);

        assert_eq!(param.access, Access::ReadWrite);
        assert!(param.syntax.hidden);
        assert_eq!(param.description, "Connection password");
        assert_eq!(param.active_notify, ActiveNotify::CanDeny);
        assert!(param.forced_inform);
        assert_eq!(param.status, Status::Deprecated);
    }

    #[test]
    fn test_access_strings() {
        for access in [Access::ReadOnly, Access::ReadWrite, Access::WriteOnceReadOnly] {
            assert_eq!(access.as_str().parse::<Access>().unwrap(), access);
        }
        assert!("rw".parse::<Access>().is_err());
    }

    #[test]
    fn test_initial_notification_levels() {
        assert_eq!(ActiveNotify::Normal.initial_level(), NotificationLevel::Off);
        assert_eq!(ActiveNotify::CanDeny.initial_level(), NotificationLevel::Off);
        assert_eq!(
            ActiveNotify::ForceEnabled.initial_level(),
            NotificationLevel::Active
        );
        assert_eq!(
            ActiveNotify::ForceDefaultEnabled.initial_level(),
            NotificationLevel::Active
        );
    }

    #[test]
    fn test_serialization_omits_defaults() {
        let param = ParameterDef::new("Enable", BaseType::Boolean).writable();
        let yaml = serde_yaml::to_string(&param).unwrap();
        assert!(yaml.contains("access: readWrite"));
        assert!(!yaml.contains("activeNotify"));
        assert!(!yaml.contains("forcedInform"));
    }
}
