//! Object (schema node) definitions

use super::parameter::{Access, ParameterDef, Status};
use crate::path::{INSTANCE_PLACEHOLDER, ParameterPath, Segment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on the number of rows of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MaxEntriesRepr", into = "MaxEntriesRepr")]
pub enum MaxEntries {
    Bounded(u32),
    Unbounded,
}

impl Default for MaxEntries {
    fn default() -> Self {
        MaxEntries::Bounded(1)
    }
}

impl MaxEntries {
    pub fn allows(&self, count: usize) -> bool {
        match self {
            MaxEntries::Bounded(max) => count <= *max as usize,
            MaxEntries::Unbounded => true,
        }
    }

    pub fn limit(&self) -> Option<u32> {
        match self {
            MaxEntries::Bounded(max) => Some(*max),
            MaxEntries::Unbounded => None,
        }
    }
}

impl fmt::Display for MaxEntries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxEntries::Bounded(max) => write!(f, "{}", max),
            MaxEntries::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl FromStr for MaxEntries {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "unbounded" {
            return Ok(MaxEntries::Unbounded);
        }
        s.parse::<u32>()
            .map(MaxEntries::Bounded)
            .map_err(|_| format!("Invalid maxEntries value: {}", s))
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MaxEntriesRepr {
    Count(u32),
    Keyword(String),
}

impl TryFrom<MaxEntriesRepr> for MaxEntries {
    type Error = String;

    fn try_from(repr: MaxEntriesRepr) -> Result<Self, Self::Error> {
        match repr {
            MaxEntriesRepr::Count(n) => Ok(MaxEntries::Bounded(n)),
            MaxEntriesRepr::Keyword(s) => s.parse(),
        }
    }
}

impl From<MaxEntries> for MaxEntriesRepr {
    fn from(value: MaxEntries) -> Self {
        match value {
            MaxEntries::Bounded(n) => MaxEntriesRepr::Count(n),
            MaxEntries::Unbounded => MaxEntriesRepr::Keyword("unbounded".to_string()),
        }
    }
}

/// Set of parameters whose combined values must be unique across the rows
/// of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueKey {
    /// Functional keys are enforced; non-functional ones (such as `Alias`)
    /// are informational unless strict checking is configured
    #[serde(default = "default_true")]
    pub functional: bool,
    pub parameters: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_min_entries() -> u32 {
    1
}

impl UniqueKey {
    pub fn functional<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            functional: true,
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    pub fn non_functional<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            functional: false,
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, parameter: &str) -> bool {
        self.parameters.iter().any(|p| p == parameter)
    }
}

/// Object or table definition identified by its path template
///
/// Single-instance objects have `min_entries == max_entries == 1`; tables
/// end their template with `{i}.`.
///
/// # Example
///
/// ```rust
/// use cwmp_data_model::models::{Access, BaseType, MaxEntries, ObjectDef, ParameterDef, UniqueKey};
///
/// let table = ObjectDef::table("Device.IP.Interface.{i}.")
///     .with_access(Access::ReadWrite)
///     .with_num_entries_parameter("InterfaceNumberOfEntries")
///     .with_unique_key(UniqueKey::non_functional(["Alias"]))
///     .with_parameter(ParameterDef::new("Enable", BaseType::Boolean).writable());
///
/// assert!(table.is_table());
/// assert_eq!(table.max_entries, MaxEntries::Unbounded);
/// assert_eq!(table.collection_template(), "Device.IP.Interface.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDef {
    pub name: String,
    #[serde(default)]
    pub access: Access,
    #[serde(default = "default_min_entries")]
    pub min_entries: u32,
    #[serde(default)]
    pub max_entries: MaxEntries,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_entries_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_keys: Vec<UniqueKey>,
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Status::is_current")]
    pub status: Status,
}

impl ObjectDef {
    /// Single-instance object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: Access::ReadOnly,
            min_entries: 1,
            max_entries: MaxEntries::Bounded(1),
            num_entries_parameter: None,
            enable_parameter: None,
            unique_keys: Vec::new(),
            parameters: Vec::new(),
            description: String::new(),
            status: Status::Current,
        }
    }

    /// Multi-instance object with no row limits
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            min_entries: 0,
            max_entries: MaxEntries::Unbounded,
            ..Self::new(name)
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_entries(mut self, min_entries: u32, max_entries: MaxEntries) -> Self {
        self.min_entries = min_entries;
        self.max_entries = max_entries;
        self
    }

    pub fn with_num_entries_parameter(mut self, name: impl Into<String>) -> Self {
        self.num_entries_parameter = Some(name.into());
        self
    }

    pub fn with_enable_parameter(mut self, name: impl Into<String>) -> Self {
        self.enable_parameter = Some(name.into());
        self
    }

    pub fn with_unique_key(mut self, key: UniqueKey) -> Self {
        self.unique_keys.push(key);
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDef) -> Self {
        self.upsert_parameter(parameter);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Whether this definition describes table rows
    pub fn is_table(&self) -> bool {
        self.name.ends_with(&format!(".{}.", INSTANCE_PLACEHOLDER))
    }

    /// Insert a parameter, replacing one with the same name.
    /// Returns the replaced definition.
    pub fn upsert_parameter(&mut self, parameter: ParameterDef) -> Option<ParameterDef> {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => Some(std::mem::replace(existing, parameter)),
            None => {
                self.parameters.push(parameter);
                None
            }
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDef> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut ParameterDef> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Object name without its parents (`BondedChannel` for
    /// `Device.DSL.BondingGroup.{i}.BondedChannel.{i}.`)
    pub fn leaf_name(&self) -> &str {
        self.name
            .trim_end_matches('.')
            .split('.')
            .rev()
            .find(|s| *s != INSTANCE_PLACEHOLDER)
            .unwrap_or("")
    }

    /// Template of the table collection (`Device.IP.Interface.` for
    /// `Device.IP.Interface.{i}.`); the template itself for non-tables
    pub fn collection_template(&self) -> String {
        match self.name.strip_suffix(&format!("{}.", INSTANCE_PLACEHOLDER)) {
            Some(prefix) if self.is_table() => prefix.to_string(),
            _ => self.name.clone(),
        }
    }

    /// Template of the object this one hangs off; for tables this is the
    /// object holding the table (where its NumberOfEntries parameter lives)
    pub fn parent_template(&self) -> Option<String> {
        let path = ParameterPath::parse(&self.name).ok()?;
        let mut segments = path.segments().to_vec();
        if matches!(segments.last(), Some(Segment::Placeholder)) {
            segments.pop();
        }
        segments.pop();
        if segments.is_empty() {
            return None;
        }
        Some(ParameterPath::from_segments(segments, true).to_string())
    }
}
