//! Parameter syntax: base types, facets and named data types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primitive CWMP data types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseType {
    #[default]
    String,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Boolean,
    DateTime,
    Base64,
    HexBinary,
    Decimal,
}

impl BaseType {
    pub const ALL: [BaseType; 10] = [
        BaseType::String,
        BaseType::Int,
        BaseType::UnsignedInt,
        BaseType::Long,
        BaseType::UnsignedLong,
        BaseType::Boolean,
        BaseType::DateTime,
        BaseType::Base64,
        BaseType::HexBinary,
        BaseType::Decimal,
    ];

    /// Element name used in BBF DM XML `<syntax>` blocks
    pub fn xml_name(&self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Int => "int",
            BaseType::UnsignedInt => "unsignedInt",
            BaseType::Long => "long",
            BaseType::UnsignedLong => "unsignedLong",
            BaseType::Boolean => "boolean",
            BaseType::DateTime => "dateTime",
            BaseType::Base64 => "base64",
            BaseType::HexBinary => "hexBinary",
            BaseType::Decimal => "decimal",
        }
    }

    pub fn from_xml_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.xml_name() == name)
    }

    /// `xsi:type` attribute value used on the wire
    pub fn xsi_type(&self) -> &'static str {
        match self {
            BaseType::String => "xsd:string",
            BaseType::Int => "xsd:int",
            BaseType::UnsignedInt => "xsd:unsignedInt",
            BaseType::Long => "xsd:long",
            BaseType::UnsignedLong => "xsd:unsignedLong",
            BaseType::Boolean => "xsd:boolean",
            BaseType::DateTime => "xsd:dateTime",
            BaseType::Base64 => "xsd:base64",
            BaseType::HexBinary => "xsd:hexBinary",
            BaseType::Decimal => "xsd:decimal",
        }
    }

    /// Map an `xsi:type` value back to a base type, ignoring the namespace
    /// prefix. `base64Binary` is accepted as an alias of `base64`.
    pub fn from_xsi_type(xsi_type: &str) -> Option<Self> {
        let local = xsi_type.rsplit(':').next().unwrap_or(xsi_type);
        match local {
            "base64Binary" => Some(BaseType::Base64),
            other => Self::from_xml_name(other),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BaseType::Int | BaseType::UnsignedInt | BaseType::Long | BaseType::UnsignedLong
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || *self == BaseType::Decimal
    }

    /// Whether the type's size facet counts bytes of the decoded value
    pub fn is_binary(&self) -> bool {
        matches!(self, BaseType::Base64 | BaseType::HexBinary)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_name())
    }
}

impl FromStr for BaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_xml_name(s).ok_or_else(|| format!("Unknown base type: {}", s))
    }
}

/// Allowed length range for string and binary values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl SizeRange {
    pub fn new(min_length: Option<u32>, max_length: Option<u32>) -> Self {
        Self {
            min_length,
            max_length,
        }
    }

    pub fn max(max_length: u32) -> Self {
        Self::new(None, Some(max_length))
    }

    pub fn contains(&self, length: usize) -> bool {
        self.min_length.is_none_or(|min| length >= min as usize)
            && self.max_length.is_none_or(|max| length <= max as usize)
    }
}

impl fmt::Display for SizeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min_length, self.max_length) {
            (Some(min), Some(max)) => write!(f, "{}..{}", min, max),
            (Some(min), None) => write!(f, "{}..", min),
            (None, Some(max)) => write!(f, "..{}", max),
            (None, None) => f.write_str(".."),
        }
    }
}

/// Allowed numeric range, with optional step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, with = "bound_serde", skip_serializing_if = "Option::is_none")]
    pub min_inclusive: Option<i128>,
    #[serde(default, with = "bound_serde", skip_serializing_if = "Option::is_none")]
    pub max_inclusive: Option<i128>,
    #[serde(default, with = "bound_serde", skip_serializing_if = "Option::is_none")]
    pub step: Option<i128>,
}

impl ValueRange {
    pub fn new(min_inclusive: Option<i128>, max_inclusive: Option<i128>) -> Self {
        Self {
            min_inclusive,
            max_inclusive,
            step: None,
        }
    }

    pub fn with_step(mut self, step: i128) -> Self {
        self.step = Some(step);
        self
    }

    pub fn contains(&self, value: i128) -> bool {
        let in_bounds = self.min_inclusive.is_none_or(|min| value >= min)
            && self.max_inclusive.is_none_or(|max| value <= max);
        let on_step = match self.step {
            Some(step) if step > 0 => value
                .checked_sub(self.min_inclusive.unwrap_or(0))
                .is_some_and(|offset| offset.rem_euclid(step) == 0),
            _ => true,
        };
        in_bounds && on_step
    }

    /// Bounds check for decimal values (the step facet is ignored)
    pub fn contains_decimal(&self, value: f64) -> bool {
        self.min_inclusive.is_none_or(|min| value >= min as f64)
            && self.max_inclusive.is_none_or(|max| value <= max as f64)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min_inclusive {
            Some(min) => write!(f, "[{}", min)?,
            None => f.write_str("[")?,
        }
        f.write_str(":")?;
        match self.max_inclusive {
            Some(max) => write!(f, "{}]", max)?,
            None => f.write_str("]")?,
        }
        if let Some(step) = self.step {
            write!(f, " step {}", step)?;
        }
        Ok(())
    }
}

/// Serde helper storing i128 bounds as i64/u64 so YAML and JSON can carry
/// the full unsignedLong and long ranges.
mod bound_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bound {
        Signed(i64),
        Unsigned(u64),
    }

    pub fn serialize<S: Serializer>(value: &Option<i128>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => {
                if let Ok(signed) = i64::try_from(*v) {
                    serializer.serialize_i64(signed)
                } else if let Ok(unsigned) = u64::try_from(*v) {
                    serializer.serialize_u64(unsigned)
                } else {
                    Err(serde::ser::Error::custom(format!("bound {} out of range", v)))
                }
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i128>, D::Error> {
        Ok(Option::<Bound>::deserialize(deserializer)?.map(|b| match b {
            Bound::Signed(v) => v as i128,
            Bound::Unsigned(v) => v as i128,
        }))
    }
}

/// Comma-separated list facet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
    /// Size of the whole list string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeRange>,
}

impl ListConstraint {
    pub fn contains_count(&self, count: usize) -> bool {
        self.min_items.is_none_or(|min| count >= min as usize)
            && self.max_items.is_none_or(|max| count <= max as usize)
    }
}

/// Type and facets of a parameter or named data type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Syntax {
    #[serde(default)]
    pub base: BaseType,
    /// Named data type this syntax refers to (e.g. `Alias`, `IPAddress`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<SizeRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<ValueRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Default value in CWMP string form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Value always reads back as an empty string (passwords, keys)
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

impl Syntax {
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Syntax referring to a named data type
    pub fn of_data_type(name: impl Into<String>) -> Self {
        Self {
            data_type: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_data_type(mut self, name: impl Into<String>) -> Self {
        self.data_type = Some(name.into());
        self
    }

    pub fn with_size(mut self, min_length: Option<u32>, max_length: Option<u32>) -> Self {
        self.sizes.push(SizeRange::new(min_length, max_length));
        self
    }

    pub fn with_max_length(self, max_length: u32) -> Self {
        self.with_size(None, Some(max_length))
    }

    pub fn with_range(mut self, min_inclusive: Option<i128>, max_inclusive: Option<i128>) -> Self {
        self.ranges.push(ValueRange::new(min_inclusive, max_inclusive));
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn with_enumeration<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumerations.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_list(mut self, list: ListConstraint) -> Self {
        self.list = Some(list);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn is_list(&self) -> bool {
        self.list.is_some()
    }

    /// Layer this syntax over a resolved data type syntax.
    ///
    /// Facets declared here win; anything left unset is inherited. The base
    /// type always comes from the data type.
    pub fn overlay(&self, inherited: &Syntax) -> Syntax {
        fn pick<T: Clone>(own: &[T], inherited: &[T]) -> Vec<T> {
            if own.is_empty() {
                inherited.to_vec()
            } else {
                own.to_vec()
            }
        }

        Syntax {
            base: inherited.base,
            data_type: self.data_type.clone(),
            list: self.list.clone().or_else(|| inherited.list.clone()),
            sizes: pick(&self.sizes, &inherited.sizes),
            ranges: pick(&self.ranges, &inherited.ranges),
            patterns: pick(&self.patterns, &inherited.patterns),
            enumerations: pick(&self.enumerations, &inherited.enumerations),
            units: self.units.clone().or_else(|| inherited.units.clone()),
            default: self.default.clone().or_else(|| inherited.default.clone()),
            hidden: self.hidden || inherited.hidden,
        }
    }
}

/// A named data type (TR-106 `dataType`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeDef {
    pub name: String,
    /// Parent data type this one restricts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub syntax: Syntax,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl DataTypeDef {
    pub fn new(name: impl Into<String>, syntax: Syntax) -> Self {
        Self {
            name: name.into(),
            base: None,
            syntax,
            description: String::new(),
        }
    }

    pub fn derived(name: impl Into<String>, base: impl Into<String>, syntax: Syntax) -> Self {
        Self {
            name: name.into(),
            base: Some(base.into()),
            syntax,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

const IPV4_PATTERN: &str = r"((25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])";
const MAC_PATTERN: &str = r"([0-9A-Fa-f][0-9A-Fa-f]:){5}([0-9A-Fa-f][0-9A-Fa-f])";
const EUI64_PATTERN: &str = r"([0-9A-Fa-f][0-9A-Fa-f]:){7}([0-9A-Fa-f][0-9A-Fa-f])";
const UUID_PATTERN: &str =
    r"[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[1-5][a-fA-F0-9]{3}-[89abAB][a-fA-F0-9]{3}-[a-fA-F0-9]{12}";

/// Data types every model can reference without declaring them
pub fn builtin_data_types() -> Vec<DataTypeDef> {
    vec![
        DataTypeDef::new("Alias", Syntax::new(BaseType::String).with_max_length(64))
            .with_description("Non-volatile handle used to reference a table row"),
        DataTypeDef::new("IPAddress", Syntax::new(BaseType::String).with_max_length(45)),
        DataTypeDef::derived(
            "IPv4Address",
            "IPAddress",
            Syntax::default()
                .with_max_length(15)
                .with_pattern("")
                .with_pattern(IPV4_PATTERN),
        ),
        DataTypeDef::derived("IPv6Address", "IPAddress", Syntax::default().with_max_length(45)),
        DataTypeDef::new("IPPrefix", Syntax::new(BaseType::String).with_max_length(49)),
        DataTypeDef::derived("IPv4Prefix", "IPPrefix", Syntax::default().with_max_length(18)),
        DataTypeDef::derived("IPv6Prefix", "IPPrefix", Syntax::default().with_max_length(49)),
        DataTypeDef::new(
            "MACAddress",
            Syntax::new(BaseType::String)
                .with_max_length(17)
                .with_pattern("")
                .with_pattern(MAC_PATTERN),
        ),
        DataTypeDef::new(
            "IEEE_EUI64",
            Syntax::new(BaseType::String)
                .with_max_length(23)
                .with_pattern("")
                .with_pattern(EUI64_PATTERN),
        ),
        DataTypeDef::new(
            "UUID",
            Syntax::new(BaseType::String)
                .with_size(Some(36), Some(36))
                .with_pattern(UUID_PATTERN),
        ),
        DataTypeDef::new("StatsCounter32", Syntax::new(BaseType::UnsignedInt)),
        DataTypeDef::new("StatsCounter64", Syntax::new(BaseType::UnsignedLong)),
        DataTypeDef::new("Dbm1000", Syntax::new(BaseType::Int).with_units("dBm/1000")),
    ]
}
