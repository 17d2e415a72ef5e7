//! Typed parameter values
//!
//! On the wire every value travels as a string tagged with an `xsi:type`.
//! [`ParameterValue`] holds the decoded form and knows how to check itself
//! against a [`Syntax`].

use crate::models::types::{BaseType, Syntax};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// `0001-01-01T00:00:00Z`, the dateTime CWMP uses for "unknown"
pub const UNKNOWN_TIME: &str = "0001-01-01T00:00:00Z";

static PATTERN_CACHE: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Errors raised while parsing or checking a value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("Expected a value of type {expected}, got {actual}")]
    TypeMismatch { expected: BaseType, actual: String },

    #[error("'{value}' is not a valid {base} value: {reason}")]
    Unparsable {
        base: BaseType,
        value: String,
        reason: String,
    },

    #[error("Length {length} outside the allowed sizes {allowed}")]
    Size { length: usize, allowed: String },

    #[error("Value {value} outside the allowed ranges {allowed}")]
    OutOfRange { value: String, allowed: String },

    #[error("'{value}' does not match any allowed pattern")]
    PatternMismatch { value: String },

    #[error("'{value}' is not one of {allowed:?}")]
    NotEnumerated { value: String, allowed: Vec<String> },

    #[error("List has {count} items, allowed {allowed}")]
    ListLength { count: usize, allowed: String },

    #[error("'{0}' is not a valid UUID")]
    InvalidUuid(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ValueError {
    /// CWMP fault code for this error
    pub fn fault_code(&self) -> u32 {
        match self {
            ValueError::TypeMismatch { .. } => crate::rpc::FAULT_INVALID_TYPE,
            ValueError::InvalidPattern { .. } => crate::rpc::FAULT_INTERNAL_ERROR,
            _ => crate::rpc::FAULT_INVALID_VALUE,
        }
    }
}

/// A decoded parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ParameterValue {
    String(String),
    Int(i32),
    UnsignedInt(u32),
    Long(i64),
    UnsignedLong(u64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Base64(Vec<u8>),
    HexBinary(Vec<u8>),
    Decimal(f64),
}

impl ParameterValue {
    /// Parse the CWMP string form of a value
    pub fn parse(base: BaseType, raw: &str) -> Result<Self, ValueError> {
        let unparsable = |reason: String| ValueError::Unparsable {
            base,
            value: raw.to_string(),
            reason,
        };
        let trimmed = raw.trim();

        Ok(match base {
            BaseType::String => ParameterValue::String(raw.to_string()),
            BaseType::Int => ParameterValue::Int(trimmed.parse().map_err(|e| unparsable(format!("{}", e)))?),
            BaseType::UnsignedInt => {
                ParameterValue::UnsignedInt(trimmed.parse().map_err(|e| unparsable(format!("{}", e)))?)
            }
            BaseType::Long => ParameterValue::Long(trimmed.parse().map_err(|e| unparsable(format!("{}", e)))?),
            BaseType::UnsignedLong => {
                ParameterValue::UnsignedLong(trimmed.parse().map_err(|e| unparsable(format!("{}", e)))?)
            }
            BaseType::Boolean => ParameterValue::Boolean(
                parse_bool(trimmed).ok_or_else(|| unparsable("expected true, false, 1 or 0".to_string()))?,
            ),
            BaseType::DateTime => ParameterValue::DateTime(parse_datetime(trimmed).map_err(unparsable)?),
            BaseType::Base64 => ParameterValue::Base64(
                general_purpose::STANDARD
                    .decode(trimmed)
                    .map_err(|e| unparsable(e.to_string()))?,
            ),
            BaseType::HexBinary => ParameterValue::HexBinary(decode_hex(trimmed).map_err(unparsable)?),
            BaseType::Decimal => {
                let value: f64 = trimmed.parse().map_err(|e| unparsable(format!("{}", e)))?;
                if !value.is_finite() {
                    return Err(unparsable("value is not finite".to_string()));
                }
                ParameterValue::Decimal(value)
            }
        })
    }

    /// Parse and check a value against a resolved syntax.
    ///
    /// List-valued parameters keep their comma-separated string form.
    pub fn parse_with_syntax(syntax: &Syntax, raw: &str) -> Result<Self, ValueError> {
        let value = if syntax.is_list() {
            ParameterValue::String(raw.to_string())
        } else {
            Self::parse(syntax.base, raw)?
        };
        value.validate(syntax)?;
        Ok(value)
    }

    /// Initial value for a freshly created parameter.
    ///
    /// Uses the declared default when it is valid; otherwise the zero value
    /// of the base type, nudged into the first range or enumeration when the
    /// zero value would be rejected.
    pub fn default_for(syntax: &Syntax) -> Self {
        if let Some(default) = syntax.default.as_deref() {
            match Self::parse_with_syntax(syntax, default) {
                Ok(value) => return value,
                Err(e) => tracing::debug!("Ignoring invalid default '{}': {}", default, e),
            }
        }

        if syntax.is_list() {
            return ParameterValue::String(String::new());
        }

        let zero = Self::zero(syntax.base);
        if zero.validate(syntax).is_ok() {
            return zero;
        }

        let nudged = match (syntax.ranges.first(), syntax.enumerations.first()) {
            (Some(range), _) if syntax.base.is_numeric() => range
                .min_inclusive
                .and_then(|min| Self::parse(syntax.base, &min.to_string()).ok()),
            (_, Some(first)) => Self::parse(syntax.base, first).ok(),
            _ => None,
        };
        nudged.unwrap_or(zero)
    }

    fn zero(base: BaseType) -> Self {
        match base {
            BaseType::String => ParameterValue::String(String::new()),
            BaseType::Int => ParameterValue::Int(0),
            BaseType::UnsignedInt => ParameterValue::UnsignedInt(0),
            BaseType::Long => ParameterValue::Long(0),
            BaseType::UnsignedLong => ParameterValue::UnsignedLong(0),
            BaseType::Boolean => ParameterValue::Boolean(false),
            BaseType::DateTime => ParameterValue::DateTime(unknown_time()),
            BaseType::Base64 => ParameterValue::Base64(Vec::new()),
            BaseType::HexBinary => ParameterValue::HexBinary(Vec::new()),
            BaseType::Decimal => ParameterValue::Decimal(0.0),
        }
    }

    pub fn base_type(&self) -> BaseType {
        match self {
            ParameterValue::String(_) => BaseType::String,
            ParameterValue::Int(_) => BaseType::Int,
            ParameterValue::UnsignedInt(_) => BaseType::UnsignedInt,
            ParameterValue::Long(_) => BaseType::Long,
            ParameterValue::UnsignedLong(_) => BaseType::UnsignedLong,
            ParameterValue::Boolean(_) => BaseType::Boolean,
            ParameterValue::DateTime(_) => BaseType::DateTime,
            ParameterValue::Base64(_) => BaseType::Base64,
            ParameterValue::HexBinary(_) => BaseType::HexBinary,
            ParameterValue::Decimal(_) => BaseType::Decimal,
        }
    }

    pub fn xsi_type(&self) -> &'static str {
        self.base_type().xsi_type()
    }

    /// Whether this is the dateTime Unknown Time
    pub fn is_unknown_time(&self) -> bool {
        matches!(self, ParameterValue::DateTime(dt) if *dt == unknown_time())
    }

    /// CWMP string form
    pub fn to_cwmp_string(&self) -> String {
        match self {
            ParameterValue::String(s) => s.clone(),
            ParameterValue::Int(v) => v.to_string(),
            ParameterValue::UnsignedInt(v) => v.to_string(),
            ParameterValue::Long(v) => v.to_string(),
            ParameterValue::UnsignedLong(v) => v.to_string(),
            ParameterValue::Boolean(v) => v.to_string(),
            ParameterValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ParameterValue::Base64(bytes) => general_purpose::STANDARD.encode(bytes),
            ParameterValue::HexBinary(bytes) => encode_hex(bytes),
            ParameterValue::Decimal(v) => v.to_string(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            ParameterValue::String(s) => JsonValue::String(s.clone()),
            ParameterValue::Int(v) => JsonValue::from(*v),
            ParameterValue::UnsignedInt(v) => JsonValue::from(*v),
            ParameterValue::Long(v) => JsonValue::from(*v),
            ParameterValue::UnsignedLong(v) => JsonValue::from(*v),
            ParameterValue::Boolean(v) => JsonValue::Bool(*v),
            ParameterValue::Decimal(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ParameterValue::DateTime(_) | ParameterValue::Base64(_) | ParameterValue::HexBinary(_) => {
                JsonValue::String(self.to_cwmp_string())
            }
        }
    }

    /// Convert a JSON value. Strings are parsed from their CWMP form, so any
    /// base type accepts them.
    pub fn from_json(base: BaseType, value: &JsonValue) -> Result<Self, ValueError> {
        let mismatch = |actual: &str| ValueError::TypeMismatch {
            expected: base,
            actual: actual.to_string(),
        };
        match value {
            JsonValue::String(s) => Self::parse(base, s),
            JsonValue::Bool(b) if base == BaseType::Boolean => Ok(ParameterValue::Boolean(*b)),
            JsonValue::Number(n) if base.is_numeric() => Self::parse(base, &n.to_string()),
            JsonValue::Null => Err(mismatch("null")),
            JsonValue::Bool(_) => Err(mismatch("boolean")),
            JsonValue::Number(_) => Err(mismatch("number")),
            JsonValue::Array(_) => Err(mismatch("array")),
            JsonValue::Object(_) => Err(mismatch("object")),
        }
    }

    /// Convert a JSON value and check it against a resolved syntax. Arrays
    /// are accepted for list-valued parameters.
    pub fn from_json_with_syntax(syntax: &Syntax, value: &JsonValue) -> Result<Self, ValueError> {
        if syntax.is_list() {
            let joined = match value {
                JsonValue::String(s) => s.clone(),
                JsonValue::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                _ => {
                    return Err(ValueError::TypeMismatch {
                        expected: BaseType::String,
                        actual: value.to_string(),
                    });
                }
            };
            return Self::parse_with_syntax(syntax, &joined);
        }
        let parsed = Self::from_json(syntax.base, value)?;
        parsed.validate(syntax)?;
        Ok(parsed)
    }

    /// Check this value against a resolved syntax
    pub fn validate(&self, syntax: &Syntax) -> Result<(), ValueError> {
        if let Some(list) = &syntax.list {
            let raw = self.to_cwmp_string();
            if let Some(size) = &list.size {
                let length = raw.chars().count();
                if !size.contains(length) {
                    return Err(ValueError::Size {
                        length,
                        allowed: size.to_string(),
                    });
                }
            }

            let items: Vec<&str> = if raw.is_empty() {
                Vec::new()
            } else {
                raw.split(',').map(str::trim).collect()
            };
            if !list.contains_count(items.len()) {
                return Err(ValueError::ListLength {
                    count: items.len(),
                    allowed: format!(
                        "{}..{}",
                        list.min_items.map(|n| n.to_string()).unwrap_or_default(),
                        list.max_items.map(|n| n.to_string()).unwrap_or_default()
                    ),
                });
            }

            let item_syntax = Syntax {
                list: None,
                ..syntax.clone()
            };
            for item in items {
                Self::parse(syntax.base, item)?.validate_scalar(&item_syntax)?;
            }
            return Ok(());
        }

        self.validate_scalar(syntax)
    }

    fn validate_scalar(&self, syntax: &Syntax) -> Result<(), ValueError> {
        if self.base_type() != syntax.base {
            return Err(ValueError::TypeMismatch {
                expected: syntax.base,
                actual: self.base_type().to_string(),
            });
        }

        let length = match self {
            ParameterValue::String(s) => Some(s.chars().count()),
            ParameterValue::Base64(bytes) | ParameterValue::HexBinary(bytes) => Some(bytes.len()),
            _ => None,
        };
        if let Some(length) = length
            && !syntax.sizes.is_empty()
            && !syntax.sizes.iter().any(|size| size.contains(length))
        {
            return Err(ValueError::Size {
                length,
                allowed: join_display(&syntax.sizes),
            });
        }

        if !syntax.ranges.is_empty() {
            let in_range = match self {
                ParameterValue::Int(v) => syntax.ranges.iter().any(|r| r.contains(*v as i128)),
                ParameterValue::UnsignedInt(v) => syntax.ranges.iter().any(|r| r.contains(*v as i128)),
                ParameterValue::Long(v) => syntax.ranges.iter().any(|r| r.contains(*v as i128)),
                ParameterValue::UnsignedLong(v) => syntax.ranges.iter().any(|r| r.contains(*v as i128)),
                ParameterValue::Decimal(v) => syntax.ranges.iter().any(|r| r.contains_decimal(*v)),
                _ => true,
            };
            if !in_range {
                return Err(ValueError::OutOfRange {
                    value: self.to_cwmp_string(),
                    allowed: join_display(&syntax.ranges),
                });
            }
        }

        if let ParameterValue::String(s) = self {
            if !syntax.enumerations.is_empty() && !syntax.enumerations.iter().any(|e| e == s) {
                return Err(ValueError::NotEnumerated {
                    value: s.clone(),
                    allowed: syntax.enumerations.clone(),
                });
            }

            if !syntax.patterns.is_empty() {
                let mut matched = false;
                for pattern in &syntax.patterns {
                    let regex = compile_pattern(pattern).map_err(|e| ValueError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })?;
                    if regex.is_match(s) {
                        matched = true;
                        break;
                    }
                }
                if !matched {
                    return Err(ValueError::PatternMismatch { value: s.clone() });
                }
            }

            if syntax.data_type.as_deref() == Some("UUID")
                && !s.is_empty()
                && uuid::Uuid::try_parse(s).is_err()
            {
                return Err(ValueError::InvalidUuid(s.clone()));
            }
        }

        Ok(())
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cwmp_string())
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Boolean(value)
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        ParameterValue::UnsignedInt(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Int(value)
    }
}

/// Compile a syntax pattern anchored at both ends. Compiled patterns are
/// cached for the life of the process.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut cache = PATTERN_CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(&format!("^(?:{})$", pattern))?;
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

fn unknown_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// RFC 3339, or the same without a timezone (taken as UTC)
fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| e.to_string())
}

fn decode_hex(raw: &str) -> Result<Vec<u8>, String> {
    if raw.len() % 2 != 0 {
        return Err("odd number of hex digits".to_string());
    }
    raw.as_bytes()
        .chunks(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            u8::from_str_radix(digits, 16).map_err(|_| format!("invalid hex digits '{}'", digits))
        })
        .collect()
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
