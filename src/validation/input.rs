//! Input validation for names, path templates and alias values.
//!
//! These checks run on anything that arrives from outside: imported schema
//! files, parameter lists and ACS-supplied aliases.

use crate::path::{ParameterPath, Segment, is_valid_name};
use serde::Serialize;
use thiserror::Error;

/// Maximum length of a full parameter path (TR-069 `string(256)`)
pub const MAX_PATH_LENGTH: usize = 256;

/// Maximum length of a single object or parameter name
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length of an `Alias` value
pub const MAX_ALIAS_LENGTH: usize = 64;

/// Errors that can occur during input validation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ValidationError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Input contains invalid characters
    #[error("{field} contains invalid characters: {reason}")]
    InvalidCharacters { field: &'static str, reason: String },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_length(field: &'static str, value: &str, max: usize) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: value.len(),
        });
    }
    Ok(())
}

/// Validate an object or parameter name.
///
/// # Rules
///
/// - Must not be empty or exceed 64 characters
/// - Must start with a letter or underscore
/// - May contain letters, digits, underscores and hyphens
///
/// # Examples
///
/// ```
/// use cwmp_data_model::validation::input::validate_name;
///
/// assert!(validate_name("BondingGroup").is_ok());
/// assert!(validate_name("X_ACME_Feature").is_ok());
/// assert!(validate_name("2ndChannel").is_err());
/// assert!(validate_name("Bonding.Group").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    check_length("name", name, MAX_NAME_LENGTH)?;
    if let Some(c) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-') {
        return Err(ValidationError::InvalidCharacters {
            field: "name",
            reason: format!("invalid character: '{}'", c),
        });
    }
    if !is_valid_name(name) {
        return Err(ValidationError::InvalidFormat(
            "name",
            "must start with a letter or underscore".to_string(),
        ));
    }
    Ok(())
}

/// Validate an object path template such as `Device.IP.Interface.{i}.`.
///
/// Templates end with a dot and use `{i}` where instance numbers go;
/// concrete instance numbers and aliases are rejected.
pub fn validate_object_template(path: &str) -> ValidationResult<()> {
    check_length("object path", path, MAX_PATH_LENGTH)?;
    let parsed = ParameterPath::parse(path).map_err(|e| ValidationError::InvalidFormat("object path", e.to_string()))?;
    if !parsed.is_partial() {
        return Err(ValidationError::InvalidFormat(
            "object path",
            format!("{} must end with '.'", path),
        ));
    }
    if parsed
        .segments()
        .iter()
        .any(|s| matches!(s, Segment::Instance(_) | Segment::Alias(_)))
    {
        return Err(ValidationError::InvalidFormat(
            "object path",
            format!("{} must use {{i}} instead of instance numbers", path),
        ));
    }
    Ok(())
}

/// Validate a full parameter path (instance numbers or aliases allowed).
pub fn validate_parameter_path(path: &str) -> ValidationResult<()> {
    check_length("parameter path", path, MAX_PATH_LENGTH)?;
    let parsed =
        ParameterPath::parse(path).map_err(|e| ValidationError::InvalidFormat("parameter path", e.to_string()))?;
    if parsed.is_partial() {
        return Err(ValidationError::InvalidFormat(
            "parameter path",
            format!("{} names an object, not a parameter", path),
        ));
    }
    Ok(())
}

/// Validate an `Alias` value.
///
/// # Rules
///
/// - Must not be empty or exceed 64 characters
/// - Must start with a letter
/// - Must not contain `.`, `[` or `]`, which would break path addressing
///
/// # Examples
///
/// ```
/// use cwmp_data_model::validation::input::validate_alias;
///
/// assert!(validate_alias("cpe-1").is_ok());
/// assert!(validate_alias("wan").is_ok());
/// assert!(validate_alias("1st").is_err());
/// assert!(validate_alias("a.b").is_err());
/// ```
pub fn validate_alias(alias: &str) -> ValidationResult<()> {
    check_length("alias", alias, MAX_ALIAS_LENGTH)?;
    if let Some(c) = alias.chars().find(|c| matches!(c, '.' | '[' | ']') || c.is_control()) {
        return Err(ValidationError::InvalidCharacters {
            field: "alias",
            reason: format!("invalid character: '{}'", c.escape_default()),
        });
    }
    if !alias.starts_with(|c: char| c.is_alphabetic()) {
        return Err(ValidationError::InvalidFormat(
            "alias",
            "must start with a letter".to_string(),
        ));
    }
    Ok(())
}

/// Validate a ParameterKey (TR-069 `string(32)`, may be empty).
pub fn validate_parameter_key(key: &str) -> ValidationResult<()> {
    if key.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "parameter key",
            max: 32,
            actual: key.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Device").is_ok());
        assert!(validate_name("IPv4Address").is_ok());
        assert!(validate_name("_private").is_ok());

        assert_eq!(validate_name(""), Err(ValidationError::Empty("name")));
        assert!(matches!(
            validate_name(&"a".repeat(65)),
            Err(ValidationError::TooLong { max: 64, actual: 65, .. })
        ));
        assert!(matches!(
            validate_name("Has Space"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
        assert!(matches!(validate_name("-lead"), Err(ValidationError::InvalidFormat(..))));
    }

    #[test]
    fn test_validate_object_template() {
        assert!(validate_object_template("Device.").is_ok());
        assert!(validate_object_template("Device.DSL.BondingGroup.{i}.BondedChannel.{i}.").is_ok());

        assert!(validate_object_template("Device.IP").is_err());
        assert!(validate_object_template("Device.IP.Interface.1.").is_err());
        assert!(validate_object_template("Device.IP.Interface.[wan].").is_err());
        assert!(validate_object_template("Device..IP.").is_err());
        assert!(validate_object_template("").is_err());
    }

    #[test]
    fn test_validate_parameter_path() {
        assert!(validate_parameter_path("Device.IP.Interface.1.Name").is_ok());
        assert!(validate_parameter_path("Device.IP.Interface.[wan].Name").is_ok());
        assert!(validate_parameter_path("Device.IP.").is_err());
        assert!(validate_parameter_path(&format!("Device.{}", "A".repeat(300))).is_err());
    }

    #[test]
    fn test_validate_alias() {
        assert!(validate_alias("cpe-12").is_ok());
        assert!(validate_alias("Ünïcode").is_ok());

        assert_eq!(validate_alias(""), Err(ValidationError::Empty("alias")));
        assert!(validate_alias("9lives").is_err());
        assert!(validate_alias("-dash").is_err());
        assert!(validate_alias("a[1]").is_err());
        assert!(validate_alias(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_parameter_key() {
        assert!(validate_parameter_key("").is_ok());
        assert!(validate_parameter_key(&"k".repeat(32)).is_ok());
        assert!(validate_parameter_key(&"k".repeat(33)).is_err());
    }
}
