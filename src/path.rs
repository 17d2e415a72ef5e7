//! Parameter path grammar
//!
//! CWMP addresses everything in the device tree with dotted paths. A path that
//! ends in `.` names an object (a "partial path"), anything else names a
//! parameter. Table rows are addressed by instance number, or by `[alias]`
//! when alias-based addressing is in use. Schema definitions put `{i}` where
//! an instance number would go.
//!
//! ```rust
//! use cwmp_data_model::path::ParameterPath;
//!
//! let path = ParameterPath::parse("Device.IP.Interface.2.Enable").unwrap();
//! assert_eq!(path.to_template(), "Device.IP.Interface.{i}.Enable");
//! assert_eq!(path.leaf(), Some("Enable"));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder used by schema templates for a table row position
pub const INSTANCE_PLACEHOLDER: &str = "{i}";

/// One dot-separated component of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object or parameter name
    Name(String),
    /// Table row instance number (always >= 1)
    Instance(u32),
    /// `{i}` in a schema template
    Placeholder,
    /// `[alias]` reference to a table row
    Alias(String),
}

impl Segment {
    fn is_row(&self) -> bool {
        !matches!(self, Segment::Name(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => f.write_str(name),
            Segment::Instance(n) => write!(f, "{}", n),
            Segment::Placeholder => f.write_str(INSTANCE_PLACEHOLDER),
            Segment::Alias(alias) => write!(f, "[{}]", alias),
        }
    }
}

/// Errors raised while parsing a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path '{path}' has an empty segment at position {index}")]
    EmptySegment { path: String, index: usize },

    #[error("Invalid name '{segment}' in path '{path}'")]
    InvalidName { path: String, segment: String },

    #[error("Invalid instance number '{segment}' in path '{path}'")]
    InvalidInstance { path: String, segment: String },

    #[error("Instance segment '{segment}' in path '{path}' does not follow a table name")]
    MisplacedInstance { path: String, segment: String },
}

/// A parsed CWMP path (instance path, template, or partial path)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterPath {
    segments: Vec<Segment>,
    partial: bool,
}

impl ParameterPath {
    /// Parse a path string.
    ///
    /// The empty string parses to the root path, which is partial and has no
    /// segments.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Ok(Self::root());
        }

        let partial = path.ends_with('.');
        let body = path.strip_suffix('.').unwrap_or(path);
        let mut segments = Vec::new();

        for (index, raw) in body.split('.').enumerate() {
            if raw.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                    index,
                });
            }

            let segment = if raw == INSTANCE_PLACEHOLDER {
                Segment::Placeholder
            } else if let Some(alias) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                if alias.is_empty() || alias.contains(['[', ']']) {
                    return Err(PathError::InvalidName {
                        path: path.to_string(),
                        segment: raw.to_string(),
                    });
                }
                Segment::Alias(alias.to_string())
            } else if raw.bytes().all(|b| b.is_ascii_digit()) {
                match raw.parse::<u32>() {
                    Ok(n) if n > 0 => Segment::Instance(n),
                    _ => {
                        return Err(PathError::InvalidInstance {
                            path: path.to_string(),
                            segment: raw.to_string(),
                        });
                    }
                }
            } else if is_valid_name(raw) {
                Segment::Name(raw.to_string())
            } else {
                return Err(PathError::InvalidName {
                    path: path.to_string(),
                    segment: raw.to_string(),
                });
            };

            // Row segments must follow a table name, never the root or another row
            if segment.is_row() && !matches!(segments.last(), Some(Segment::Name(_))) {
                return Err(PathError::MisplacedInstance {
                    path: path.to_string(),
                    segment: raw.to_string(),
                });
            }

            segments.push(segment);
        }

        Ok(Self { segments, partial })
    }

    /// The root path (empty string)
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            partial: true,
        }
    }

    /// Build a path from segments
    pub fn from_segments(segments: Vec<Segment>, partial: bool) -> Self {
        Self { segments, partial }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path names an object (ends with `.`)
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Whether the path contains no instance numbers or aliases
    pub fn is_template(&self) -> bool {
        !self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Instance(_) | Segment::Alias(_)))
    }

    pub fn has_aliases(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Alias(_)))
    }

    /// Whether the last segment addresses a table row
    pub fn ends_with_row(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_row)
    }

    /// Replace instance numbers and aliases with `{i}`
    pub fn template(&self) -> Self {
        let segments = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Instance(_) | Segment::Alias(_) => Segment::Placeholder,
                other => other.clone(),
            })
            .collect();
        Self {
            segments,
            partial: self.partial,
        }
    }

    pub fn to_template(&self) -> String {
        self.template().to_string()
    }

    pub fn instance_numbers(&self) -> Vec<u32> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Instance(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Last name segment (parameter name, or object name for partial paths)
    pub fn leaf(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| match s {
            Segment::Name(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// The path one level up.
    ///
    /// The parent of a parameter is the object holding it; the parent of a
    /// table row is the table itself (`Device.IP.Interface.1.` has parent
    /// `Device.IP.Interface.`).
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self {
            segments,
            partial: true,
        })
    }

    /// The object a path refers to: itself for partial paths, the parent for
    /// parameter paths.
    pub fn object_path(&self) -> Self {
        if self.partial {
            self.clone()
        } else {
            self.parent().unwrap_or_else(Self::root)
        }
    }

    /// Child object path (`name.`)
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Name(name.to_string()));
        Self {
            segments,
            partial: true,
        }
    }

    /// Parameter path under this object
    pub fn parameter(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Name(name.to_string()));
        Self {
            segments,
            partial: false,
        }
    }

    /// Row path under this table
    pub fn with_instance(&self, instance: u32) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Instance(instance));
        Self {
            segments,
            partial: true,
        }
    }

    /// Whether `other` lies at or below this partial path
    pub fn contains(&self, other: &ParameterPath) -> bool {
        self.partial
            && other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

impl fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        if self.partial && !self.segments.is_empty() {
            f.write_str(".")?;
        }
        Ok(())
    }
}

impl FromStr for ParameterPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check a single object or parameter name.
///
/// Names start with a letter or underscore and continue with letters,
/// digits, underscores or hyphens.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Convert an instance path string into its schema template
pub fn template_of(path: &str) -> Result<String, PathError> {
    Ok(ParameterPath::parse(path)?.to_template())
}

/// Order paths segment by segment, comparing instance numbers numerically
/// so that `X.2.` sorts before `X.10.`.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameter_path() {
        let path = ParameterPath::parse("Device.DSL.BondingGroup.3.Enable").unwrap();
        assert!(!path.is_partial());
        assert_eq!(path.instance_numbers(), vec![3]);
        assert_eq!(path.leaf(), Some("Enable"));
        assert_eq!(path.to_string(), "Device.DSL.BondingGroup.3.Enable");
        assert_eq!(path.object_path().to_string(), "Device.DSL.BondingGroup.3.");
    }

    #[test]
    fn test_template_round_trip() {
        let template = "Device.DSL.BondingGroup.{i}.BondedChannel.{i}.Ethernet.";
        let path = ParameterPath::parse(template).unwrap();
        assert!(path.is_template());
        assert!(path.is_partial());
        assert_eq!(path.to_string(), template);
        assert_eq!(
            template_of("Device.DSL.BondingGroup.1.BondedChannel.7.Ethernet.").unwrap(),
            template
        );
    }

    #[test]
    fn test_alias_segments() {
        let path = ParameterPath::parse("Device.IP.Interface.[cpe-wan].Name").unwrap();
        assert!(path.has_aliases());
        assert_eq!(path.to_template(), "Device.IP.Interface.{i}.Name");
    }

    #[test]
    fn test_root_path() {
        let root = ParameterPath::parse("").unwrap();
        assert!(root.is_root());
        assert!(root.is_partial());
        assert_eq!(root.to_string(), "");
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_parent_of_row_is_table() {
        let row = ParameterPath::parse("Device.IP.Interface.1.").unwrap();
        assert!(row.ends_with_row());
        assert_eq!(row.parent().unwrap().to_string(), "Device.IP.Interface.");
    }

    #[test]
    fn test_rejects_malformed_paths() {
        assert!(matches!(
            ParameterPath::parse("Device..Enable"),
            Err(PathError::EmptySegment { index: 1, .. })
        ));
        assert!(matches!(
            ParameterPath::parse("Device.IP.Interface.0."),
            Err(PathError::InvalidInstance { .. })
        ));
        assert!(matches!(
            ParameterPath::parse("1.Device."),
            Err(PathError::MisplacedInstance { .. })
        ));
        assert!(matches!(
            ParameterPath::parse("Device.IP.Interface.1.2."),
            Err(PathError::MisplacedInstance { .. })
        ));
        assert!(matches!(
            ParameterPath::parse("Device.9lives"),
            Err(PathError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_contains() {
        let table = ParameterPath::parse("Device.IP.Interface.").unwrap();
        let param = ParameterPath::parse("Device.IP.Interface.4.Stats.BytesSent").unwrap();
        let other = ParameterPath::parse("Device.IP.ActivePort.1.").unwrap();
        assert!(table.contains(&param));
        assert!(!table.contains(&other));
        assert!(ParameterPath::root().contains(&other));
    }

    #[test]
    fn test_natural_ordering() {
        let mut paths = vec!["A.10.", "A.2.", "A.1.X", "A.1."];
        paths.sort_by(|a, b| compare_paths(a, b));
        assert_eq!(paths, vec!["A.1.", "A.1.X", "A.2.", "A.10."]);
    }

    #[test]
    fn test_name_rules() {
        assert!(is_valid_name("X_BROADCOM-COM_Enable"));
        assert!(is_valid_name("_hidden"));
        assert!(!is_valid_name("-dash"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("has space"));
    }
}
