//! Data model: the full set of object definitions for one root model

use super::catalog::Specification;
use super::object::ObjectDef;
use super::parameter::ParameterDef;
use super::types::{DataTypeDef, Syntax, builtin_data_types};
use crate::path::{INSTANCE_PLACEHOLDER, ParameterPath, PathError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

static BUILTIN_DATA_TYPES: Lazy<Vec<DataTypeDef>> = Lazy::new(builtin_data_types);

/// Depth at which data type resolution gives up
const MAX_DATA_TYPE_DEPTH: usize = 16;

/// Errors raised while querying a data model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    #[error("Data type {0} refers to itself")]
    DataTypeCycle(String),

    #[error("No object definition for {0}")]
    UnknownObject(String),

    #[error("No parameter definition for {0}")]
    UnknownParameter(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A root data model such as `Device:2.11` or `InternetGatewayDevice:1.14`
///
/// Objects are keyed by their path template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModel {
    pub name: String,
    /// Model this one extends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<Specification>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_types: Vec<DataTypeDef>,
    #[serde(default, with = "object_list")]
    pub objects: BTreeMap<String, ObjectDef>,
}

/// Objects serialize as a list; the map key is always the object name
mod object_list {
    use super::ObjectDef;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        objects: &BTreeMap<String, ObjectDef>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let list: Vec<&ObjectDef> = objects.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, ObjectDef>, D::Error> {
        let list = Vec::<ObjectDef>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|o| (o.name.clone(), o)).collect())
    }
}

impl DataModel {
    /// Create an empty model. The specification is derived from the model
    /// name when it is recognised.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let specification = Specification::from_model_name(&name);
        Self {
            name,
            specification,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_object(mut self, object: ObjectDef) -> Self {
        self.add_object(object);
        self
    }

    pub fn with_data_type(mut self, data_type: DataTypeDef) -> Self {
        self.add_data_type(data_type);
        self
    }

    /// Insert an object definition, returning the one it replaced
    pub fn add_object(&mut self, object: ObjectDef) -> Option<ObjectDef> {
        self.objects.insert(object.name.clone(), object)
    }

    /// Insert a data type, replacing one with the same name
    pub fn add_data_type(&mut self, data_type: DataTypeDef) {
        match self.data_types.iter_mut().find(|d| d.name == data_type.name) {
            Some(existing) => *existing = data_type,
            None => self.data_types.push(data_type),
        }
    }

    pub fn object(&self, template: &str) -> Option<&ObjectDef> {
        self.objects.get(template)
    }

    pub fn object_mut(&mut self, template: &str) -> Option<&mut ObjectDef> {
        self.objects.get_mut(template)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectDef> {
        self.objects.values()
    }

    pub fn parameter_count(&self) -> usize {
        self.objects.values().map(|o| o.parameters.len()).sum()
    }

    /// Definition of the object an instance path (or parameter path) lives in
    pub fn object_for_path(&self, path: &str) -> Result<&ObjectDef, ModelError> {
        let template = ParameterPath::parse(path)?.object_path().to_template();
        self.objects
            .get(&template)
            .ok_or(ModelError::UnknownObject(template))
    }

    /// Table definition for a collection path such as `Device.IP.Interface.`
    pub fn table_for_collection(&self, path: &str) -> Result<&ObjectDef, ModelError> {
        let parsed = ParameterPath::parse(path)?;
        let template = format!("{}{}.", parsed.object_path().to_template(), INSTANCE_PLACEHOLDER);
        self.objects
            .get(&template)
            .filter(|o| o.is_table())
            .ok_or(ModelError::UnknownObject(template))
    }

    /// Object and parameter definition for a full parameter path
    pub fn parameter(&self, path: &str) -> Result<(&ObjectDef, &ParameterDef), ModelError> {
        let parsed = ParameterPath::parse(path)?;
        let name = match parsed.leaf() {
            Some(name) if !parsed.is_partial() => name,
            _ => return Err(ModelError::UnknownParameter(path.to_string())),
        };
        let object = self.object_for_path(path)?;
        let parameter = object
            .parameter(name)
            .ok_or_else(|| ModelError::UnknownParameter(parsed.to_template()))?;
        Ok((object, parameter))
    }

    /// Objects directly below the given template (single objects and tables)
    pub fn child_objects(&self, template: &str) -> Vec<&ObjectDef> {
        self.objects
            .range(template.to_string()..)
            .take_while(|(name, _)| name.starts_with(template))
            .filter(|(name, object)| {
                name.as_str() != template && object.parent_template().as_deref() == Some(template)
            })
            .map(|(_, object)| object)
            .collect()
    }

    /// Objects without a parent (normally just `Device.` or
    /// `InternetGatewayDevice.`)
    pub fn root_objects(&self) -> Vec<&ObjectDef> {
        self.objects
            .values()
            .filter(|o| o.parent_template().is_none())
            .collect()
    }

    /// Look up a named data type in this model, falling back to the built-in
    /// TR-106 types
    pub fn data_type(&self, name: &str) -> Option<&DataTypeDef> {
        self.data_types
            .iter()
            .find(|d| d.name == name)
            .or_else(|| BUILTIN_DATA_TYPES.iter().find(|d| d.name == name))
    }

    /// Resolve data type references into a self-contained syntax
    pub fn effective_syntax(&self, syntax: &Syntax) -> Result<Syntax, ModelError> {
        let mut visited = Vec::new();
        self.resolve_syntax(syntax, &mut visited)
    }

    fn resolve_syntax(&self, syntax: &Syntax, visited: &mut Vec<String>) -> Result<Syntax, ModelError> {
        let Some(type_name) = syntax.data_type.as_deref() else {
            return Ok(syntax.clone());
        };

        if visited.iter().any(|v| v == type_name) || visited.len() >= MAX_DATA_TYPE_DEPTH {
            return Err(ModelError::DataTypeCycle(type_name.to_string()));
        }
        visited.push(type_name.to_string());

        let definition = self
            .data_type(type_name)
            .ok_or_else(|| ModelError::UnknownDataType(type_name.to_string()))?;

        let mut inherited = definition.syntax.clone();
        inherited.data_type = definition.base.clone();
        let resolved = self.resolve_syntax(&inherited, visited)?;

        Ok(syntax.overlay(&resolved))
    }

    /// Copy every object and data type of `base` that this model does not
    /// define itself
    pub fn merge_from(&mut self, base: &DataModel) {
        for (name, object) in &base.objects {
            self.objects
                .entry(name.clone())
                .or_insert_with(|| object.clone());
        }
        for data_type in &base.data_types {
            if !self.data_types.iter().any(|d| d.name == data_type.name) {
                self.data_types.push(data_type.clone());
            }
        }
        self.base = Some(base.name.clone());
    }

    /// SHA-256 of the canonical JSON form, hex encoded
    pub fn fingerprint(&self) -> Result<String, ModelError> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| ModelError::Serialization(e.to_string()))?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::object::UniqueKey;
    use crate::models::types::BaseType;

    fn sample() -> DataModel {
        DataModel::new("Device:2.11")
            .with_object(
                ObjectDef::new("Device.")
                    .with_parameter(ParameterDef::new("RootDataModelVersion", BaseType::String)),
            )
            .with_object(
                ObjectDef::new("Device.IP.")
                    .with_parameter(ParameterDef::new("InterfaceNumberOfEntries", BaseType::UnsignedInt)),
            )
            .with_object(
                ObjectDef::table("Device.IP.Interface.{i}.")
                    .with_num_entries_parameter("InterfaceNumberOfEntries")
                    .with_unique_key(UniqueKey::non_functional(["Alias"]))
                    .with_parameter(ParameterDef::with_syntax_of("Alias", Syntax::of_data_type("Alias"))),
            )
            .with_object(ObjectDef::new("Device.IP.Interface.{i}.Stats."))
    }

    #[test]
    fn test_specification_from_name() {
        assert_eq!(sample().specification, Some(Specification::Tr181));
    }

    #[test]
    fn test_child_objects() {
        let model = sample();
        let children: Vec<_> = model
            .child_objects("Device.IP.")
            .into_iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(children, vec!["Device.IP.Interface.{i}."]);

        let roots: Vec<_> = model.root_objects().into_iter().map(|o| o.name.as_str()).collect();
        assert_eq!(roots, vec!["Device."]);
    }

    #[test]
    fn test_lookup_by_instance_path() {
        let model = sample();
        let object = model.object_for_path("Device.IP.Interface.7.Stats.").unwrap();
        assert_eq!(object.name, "Device.IP.Interface.{i}.Stats.");

        let (table, param) = model.parameter("Device.IP.Interface.3.Alias").unwrap();
        assert_eq!(table.name, "Device.IP.Interface.{i}.");
        assert_eq!(param.name, "Alias");

        assert!(matches!(
            model.parameter("Device.IP.Interface.3.Missing"),
            Err(ModelError::UnknownParameter(_))
        ));
        assert_eq!(
            model.table_for_collection("Device.IP.Interface.").unwrap().name,
            "Device.IP.Interface.{i}."
        );
        assert!(model.table_for_collection("Device.IP.").is_err());
    }

    #[test]
    fn test_effective_syntax_follows_builtin_chain() {
        let model = sample();
        let resolved = model
            .effective_syntax(&Syntax::of_data_type("IPv4Address"))
            .unwrap();
        assert_eq!(resolved.base, BaseType::String);
        assert_eq!(resolved.sizes[0].max_length, Some(15));
        assert_eq!(resolved.patterns.len(), 2);
    }

    #[test]
    fn test_effective_syntax_detects_cycles() {
        let model = DataModel::new("Test:1.0")
            .with_data_type(DataTypeDef::derived("A", "B", Syntax::default()))
            .with_data_type(DataTypeDef::derived("B", "A", Syntax::default()));
        assert!(matches!(
            model.effective_syntax(&Syntax::of_data_type("A")),
            Err(ModelError::DataTypeCycle(_))
        ));
        assert!(matches!(
            model.effective_syntax(&Syntax::of_data_type("Nope")),
            Err(ModelError::UnknownDataType(_))
        ));
    }

    #[test]
    fn test_merge_from_keeps_own_definitions() {
        let base = sample();
        let mut extension = DataModel::new("Device:2.12").with_object(
            ObjectDef::new("Device.")
                .with_parameter(ParameterDef::new("InterfaceStackNumberOfEntries", BaseType::UnsignedInt)),
        );
        extension.merge_from(&base);
        assert_eq!(extension.base.as_deref(), Some("Device:2.11"));
        assert_eq!(extension.objects.len(), base.objects.len());
        assert!(extension.object("Device.").unwrap().parameter("RootDataModelVersion").is_none());
    }

    #[test]
    fn test_serde_round_trip_keys_objects_by_name() {
        let model = sample();
        let yaml = serde_yaml::to_string(&model).unwrap();
        let back: DataModel = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, model);
        assert_eq!(model.fingerprint().unwrap(), back.fingerprint().unwrap());
    }
}
