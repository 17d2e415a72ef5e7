//! In-memory instance tree
//!
//! A [`DeviceTree`] holds the object instances and parameter values of one
//! device, shaped by a [`DataModel`]. The RPC-facing operations live in
//! `methods.rs`; this module covers construction, lookup and the
//! device-side write path.
//!
//! ```rust
//! use cwmp_data_model::models::bundled_model;
//! use cwmp_data_model::tree::DeviceTree;
//!
//! let mut tree = DeviceTree::from_model(bundled_model("tr-181").unwrap()).unwrap();
//! let (instance, _) = tree.add_object("Device.IP.Interface.", "key-1").unwrap();
//! assert_eq!(instance, 1);
//! assert_eq!(tree.value("Device.IP.InterfaceNumberOfEntries").unwrap().to_string(), "1");
//! ```

mod error;
mod methods;
mod snapshot;
mod unique;

pub use error::TreeError;
pub use snapshot::TreeSnapshot;

use crate::config::ValidationConfig;
use crate::models::data_model::{DataModel, ModelError};
use crate::models::object::ObjectDef;
use crate::models::parameter::{Access, NotificationLevel, ParameterDef};
use crate::models::typed::CwmpObject;
use crate::models::types::{BaseType, Syntax};
use crate::path::{ParameterPath, Segment, compare_paths};
use crate::rpc::ValueChange;
use crate::validation::input::validate_alias;
use crate::value::{ParameterValue, ValueError};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Name of the parameter alias-based addressing matches against
pub const ALIAS: &str = "Alias";

#[derive(Debug, Clone, PartialEq)]
struct ParameterState {
    value: ParameterValue,
    notification: NotificationLevel,
    access_list: Vec<String>,
    /// Set once the ACS has written the parameter
    written: bool,
}

impl ParameterState {
    fn new(value: ParameterValue, notification: NotificationLevel) -> Self {
        Self {
            value,
            notification,
            access_list: Vec::new(),
            written: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ObjectInstance {
    template: String,
    values: BTreeMap<String, ParameterState>,
}

#[derive(Debug, Clone, PartialEq)]
struct Collection {
    template: String,
    next_instance: u64,
}

/// Who is making a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// SetParameterValues and friends: access checked, never notified
    Acs,
    /// The device itself: access bypassed, notified
    Device,
    /// Bookkeeping (counters, ParameterKey, restore): neither
    Tree,
}

/// A value as it arrives from one of the write paths
enum Incoming<'a> {
    Raw {
        value: &'a str,
        xsi_type: Option<&'a str>,
    },
    Typed(ParameterValue),
    Json(&'a JsonValue),
}

/// A checked change waiting to be applied
#[derive(Debug, Clone)]
struct StagedChange {
    object_path: String,
    name: String,
    value: ParameterValue,
}

/// Object instances and parameter values of one device
#[derive(Debug, Clone)]
pub struct DeviceTree {
    model: Arc<DataModel>,
    config: ValidationConfig,
    /// Resolved syntax per parameter template
    syntaxes: HashMap<String, Syntax>,
    objects: BTreeMap<String, ObjectInstance>,
    collections: BTreeMap<String, Collection>,
    parameter_key: String,
    pending: BTreeMap<String, ValueChange>,
}

impl DeviceTree {
    /// Build a tree with every single-instance object and each table's
    /// `minEntries` rows, all holding default values
    pub fn new(model: Arc<DataModel>, config: ValidationConfig) -> Result<Self, TreeError> {
        let mut tree = Self::empty(model, config)?;
        tree.instantiate_roots(true)?;
        Ok(tree)
    }

    pub fn from_model(model: DataModel) -> Result<Self, TreeError> {
        Self::new(Arc::new(model), ValidationConfig::default())
    }

    fn empty(model: Arc<DataModel>, config: ValidationConfig) -> Result<Self, TreeError> {
        let mut syntaxes = HashMap::new();
        for object in model.objects() {
            for parameter in &object.parameters {
                let syntax = model.effective_syntax(&parameter.syntax)?;
                syntaxes.insert(format!("{}{}", object.name, parameter.name), syntax);
            }
        }

        Ok(Self {
            model,
            config,
            syntaxes,
            objects: BTreeMap::new(),
            collections: BTreeMap::new(),
            parameter_key: String::new(),
            pending: BTreeMap::new(),
        })
    }

    pub fn model(&self) -> &DataModel {
        &self.model
    }

    pub fn shared_model(&self) -> Arc<DataModel> {
        Arc::clone(&self.model)
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// ParameterKey of the last successful modifying RPC
    pub fn parameter_key(&self) -> &str {
        &self.parameter_key
    }

    /// All object instance paths in natural order
    pub fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.keys().cloned().collect();
        paths.sort_by(|a, b| compare_paths(a, b));
        paths
    }

    /// Table collection paths (`Device.IP.Interface.`) in natural order
    pub fn collections(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.collections.keys().cloned().collect();
        paths.sort_by(|a, b| compare_paths(a, b));
        paths
    }

    pub fn contains_object(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    /// Instance numbers of the rows in a collection, ascending
    pub fn rows(&self, collection: &str) -> Vec<u32> {
        let mut rows: Vec<u32> = self
            .objects
            .range(collection.to_string()..)
            .take_while(|(path, _)| path.starts_with(collection))
            .filter_map(|(path, _)| path[collection.len()..].strip_suffix('.')?.parse().ok())
            .collect();
        rows.sort_unstable();
        rows
    }

    pub fn parameter_count(&self) -> usize {
        self.objects.values().map(|o| o.values.len()).sum()
    }

    /// Current value of a parameter; hidden values are returned as stored
    pub fn value(&self, path: &str) -> Result<&ParameterValue, TreeError> {
        let resolved = self.resolve(path)?;
        let (object_path, name) = split_parameter(&resolved, path)?;
        self.objects
            .get(&object_path)
            .and_then(|o| o.values.get(name))
            .map(|state| &state.value)
            .ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))
    }

    /// Device-side update from the CWMP string form. Access modes are not
    /// checked; syntax and unique keys are. Queues a notification when the
    /// value changes and the parameter has notification enabled.
    pub fn set_internal(&mut self, path: &str, raw: &str) -> Result<(), TreeError> {
        let change = self.stage(
            path,
            Incoming::Raw {
                value: raw,
                xsi_type: None,
            },
            Origin::Device,
        )?;
        self.commit(vec![change], Origin::Device)
    }

    /// Device-side update with a typed value
    pub fn set_value(&mut self, path: &str, value: ParameterValue) -> Result<(), TreeError> {
        let change = self.stage(path, Incoming::Typed(value), Origin::Device)?;
        self.commit(vec![change], Origin::Device)
    }

    /// Drain queued value changes, in path order
    pub fn take_notifications(&mut self) -> Vec<ValueChange> {
        let mut changes: Vec<ValueChange> = std::mem::take(&mut self.pending).into_values().collect();
        changes.sort_by(|a, b| compare_paths(&a.name, &b.name));
        changes
    }

    pub fn pending_notifications(&self) -> usize {
        self.pending.len()
    }

    /// Read an object instance into its typed struct
    pub fn read_typed<T: CwmpObject>(&self, path: &str) -> Result<T, TreeError> {
        let object_path = self.typed_object_path::<T>(path)?;
        let object = self
            .objects
            .get(&object_path)
            .ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))?;

        let fields: serde_json::Map<String, JsonValue> = object
            .values
            .iter()
            .map(|(name, state)| (name.clone(), state.value.to_json()))
            .collect();
        serde_json::from_value(JsonValue::Object(fields)).map_err(|e| TreeError::TypeBinding(e.to_string()))
    }

    /// Device-side write of every field the struct sets. All fields are
    /// checked before any is applied.
    pub fn write_typed<T: CwmpObject>(&mut self, path: &str, object: &T) -> Result<(), TreeError> {
        let object_path = self.typed_object_path::<T>(path)?;
        let JsonValue::Object(fields) =
            serde_json::to_value(object).map_err(|e| TreeError::TypeBinding(e.to_string()))?
        else {
            return Err(TreeError::TypeBinding(format!(
                "{} does not serialize to an object",
                std::any::type_name::<T>()
            )));
        };

        let mut staged = Vec::with_capacity(fields.len());
        for (name, field) in &fields {
            let full = format!("{}{}", object_path, name);
            staged.push(self.stage(&full, Incoming::Json(field), Origin::Device)?);
        }
        self.commit(staged, Origin::Device)
    }

    fn typed_object_path<T: CwmpObject>(&self, path: &str) -> Result<String, TreeError> {
        let resolved = self.resolve(path)?;
        if !resolved.is_partial() {
            return Err(TreeError::InvalidParameterName(path.to_string()));
        }
        let object_path = resolved.to_string();
        let template = self
            .objects
            .get(&object_path)
            .map(|o| o.template.as_str())
            .ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))?;
        if template != T::PATH {
            return Err(TreeError::TypeBinding(format!(
                "{} is an instance of {}, not {}",
                object_path,
                template,
                T::PATH
            )));
        }
        Ok(object_path)
    }

    /// Parameters the device reports in every Inform
    pub fn forced_inform_parameters(&self) -> Vec<(String, ParameterValue)> {
        let mut result = Vec::new();
        for object_path in self.object_paths() {
            for (name, state, definition) in self.ordered_parameters(&object_path) {
                if definition.forced_inform {
                    result.push((format!("{}{}", object_path, name), state.value.clone()));
                }
            }
        }
        result
    }

    // --- construction -----------------------------------------------------

    fn instantiate_roots(&mut self, auto_rows: bool) -> Result<(), TreeError> {
        let model = Arc::clone(&self.model);
        for root in model.root_objects() {
            self.instantiate_child(root, "", auto_rows)?;
        }
        Ok(())
    }

    fn instantiate_child(&mut self, child: &ObjectDef, parent_path: &str, auto_rows: bool) -> Result<(), TreeError> {
        let path = format!("{}{}.", parent_path, child.leaf_name());
        if child.is_table() {
            self.collections.insert(
                path.clone(),
                Collection {
                    template: child.name.clone(),
                    next_instance: 1,
                },
            );
            if auto_rows {
                for _ in 0..child.min_entries {
                    self.create_row(&path, None, true, Origin::Tree)?;
                }
            }
            Ok(())
        } else {
            self.instantiate(&child.name, &path, auto_rows)
        }
    }

    fn instantiate(&mut self, template: &str, path: &str, auto_rows: bool) -> Result<(), TreeError> {
        let model = Arc::clone(&self.model);
        let definition = model
            .object(template)
            .ok_or_else(|| ModelError::UnknownObject(template.to_string()))?;

        let mut values = BTreeMap::new();
        for parameter in &definition.parameters {
            let syntax = self.syntax_for(template, &parameter.name)?;
            values.insert(
                parameter.name.clone(),
                ParameterState::new(
                    ParameterValue::default_for(syntax),
                    parameter.active_notify.initial_level(),
                ),
            );
        }
        self.objects.insert(
            path.to_string(),
            ObjectInstance {
                template: template.to_string(),
                values,
            },
        );

        for child in model.child_objects(template) {
            self.instantiate_child(child, path, auto_rows)?;
        }
        Ok(())
    }

    /// Create a row, either at the next free instance number or at a given
    /// one (used by restore). `origin` decides whether the counter update
    /// is notified.
    fn create_row(
        &mut self,
        collection: &str,
        instance: Option<u32>,
        auto_rows: bool,
        origin: Origin,
    ) -> Result<u32, TreeError> {
        let state = self
            .collections
            .get(collection)
            .ok_or_else(|| TreeError::InvalidParameterName(collection.to_string()))?;
        let template = state.template.clone();
        let candidate = instance.map(u64::from).unwrap_or(state.next_instance);
        let instance = u32::try_from(candidate)
            .ok()
            .filter(|n| *n >= 1 && *n <= self.config.max_instance_number)
            .ok_or_else(|| {
                TreeError::ResourcesExceeded(format!("no instance numbers left in {}", collection))
            })?;

        let path = format!("{}{}.", collection, instance);
        if self.objects.contains_key(&path) {
            return Err(TreeError::InvalidArguments(format!("{} already exists", path)));
        }

        self.instantiate(&template, &path, auto_rows)?;
        if let Some(state) = self.collections.get_mut(collection) {
            state.next_instance = state.next_instance.max(u64::from(instance) + 1);
        }
        if self.config.auto_assign_alias {
            self.assign_alias(collection, &path, instance);
        }
        self.refresh_count(collection, origin);
        debug!("Created {}", path);
        Ok(instance)
    }

    fn assign_alias(&mut self, collection: &str, row_path: &str, instance: u32) {
        let taken: HashSet<String> = self
            .rows(collection)
            .into_iter()
            .filter_map(|n| self.objects.get(&format!("{}{}.", collection, n)))
            .filter_map(|row| row.values.get(ALIAS))
            .map(|state| state.value.to_cwmp_string())
            .collect();

        let mut suffix = u64::from(instance);
        let alias = loop {
            let candidate = format!("{}{}", self.config.alias_prefix, suffix);
            if !taken.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };

        if let Some(state) = self
            .objects
            .get_mut(row_path)
            .and_then(|row| row.values.get_mut(ALIAS))
            && state.value.to_cwmp_string().is_empty()
        {
            state.value = ParameterValue::String(alias);
        }
    }

    /// Recompute the NumberOfEntries parameter of a collection
    fn refresh_count(&mut self, collection: &str, origin: Origin) {
        let Some(counter) = self
            .collections
            .get(collection)
            .and_then(|c| self.model.object(&c.template))
            .and_then(|table| table.num_entries_parameter.clone())
        else {
            return;
        };
        let Some(parent) = parent_path(collection) else {
            return;
        };
        let count = u32::try_from(self.rows(collection).len()).unwrap_or(u32::MAX);
        self.write_value(&parent, &counter, ParameterValue::UnsignedInt(count), origin);
    }

    fn refresh_all_counts(&mut self) {
        let collections: Vec<String> = self.collections.keys().cloned().collect();
        for collection in collections {
            self.refresh_count(&collection, Origin::Tree);
        }
    }

    // --- lookup -----------------------------------------------------------

    fn syntax_for(&self, template: &str, name: &str) -> Result<&Syntax, TreeError> {
        self.syntaxes
            .get(&format!("{}{}", template, name))
            .ok_or_else(|| TreeError::Model(ModelError::UnknownParameter(format!("{}{}", template, name))))
    }

    fn object_def(&self, object_path: &str) -> Option<&ObjectDef> {
        self.objects
            .get(object_path)
            .and_then(|o| self.model.object(&o.template))
    }

    fn parameter_def(&self, object_path: &str, name: &str) -> Option<&ParameterDef> {
        self.object_def(object_path).and_then(|o| o.parameter(name))
    }

    /// Definition of the table behind a collection path
    fn table_def(&self, collection: &str) -> Result<&ObjectDef, TreeError> {
        self.collections
            .get(collection)
            .and_then(|c| self.model.object(&c.template))
            .ok_or_else(|| TreeError::InvalidParameterName(collection.to_string()))
    }

    /// Parameters of an instance in declaration order
    fn ordered_parameters(&self, object_path: &str) -> Vec<(&str, &ParameterState, &ParameterDef)> {
        let (Some(object), Some(definition)) = (self.objects.get(object_path), self.object_def(object_path)) else {
            return Vec::new();
        };
        definition
            .parameters
            .iter()
            .filter_map(|p| object.values.get(&p.name).map(|state| (p.name.as_str(), state, p)))
            .collect()
    }

    fn is_hidden(&self, object_path: &str, name: &str) -> bool {
        self.objects
            .get(object_path)
            .and_then(|o| self.syntaxes.get(&format!("{}{}", o.template, name)))
            .is_some_and(|s| s.hidden)
    }

    /// Parse a path and replace `[alias]` segments with instance numbers
    fn resolve(&self, path: &str) -> Result<ParameterPath, TreeError> {
        let parsed = ParameterPath::parse(path).map_err(|_| TreeError::InvalidParameterName(path.to_string()))?;
        if parsed.segments().contains(&Segment::Placeholder) {
            return Err(TreeError::InvalidParameterName(path.to_string()));
        }
        if !parsed.has_aliases() {
            return Ok(parsed);
        }

        let mut resolved = Vec::with_capacity(parsed.segments().len());
        for segment in parsed.segments() {
            match segment {
                Segment::Alias(alias) => {
                    let collection = ParameterPath::from_segments(resolved.clone(), true).to_string();
                    let instance = self
                        .rows(&collection)
                        .into_iter()
                        .find(|n| {
                            self.objects
                                .get(&format!("{}{}.", collection, n))
                                .and_then(|row| row.values.get(ALIAS))
                                .is_some_and(|state| {
                                    matches!(&state.value, ParameterValue::String(a) if a == alias)
                                })
                        })
                        .ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))?;
                    resolved.push(Segment::Instance(instance));
                }
                other => resolved.push(other.clone()),
            }
        }
        Ok(ParameterPath::from_segments(resolved, parsed.is_partial()))
    }

    fn parameter_writable(&self, object_path: &str, name: &str) -> Option<bool> {
        let definition = self.parameter_def(object_path, name)?;
        let state = self.objects.get(object_path)?.values.get(name)?;
        Some(match definition.access {
            Access::ReadOnly => false,
            Access::ReadWrite => true,
            Access::WriteOnceReadOnly => !state.written,
        })
    }

    // --- write path -------------------------------------------------------

    /// Check one incoming value without applying it
    fn stage(&self, path: &str, incoming: Incoming<'_>, origin: Origin) -> Result<StagedChange, TreeError> {
        let resolved = self.resolve(path)?;
        let (object_path, name) = split_parameter(&resolved, path)?;
        let object = self
            .objects
            .get(&object_path)
            .filter(|o| o.values.contains_key(name))
            .ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))?;

        if origin == Origin::Acs
            && self.config.enforce_access
            && !self.parameter_writable(&object_path, name).unwrap_or(false)
        {
            return Err(TreeError::NotWritable(path.to_string()));
        }

        let syntax = self.syntax_for(&object.template, name)?;
        let invalid = |source: ValueError| TreeError::InvalidValue {
            path: path.to_string(),
            source,
        };

        let value = match incoming {
            Incoming::Raw { value, xsi_type } => {
                if let Some(xsi_type) = xsi_type {
                    check_xsi_type(syntax, xsi_type).map_err(invalid)?;
                }
                ParameterValue::parse_with_syntax(syntax, value).map_err(invalid)?
            }
            Incoming::Typed(value) => {
                value.validate(syntax).map_err(invalid)?;
                value
            }
            Incoming::Json(value) => ParameterValue::from_json_with_syntax(syntax, value).map_err(invalid)?,
        };

        if name == ALIAS
            && syntax.data_type.as_deref() == Some(ALIAS)
            && let ParameterValue::String(alias) = &value
            && !alias.is_empty()
            && let Err(e) = validate_alias(alias)
        {
            return Err(invalid(ValueError::Unparsable {
                base: BaseType::String,
                value: alias.clone(),
                reason: e.to_string(),
            }));
        }

        Ok(StagedChange {
            object_path,
            name: name.to_string(),
            value,
        })
    }

    /// Apply staged changes after the unique key check
    fn commit(&mut self, staged: Vec<StagedChange>, origin: Origin) -> Result<(), TreeError> {
        if self.config.enforce_unique_keys {
            let faults = self.unique_key_faults(&staged);
            if !faults.is_empty() {
                return Err(TreeError::SetRejected(faults));
            }
        }
        for change in staged {
            self.write_value(&change.object_path, &change.name, change.value, origin);
        }
        Ok(())
    }

    fn write_value(&mut self, object_path: &str, name: &str, value: ParameterValue, origin: Origin) {
        let hidden = self.is_hidden(object_path, name);
        let Some(state) = self
            .objects
            .get_mut(object_path)
            .and_then(|o| o.values.get_mut(name))
        else {
            return;
        };

        if origin == Origin::Acs {
            state.written = true;
        }
        if state.value == value {
            return;
        }
        state.value = value;

        if origin == Origin::Device && state.notification != NotificationLevel::Off {
            let full = format!("{}{}", object_path, name);
            debug!("Queueing {:?} notification for {}", state.notification, full);
            let change = ValueChange {
                name: full.clone(),
                value: if hidden {
                    String::new()
                } else {
                    state.value.to_cwmp_string()
                },
                notification: state.notification,
            };
            self.pending.insert(full, change);
        }
    }
}

/// Split a resolved parameter path into its object path and name
fn split_parameter<'a>(resolved: &'a ParameterPath, original: &str) -> Result<(String, &'a str), TreeError> {
    match resolved.leaf() {
        Some(name) if !resolved.is_partial() && !resolved.ends_with_row() => {
            Ok((resolved.object_path().to_string(), name))
        }
        _ => Err(TreeError::InvalidParameterName(original.to_string())),
    }
}

/// Path of the object a collection or row hangs off
fn parent_path(path: &str) -> Option<String> {
    ParameterPath::parse(path).ok()?.parent().map(|p| p.to_string())
}

/// `xsi:type` must match the parameter's base type. `xsd:string` is
/// accepted for anything, and integer types are interchangeable.
fn check_xsi_type(syntax: &Syntax, xsi_type: &str) -> Result<(), ValueError> {
    let mismatch = || ValueError::TypeMismatch {
        expected: syntax.base,
        actual: xsi_type.to_string(),
    };
    let declared = BaseType::from_xsi_type(xsi_type).ok_or_else(mismatch)?;
    if declared == syntax.base
        || declared == BaseType::String
        || (declared.is_integer() && syntax.base.is_integer())
    {
        Ok(())
    } else {
        Err(mismatch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::object::UniqueKey;
    use crate::models::parameter::ActiveNotify;
    use crate::models::typed::{DeviceInfo, IpInterface};

    fn model() -> DataModel {
        DataModel::new("Device:2.11")
            .with_object(ObjectDef::new("Device."))
            .with_object(
                ObjectDef::new("Device.DeviceInfo.")
                    .with_parameter(ParameterDef::new("Manufacturer", BaseType::String))
                    .with_parameter(
                        ParameterDef::new("SoftwareVersion", BaseType::String)
                            .with_active_notify(ActiveNotify::ForceEnabled)
                            .with_forced_inform(true),
                    )
                    .with_parameter(ParameterDef::new("UpTime", BaseType::UnsignedInt)),
            )
            .with_object(
                ObjectDef::new("Device.IP.")
                    .with_parameter(ParameterDef::new("InterfaceNumberOfEntries", BaseType::UnsignedInt)),
            )
            .with_object(
                ObjectDef::table("Device.IP.Interface.{i}.")
                    .with_access(Access::ReadWrite)
                    .with_num_entries_parameter("InterfaceNumberOfEntries")
                    .with_enable_parameter("Enable")
                    .with_unique_key(UniqueKey::non_functional([ALIAS]))
                    .with_unique_key(UniqueKey::functional(["Name"]))
                    .with_parameter(ParameterDef::new("Enable", BaseType::Boolean).writable())
                    .with_parameter(ParameterDef::with_syntax_of(ALIAS, Syntax::of_data_type(ALIAS)).writable())
                    .with_parameter(
                        ParameterDef::with_syntax_of("Name", Syntax::new(BaseType::String).with_max_length(16))
                            .writable(),
                    )
                    .with_parameter(
                        ParameterDef::with_syntax_of(
                            "MaxMTUSize",
                            Syntax::new(BaseType::UnsignedInt)
                                .with_range(Some(64), Some(65535))
                                .with_default("1500"),
                        )
                        .writable(),
                    ),
            )
    }

    fn tree() -> DeviceTree {
        DeviceTree::from_model(model()).unwrap()
    }

    #[test]
    fn test_new_instantiates_single_objects() {
        let tree = tree();
        assert!(tree.contains_object("Device.DeviceInfo."));
        assert!(tree.contains_object("Device.IP."));
        assert_eq!(tree.collections(), vec!["Device.IP.Interface.".to_string()]);
        assert!(tree.rows("Device.IP.Interface.").is_empty());
        assert_eq!(
            tree.value("Device.IP.InterfaceNumberOfEntries").unwrap(),
            &ParameterValue::UnsignedInt(0)
        );
    }

    #[test]
    fn test_rows_get_defaults_and_alias() {
        let mut tree = tree();
        let first = tree.add_object_internal("Device.IP.Interface.").unwrap();
        let second = tree.add_object_internal("Device.IP.Interface.").unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(
            tree.value("Device.IP.Interface.2.MaxMTUSize").unwrap(),
            &ParameterValue::UnsignedInt(1500)
        );
        assert_eq!(tree.value("Device.IP.Interface.1.Alias").unwrap().to_string(), "cpe-1");
        assert_eq!(
            tree.value("Device.IP.Interface.[cpe-2].MaxMTUSize").unwrap(),
            &ParameterValue::UnsignedInt(1500)
        );
        assert_eq!(
            tree.value("Device.IP.InterfaceNumberOfEntries").unwrap(),
            &ParameterValue::UnsignedInt(2)
        );
    }

    #[test]
    fn test_alias_suffix_skips_taken_values() {
        let mut tree = tree();
        tree.add_object_internal("Device.IP.Interface.").unwrap();
        tree.set_internal("Device.IP.Interface.1.Alias", "cpe-2").unwrap();
        tree.add_object_internal("Device.IP.Interface.").unwrap();
        assert_eq!(tree.value("Device.IP.Interface.2.Alias").unwrap().to_string(), "cpe-3");
    }

    #[test]
    fn test_set_internal_checks_syntax_and_notifies() {
        let mut tree = tree();
        assert!(tree.set_internal("Device.DeviceInfo.UpTime", "-5").is_err());
        tree.set_internal("Device.DeviceInfo.UpTime", "42").unwrap();
        assert_eq!(tree.pending_notifications(), 0);

        tree.set_internal("Device.DeviceInfo.SoftwareVersion", "2.0").unwrap();
        let changes = tree.take_notifications();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].name, "Device.DeviceInfo.SoftwareVersion");
        assert_eq!(changes[0].notification, NotificationLevel::Active);
        assert!(tree.take_notifications().is_empty());
    }

    #[test]
    fn test_alias_values_are_checked() {
        let mut tree = tree();
        tree.add_object_internal("Device.IP.Interface.").unwrap();
        let err = tree.set_internal("Device.IP.Interface.1.Alias", "1st").unwrap_err();
        assert_eq!(err.fault_code(), 9007);
    }

    #[test]
    fn test_typed_round_trip() {
        let mut tree = tree();
        tree.write_typed(
            "Device.DeviceInfo.",
            &DeviceInfo {
                manufacturer: Some("Acme".to_string()),
                up_time: Some(7),
                ..Default::default()
            },
        )
        .unwrap();
        let info: DeviceInfo = tree.read_typed("Device.DeviceInfo.").unwrap();
        assert_eq!(info.manufacturer.as_deref(), Some("Acme"));
        assert_eq!(info.up_time, Some(7));

        let wrong = tree.read_typed::<IpInterface>("Device.DeviceInfo.");
        assert!(matches!(wrong, Err(TreeError::TypeBinding(_))));
    }

    #[test]
    fn test_typed_write_is_all_or_nothing() {
        let mut tree = tree();
        tree.add_object_internal("Device.IP.Interface.").unwrap();
        let result = tree.write_typed(
            "Device.IP.Interface.1.",
            &IpInterface {
                name: Some("wan".to_string()),
                max_mtu_size: Some(10),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(tree.value("Device.IP.Interface.1.Name").unwrap().to_string(), "");
    }

    #[test]
    fn test_forced_inform_parameters() {
        let tree = tree();
        let forced = tree.forced_inform_parameters();
        assert_eq!(forced.len(), 1);
        assert_eq!(forced[0].0, "Device.DeviceInfo.SoftwareVersion");
    }

    #[test]
    fn test_xsi_type_check() {
        let syntax = Syntax::new(BaseType::UnsignedInt);
        assert!(check_xsi_type(&syntax, "xsd:unsignedInt").is_ok());
        assert!(check_xsi_type(&syntax, "xsd:string").is_ok());
        assert!(check_xsi_type(&syntax, "xsd:int").is_ok());
        assert!(check_xsi_type(&syntax, "xsd:boolean").is_err());
        assert!(check_xsi_type(&syntax, "xsd:anyURI").is_err());
    }
}
