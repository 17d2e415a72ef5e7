//! Serializable copy of a tree's state

use super::{DeviceTree, Incoming, Origin, TreeError, parent_path};
use crate::config::ValidationConfig;
use crate::models::data_model::DataModel;
use crate::models::parameter::NotificationLevel;
use crate::path::{ParameterPath, compare_paths};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Everything needed to rebuild a [`DeviceTree`] over the same model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    /// Name of the data model the tree was built from
    pub model: String,
    #[serde(default)]
    pub parameter_key: String,
    /// Object instance paths
    pub objects: Vec<String>,
    /// Parameter values in CWMP string form
    pub values: BTreeMap<String, String>,
    /// Notification levels that differ from each parameter's initial level
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notifications: BTreeMap<String, NotificationLevel>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub access_lists: BTreeMap<String, Vec<String>>,
    /// Write-once parameters the ACS has already set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<String>,
    /// Next instance number per collection
    #[serde(default)]
    pub next_instances: BTreeMap<String, u64>,
}

impl DeviceTree {
    pub fn snapshot(&self) -> TreeSnapshot {
        let mut snapshot = TreeSnapshot {
            model: self.model.name.clone(),
            parameter_key: self.parameter_key.clone(),
            objects: self.object_paths(),
            values: BTreeMap::new(),
            notifications: BTreeMap::new(),
            access_lists: BTreeMap::new(),
            written: Vec::new(),
            next_instances: self
                .collections
                .iter()
                .map(|(path, c)| (path.clone(), c.next_instance))
                .collect(),
        };

        for object_path in &snapshot.objects {
            for (name, state, definition) in self.ordered_parameters(object_path) {
                let full = format!("{}{}", object_path, name);
                if state.notification != definition.active_notify.initial_level() {
                    snapshot.notifications.insert(full.clone(), state.notification);
                }
                if !state.access_list.is_empty() {
                    snapshot.access_lists.insert(full.clone(), state.access_list.clone());
                }
                if state.written {
                    snapshot.written.push(full.clone());
                }
                snapshot.values.insert(full, state.value.to_cwmp_string());
            }
        }
        snapshot
    }

    /// Rebuild a tree from a snapshot taken over the same model
    pub fn from_snapshot(
        model: Arc<DataModel>,
        config: ValidationConfig,
        snapshot: &TreeSnapshot,
    ) -> Result<Self, TreeError> {
        if snapshot.model != model.name {
            return Err(TreeError::InvalidArguments(format!(
                "snapshot of {} cannot be restored over {}",
                snapshot.model, model.name
            )));
        }

        let mut tree = Self::empty(model, config)?;
        tree.instantiate_roots(false)?;

        let mut objects = snapshot.objects.clone();
        objects.sort_by(|a, b| compare_paths(a, b));
        for path in &objects {
            if tree.objects.contains_key(path) {
                continue;
            }
            let parsed = ParameterPath::parse(path).map_err(|_| TreeError::InvalidParameterName(path.clone()))?;
            let (Some(collection), Some(&instance)) = (parent_path(path), parsed.instance_numbers().last()) else {
                return Err(TreeError::InvalidParameterName(path.clone()));
            };
            if !parsed.ends_with_row() {
                return Err(TreeError::InvalidParameterName(path.clone()));
            }
            tree.create_row(&collection, Some(instance), false, Origin::Tree)?;
        }

        for (path, value) in &snapshot.values {
            if tree.value(path).is_ok_and(|current| current.to_cwmp_string() == *value) {
                continue;
            }
            let change = tree.stage(path, Incoming::Raw { value, xsi_type: None }, Origin::Tree)?;
            tree.write_value(&change.object_path, &change.name, change.value, Origin::Tree);
        }

        for (path, level) in &snapshot.notifications {
            tree.parameter_state_mut(path)?.notification = *level;
        }
        for (path, entities) in &snapshot.access_lists {
            tree.parameter_state_mut(path)?.access_list = entities.clone();
        }
        for path in &snapshot.written {
            tree.parameter_state_mut(path)?.written = true;
        }
        for (path, next) in &snapshot.next_instances {
            if let Some(collection) = tree.collections.get_mut(path) {
                collection.next_instance = collection.next_instance.max(*next);
            }
        }

        tree.parameter_key = snapshot.parameter_key.clone();
        tree.refresh_all_counts();
        tree.pending.clear();
        info!("Restored {} object(s) of {}", tree.objects.len(), snapshot.model);
        Ok(tree)
    }

    /// Replace this tree's state with a snapshot's. On error the tree is
    /// left unchanged.
    pub fn restore(&mut self, snapshot: &TreeSnapshot) -> Result<(), TreeError> {
        *self = Self::from_snapshot(self.shared_model(), self.config.clone(), snapshot)?;
        Ok(())
    }

    fn parameter_state_mut(&mut self, path: &str) -> Result<&mut super::ParameterState, TreeError> {
        let (object_path, name) = path
            .rsplit_once('.')
            .map(|(object, name)| (format!("{}.", object), name))
            .ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))?;
        self.objects
            .get_mut(&object_path)
            .and_then(|o| o.values.get_mut(name))
            .ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bundled_model;
    use crate::rpc::{ParameterValueStruct, SetParameterAttributesStruct};

    fn tree() -> DeviceTree {
        DeviceTree::from_model(bundled_model("tr-181").unwrap()).unwrap()
    }

    #[test]
    fn test_snapshot_restores_rows_and_values() {
        let mut tree = tree();
        tree.add_object("Device.IP.Interface.", "a").unwrap();
        tree.add_object("Device.IP.Interface.", "b").unwrap();
        tree.add_object("Device.IP.Interface.1.IPv4Address.", "c").unwrap();
        tree.delete_object("Device.IP.Interface.2.", "d").unwrap();
        tree.set_parameter_values(
            &[ParameterValueStruct::new("Device.IP.Interface.1.Name", "wan0")],
            "e",
        )
        .unwrap();
        tree.set_parameter_attributes(&[SetParameterAttributesStruct::notification(
            "Device.IP.Interface.1.Name",
            NotificationLevel::Passive,
        )])
        .unwrap();

        let snapshot = tree.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: TreeSnapshot = serde_json::from_str(&json).unwrap();

        let restored = DeviceTree::from_snapshot(tree.shared_model(), tree.config().clone(), &parsed).unwrap();
        assert_eq!(restored.object_paths(), tree.object_paths());
        assert_eq!(restored.parameter_key(), "e");
        assert_eq!(restored.value("Device.IP.Interface.1.Name").unwrap().to_string(), "wan0");
        assert_eq!(
            restored.value("Device.IP.InterfaceNumberOfEntries").unwrap().to_string(),
            "1"
        );
        let attrs = restored.get_parameter_attributes(&["Device.IP.Interface.1.Name"]).unwrap();
        assert_eq!(attrs[0].notification, NotificationLevel::Passive);
        assert_eq!(restored.pending_notifications(), 0);
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_instance_counter_survives_restore() {
        let mut tree = tree();
        tree.add_object("Device.IP.Interface.", "").unwrap();
        tree.add_object("Device.IP.Interface.", "").unwrap();
        tree.delete_object("Device.IP.Interface.2.", "").unwrap();

        let snapshot = tree.snapshot();
        let mut restored = tree.clone();
        restored.restore(&snapshot).unwrap();
        let (instance, _) = restored.add_object("Device.IP.Interface.", "").unwrap();
        assert_eq!(instance, 3);
    }

    #[test]
    fn test_restore_rejects_other_model() {
        let mut tree = tree();
        let mut snapshot = tree.snapshot();
        snapshot.model = "InternetGatewayDevice:1.14".to_string();
        assert!(tree.restore(&snapshot).is_err());

        let mut snapshot = tree.snapshot();
        snapshot.values.insert("Device.Unknown".to_string(), "x".to_string());
        assert!(tree.restore(&snapshot).is_err());
        assert!(tree.contains_object("Device.DeviceInfo."));
    }
}
