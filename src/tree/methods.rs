//! Data-side semantics of the CWMP parameter RPCs

use super::{DeviceTree, Incoming, Origin, StagedChange, TreeError, parent_path, split_parameter};
use crate::models::parameter::{ActiveNotify, NotificationLevel};
use crate::path::{ParameterPath, compare_paths};
use crate::rpc::{
    ChangeStatus, FAULT_INVALID_ARGUMENTS, ParameterAttributeStruct, ParameterFault, ParameterInfoStruct,
    ParameterValueStruct, SetParameterAttributesStruct,
};
use crate::value::ParameterValue;
use std::collections::HashSet;
use tracing::{debug, warn};

/// The only access list entity TR-069 defines
pub const SUBSCRIBER: &str = "Subscriber";

impl DeviceTree {
    /// GetParameterValues. Partial paths (and `""`) expand to every
    /// parameter below them; hidden parameters read as empty strings.
    pub fn get_parameter_values<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ParameterValueStruct>, TreeError> {
        let mut result = Vec::new();
        for name in names {
            let name = name.as_ref();
            let resolved = self.resolve(name)?;
            if resolved.is_partial() {
                let prefix = self.existing_node(&resolved, name)?;
                for object_path in self.objects_under(&prefix) {
                    for (parameter, _, _) in self.ordered_parameters(&object_path) {
                        result.push(self.value_struct(&object_path, parameter));
                    }
                }
            } else {
                let (object_path, parameter) = split_parameter(&resolved, name)?;
                if self.parameter_def(&object_path, parameter).is_none() {
                    return Err(TreeError::InvalidParameterName(name.to_string()));
                }
                result.push(self.value_struct(&object_path, parameter));
            }
        }
        Ok(result)
    }

    fn value_struct(&self, object_path: &str, name: &str) -> ParameterValueStruct {
        let full = format!("{}{}", object_path, name);
        let value = self.objects.get(object_path).and_then(|o| o.values.get(name));
        match value {
            Some(state) if self.is_hidden(object_path, name) => {
                ParameterValueStruct::new(full, "").with_xsi_type(state.value.xsi_type())
            }
            Some(state) => ParameterValueStruct::typed(full, &state.value),
            None => ParameterValueStruct::new(full, ""),
        }
    }

    /// SetParameterValues. Either every value is applied or none is; all
    /// per-parameter faults are reported together.
    pub fn set_parameter_values(
        &mut self,
        values: &[ParameterValueStruct],
        parameter_key: &str,
    ) -> Result<ChangeStatus, TreeError> {
        self.check_parameter_key(parameter_key)?;

        let mut faults = Vec::new();
        let mut staged: Vec<StagedChange> = Vec::with_capacity(values.len());
        let mut seen = HashSet::new();
        let mut targets = HashSet::new();
        let duplicate =
            |name: &str| ParameterFault::new(name, FAULT_INVALID_ARGUMENTS, "parameter appears more than once");

        for entry in values {
            if !seen.insert(entry.name.as_str()) {
                faults.push(duplicate(&entry.name));
                continue;
            }

            let incoming = Incoming::Raw {
                value: &entry.value,
                xsi_type: entry.xsi_type.as_deref(),
            };
            match self.stage(&entry.name, incoming, Origin::Acs) {
                // The same parameter may be addressed by instance number and by alias
                Ok(change) if !targets.insert((change.object_path.clone(), change.name.clone())) => {
                    faults.push(duplicate(&entry.name));
                }
                Ok(change) => staged.push(change),
                Err(TreeError::InvalidParameterName(_)) if self.config.ignore_unknown_parameters => {
                    warn!("Ignoring unknown parameter {}", entry.name);
                }
                Err(e) => faults.push(e.to_parameter_fault(&entry.name)),
            }
        }

        if self.config.enforce_unique_keys {
            faults.extend(self.unique_key_faults(&staged));
        }
        if !faults.is_empty() {
            warn!("SetParameterValues rejected: {} fault(s)", faults.len());
            return Err(TreeError::SetRejected(faults));
        }

        let count = staged.len();
        for change in staged {
            self.write_value(&change.object_path, &change.name, change.value, Origin::Acs);
        }
        self.store_parameter_key(parameter_key);
        debug!("Applied {} parameter value(s)", count);
        Ok(ChangeStatus::Applied)
    }

    /// GetParameterNames
    ///
    /// With `next_level` the result holds only the immediate children of the
    /// path; otherwise the path itself and everything below it. A full
    /// parameter path is only valid with `next_level == false`.
    pub fn get_parameter_names(&self, path: &str, next_level: bool) -> Result<Vec<ParameterInfoStruct>, TreeError> {
        let resolved = self.resolve(path)?;

        if !resolved.is_partial() {
            if next_level {
                return Err(TreeError::InvalidArguments(format!(
                    "{} is a parameter; NextLevel must be false",
                    path
                )));
            }
            let (object_path, name) = split_parameter(&resolved, path)?;
            let writable = self
                .parameter_writable(&object_path, name)
                .ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))?;
            return Ok(vec![ParameterInfoStruct {
                name: resolved.to_string(),
                writable,
            }]);
        }

        let prefix = self.existing_node(&resolved, path)?;
        let mut entries = Vec::new();

        if next_level {
            entries.extend(self.parameter_infos(&prefix));
            for node in self.nodes_under(&prefix) {
                if parent_path(&node).as_deref() == Some(prefix.as_str()) {
                    entries.push(self.node_info(&node));
                }
            }
        } else {
            if !prefix.is_empty() {
                entries.push(self.node_info(&prefix));
                entries.extend(self.parameter_infos(&prefix));
            }
            for node in self.nodes_under(&prefix) {
                entries.push(self.node_info(&node));
                entries.extend(self.parameter_infos(&node));
            }
        }

        Ok(entries)
    }

    fn parameter_infos(&self, object_path: &str) -> Vec<ParameterInfoStruct> {
        self.ordered_parameters(object_path)
            .into_iter()
            .map(|(name, _, _)| ParameterInfoStruct {
                name: format!("{}{}", object_path, name),
                writable: self.parameter_writable(object_path, name).unwrap_or(false),
            })
            .collect()
    }

    /// Object entry: rows are writable when they may be deleted, collections
    /// when rows may be added
    fn node_info(&self, path: &str) -> ParameterInfoStruct {
        let writable = if let Some(collection) = self.collections.get(path) {
            self.model
                .object(&collection.template)
                .is_some_and(|t| t.access.is_writable())
        } else {
            self.object_def(path)
                .is_some_and(|o| o.is_table() && o.access.is_writable())
        };
        ParameterInfoStruct {
            name: path.to_string(),
            writable,
        }
    }

    /// AddObject on a collection path such as `Device.IP.Interface.`.
    /// Returns the new instance number.
    pub fn add_object(&mut self, path: &str, parameter_key: &str) -> Result<(u32, ChangeStatus), TreeError> {
        self.check_parameter_key(parameter_key)?;
        let collection = self.collection_path(path)?;
        if self.config.enforce_access && !self.table_def(&collection)?.access.is_writable() {
            return Err(TreeError::NotWritable(path.to_string()));
        }

        let instance = self.add_row(&collection, Origin::Tree)?;
        self.store_parameter_key(parameter_key);
        Ok((instance, ChangeStatus::Applied))
    }

    /// Device-side row creation; ignores the table's access mode
    pub fn add_object_internal(&mut self, path: &str) -> Result<u32, TreeError> {
        let collection = self.collection_path(path)?;
        self.add_row(&collection, Origin::Device)
    }

    fn add_row(&mut self, collection: &str, origin: Origin) -> Result<u32, TreeError> {
        if self.config.enforce_cardinality {
            let max_entries = self.table_def(collection)?.max_entries;
            if !max_entries.allows(self.rows(collection).len() + 1) {
                return Err(TreeError::ResourcesExceeded(format!(
                    "{} already holds {} row(s)",
                    collection, max_entries
                )));
            }
        }
        self.create_row(collection, None, true, origin)
    }

    /// DeleteObject on a row path such as `Device.IP.Interface.2.`
    pub fn delete_object(&mut self, path: &str, parameter_key: &str) -> Result<ChangeStatus, TreeError> {
        self.check_parameter_key(parameter_key)?;
        let (collection, row) = self.row_path(path)?;
        if self.config.enforce_access && !self.table_def(&collection)?.access.is_writable() {
            return Err(TreeError::NotWritable(path.to_string()));
        }

        self.remove_row(&collection, &row, Origin::Tree)?;
        self.store_parameter_key(parameter_key);
        Ok(ChangeStatus::Applied)
    }

    /// Device-side row removal; ignores the table's access mode
    pub fn delete_object_internal(&mut self, path: &str) -> Result<(), TreeError> {
        let (collection, row) = self.row_path(path)?;
        self.remove_row(&collection, &row, Origin::Device)
    }

    fn remove_row(&mut self, collection: &str, row: &str, origin: Origin) -> Result<(), TreeError> {
        if self.config.enforce_cardinality {
            let min_entries = self.table_def(collection)?.min_entries;
            if self.rows(collection).len() <= min_entries as usize {
                return Err(TreeError::RequestDenied(format!(
                    "{} must keep at least {} row(s)",
                    collection, min_entries
                )));
            }
        }

        self.objects.retain(|path, _| !path.starts_with(row));
        self.collections.retain(|path, _| !path.starts_with(row));
        self.pending.retain(|path, _| !path.starts_with(row));
        self.refresh_count(collection, origin);
        debug!("Deleted {}", row);
        Ok(())
    }

    /// SetParameterAttributes
    ///
    /// On a full parameter path a request the parameter's notify policy
    /// forbids faults with 9009. On a partial path such parameters are
    /// skipped and the rest are updated.
    pub fn set_parameter_attributes(&mut self, requests: &[SetParameterAttributesStruct]) -> Result<(), TreeError> {
        let mut updates = Vec::new();

        for request in requests {
            if request.access_list_change
                && let Some(entity) = request.access_list.iter().find(|e| *e != SUBSCRIBER)
            {
                return Err(TreeError::InvalidArguments(format!("unknown access list entity {}", entity)));
            }

            let exact = !self.resolve(&request.name)?.is_partial();
            for (object_path, name) in self.parameters_matching(&request.name)? {
                let allowed = !request.notification_change
                    || self
                        .parameter_def(&object_path, &name)
                        .is_none_or(|p| notification_allowed(p.active_notify, request.notification));
                if !allowed {
                    if exact {
                        return Err(TreeError::NotificationRejected(format!("{}{}", object_path, name)));
                    }
                    debug!("Skipping notification change for {}{}", object_path, name);
                    continue;
                }
                updates.push((object_path, name, request));
            }
        }

        for (object_path, name, request) in updates {
            if let Some(state) = self
                .objects
                .get_mut(&object_path)
                .and_then(|o| o.values.get_mut(&name))
            {
                if request.notification_change {
                    state.notification = request.notification;
                }
                if request.access_list_change {
                    state.access_list = request.access_list.clone();
                }
            }
        }
        Ok(())
    }

    /// GetParameterAttributes
    pub fn get_parameter_attributes<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<ParameterAttributeStruct>, TreeError> {
        let mut result = Vec::new();
        for name in names {
            for (object_path, parameter) in self.parameters_matching(name.as_ref())? {
                if let Some(state) = self.objects.get(&object_path).and_then(|o| o.values.get(&parameter)) {
                    result.push(ParameterAttributeStruct {
                        name: format!("{}{}", object_path, parameter),
                        notification: state.notification,
                        access_list: state.access_list.clone(),
                    });
                }
            }
        }
        Ok(result)
    }

    // --- helpers ----------------------------------------------------------

    /// The string form of a partial path that names an object, a collection
    /// or the root
    fn existing_node(&self, resolved: &ParameterPath, original: &str) -> Result<String, TreeError> {
        let prefix = resolved.to_string();
        if resolved.is_root() || self.objects.contains_key(&prefix) || self.collections.contains_key(&prefix) {
            Ok(prefix)
        } else {
            Err(TreeError::InvalidParameterName(original.to_string()))
        }
    }

    /// Object instances at or below a prefix, in natural order
    fn objects_under(&self, prefix: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .objects
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort_by(|a, b| compare_paths(a, b));
        paths
    }

    /// Objects and collections strictly below a prefix, in natural order
    fn nodes_under(&self, prefix: &str) -> Vec<String> {
        let collections = self
            .collections
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, _)| path.clone());
        let mut nodes: Vec<String> = self
            .objects_under(prefix)
            .into_iter()
            .chain(collections)
            .filter(|path| path != prefix)
            .collect();
        nodes.sort_by(|a, b| compare_paths(a, b));
        nodes
    }

    /// (object path, parameter name) pairs a name refers to
    fn parameters_matching(&self, name: &str) -> Result<Vec<(String, String)>, TreeError> {
        let resolved = self.resolve(name)?;
        if resolved.is_partial() {
            let prefix = self.existing_node(&resolved, name)?;
            let mut matches = Vec::new();
            for object_path in self.objects_under(&prefix) {
                for (parameter, _, _) in self.ordered_parameters(&object_path) {
                    matches.push((object_path.clone(), parameter.to_string()));
                }
            }
            return Ok(matches);
        }

        let (object_path, parameter) = split_parameter(&resolved, name)?;
        if self.parameter_def(&object_path, parameter).is_none() {
            return Err(TreeError::InvalidParameterName(name.to_string()));
        }
        Ok(vec![(object_path, parameter.to_string())])
    }

    fn collection_path(&self, path: &str) -> Result<String, TreeError> {
        let resolved = self.resolve(path)?;
        let collection = resolved.to_string();
        if resolved.is_partial() && self.collections.contains_key(&collection) {
            Ok(collection)
        } else {
            Err(TreeError::InvalidParameterName(path.to_string()))
        }
    }

    /// (collection, row) for an existing row path
    fn row_path(&self, path: &str) -> Result<(String, String), TreeError> {
        let resolved = self.resolve(path)?;
        let row = resolved.to_string();
        if !resolved.is_partial() || !resolved.ends_with_row() || !self.objects.contains_key(&row) {
            return Err(TreeError::InvalidParameterName(path.to_string()));
        }
        let collection = parent_path(&row).ok_or_else(|| TreeError::InvalidParameterName(path.to_string()))?;
        Ok((collection, row))
    }

    /// Object paths holding a `ManagementServer.ParameterKey` parameter
    fn parameter_key_objects(&self) -> Vec<String> {
        self.objects
            .iter()
            .filter(|(path, object)| {
                path.matches('.').count() == 2
                    && path.ends_with(".ManagementServer.")
                    && object.values.contains_key("ParameterKey")
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn check_parameter_key(&self, parameter_key: &str) -> Result<(), TreeError> {
        for object_path in self.parameter_key_objects() {
            let Some(object) = self.objects.get(&object_path) else {
                continue;
            };
            let syntax = self.syntax_for(&object.template, "ParameterKey")?;
            if let Err(e) = ParameterValue::from(parameter_key).validate(syntax) {
                return Err(TreeError::InvalidArguments(format!("ParameterKey: {}", e)));
            }
        }
        Ok(())
    }

    fn store_parameter_key(&mut self, parameter_key: &str) {
        self.parameter_key = parameter_key.to_string();
        for object_path in self.parameter_key_objects() {
            self.write_value(&object_path, "ParameterKey", ParameterValue::from(parameter_key), Origin::Tree);
        }
    }
}

/// Whether a parameter's notify policy admits a requested level
fn notification_allowed(policy: ActiveNotify, requested: NotificationLevel) -> bool {
    match policy {
        ActiveNotify::CanDeny => requested != NotificationLevel::Active,
        ActiveNotify::ForceEnabled => requested == NotificationLevel::Active,
        ActiveNotify::Normal | ActiveNotify::ForceDefaultEnabled => true,
    }
}
