//! Unique key checks over staged changes

use super::{DeviceTree, StagedChange, parent_path};
use crate::models::object::{ObjectDef, UniqueKey};
use crate::rpc::{FAULT_INVALID_VALUE, ParameterFault};
use crate::value::ParameterValue;
use std::collections::{BTreeMap, HashMap};

/// Values a batch is about to write, keyed by (object path, name)
type Overrides<'a> = HashMap<(&'a str, &'a str), &'a ParameterValue>;

impl DeviceTree {
    /// Faults for rows whose unique keys would collide once `staged` is
    /// applied. Functional keys only bind enabled rows; non-functional keys
    /// are checked when `strict_unique_keys` is set. Keys whose values are
    /// all empty never collide.
    pub(super) fn unique_key_faults(&self, staged: &[StagedChange]) -> Vec<ParameterFault> {
        let overrides: Overrides<'_> = staged
            .iter()
            .map(|c| ((c.object_path.as_str(), c.name.as_str()), &c.value))
            .collect();

        let mut touched: BTreeMap<&str, Vec<&StagedChange>> = BTreeMap::new();
        for change in staged {
            touched.entry(change.object_path.as_str()).or_default().push(change);
        }

        let mut faults = Vec::new();
        for (row, changes) in touched {
            let Some(table) = self.object_def(row).filter(|t| t.is_table()) else {
                continue;
            };
            let Some(collection) = parent_path(row) else {
                continue;
            };

            for key in &table.unique_keys {
                if !key.functional && !self.config.strict_unique_keys {
                    continue;
                }
                let Some(trigger) = changes.iter().find(|c| {
                    key.contains(&c.name) || table.enable_parameter.as_deref() == Some(c.name.as_str())
                }) else {
                    continue;
                };
                if key.functional && !self.row_enabled(table, row, &overrides) {
                    continue;
                }
                let Some(tuple) = self.key_tuple(key, row, &overrides) else {
                    continue;
                };

                let clash = self.rows(&collection).into_iter().find(|n| {
                    let other = format!("{}{}.", collection, n);
                    other != row
                        && (!key.functional || self.row_enabled(table, &other, &overrides))
                        && self.key_tuple(key, &other, &overrides).as_ref() == Some(&tuple)
                });
                if let Some(instance) = clash {
                    faults.push(ParameterFault::new(
                        format!("{}{}", row, trigger.name),
                        FAULT_INVALID_VALUE,
                        format!(
                            "unique key ({}) already used by {}{}.",
                            key.parameters.join(", "),
                            collection,
                            instance
                        ),
                    ));
                }
            }
        }
        faults
    }

    fn current<'a>(&'a self, row: &'a str, name: &'a str, overrides: &Overrides<'a>) -> Option<&'a ParameterValue> {
        overrides.get(&(row, name)).copied().or_else(|| {
            self.objects
                .get(row)
                .and_then(|o| o.values.get(name))
                .map(|state| &state.value)
        })
    }

    /// Rows of tables without an enable parameter always count as enabled
    fn row_enabled(&self, table: &ObjectDef, row: &str, overrides: &Overrides<'_>) -> bool {
        match table.enable_parameter.as_deref() {
            Some(enable) => matches!(self.current(row, enable, overrides), Some(ParameterValue::Boolean(true))),
            None => true,
        }
    }

    /// CWMP strings of a row's key parameters; `None` when all are empty
    fn key_tuple(&self, key: &UniqueKey, row: &str, overrides: &Overrides<'_>) -> Option<Vec<String>> {
        let tuple: Vec<String> = key
            .parameters
            .iter()
            .map(|name| {
                self.current(row, name, overrides)
                    .map(ParameterValue::to_cwmp_string)
                    .unwrap_or_default()
            })
            .collect();
        if tuple.iter().all(String::is_empty) { None } else { Some(tuple) }
    }
}
