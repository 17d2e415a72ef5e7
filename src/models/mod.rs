//! Schema models
//!
//! Generic definitions for the objects, parameters and data types of a CWMP
//! data model, plus typed bindings for a handful of well-known objects.

pub mod catalog;
pub mod data_model;
pub mod object;
pub mod parameter;
pub mod typed;
pub mod types;

pub use catalog::{BUNDLED_MODELS, Specification, bundled_model};
pub use data_model::{DataModel, ModelError};
pub use object::{MaxEntries, ObjectDef, UniqueKey};
pub use parameter::{Access, ActiveNotify, NotificationLevel, ParameterDef, Status};
pub use typed::CwmpObject;
pub use types::{
    BaseType, DataTypeDef, ListConstraint, SizeRange, Syntax, ValueRange, builtin_data_types,
};
