//! Device tree errors

use crate::models::data_model::ModelError;
use crate::rpc::{
    FAULT_INTERNAL_ERROR, FAULT_INVALID_ARGUMENTS, FAULT_INVALID_PARAMETER_NAME, FAULT_NON_WRITABLE,
    FAULT_NOTIFICATION_REJECTED, FAULT_REQUEST_DENIED, FAULT_RESOURCES_EXCEEDED, ParameterFault,
};
use crate::value::ValueError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("Invalid parameter name: {0}")]
    InvalidParameterName(String),

    #[error("Not writable: {0}")]
    NotWritable(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Resources exceeded: {0}")]
    ResourcesExceeded(String),

    #[error("Request denied: {0}")]
    RequestDenied(String),

    #[error("Notification request rejected for {0}")]
    NotificationRejected(String),

    #[error("Invalid value for {path}: {source}")]
    InvalidValue {
        path: String,
        #[source]
        source: ValueError,
    },

    #[error("SetParameterValues rejected with {} fault(s)", .0.len())]
    SetRejected(Vec<ParameterFault>),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Typed binding failed: {0}")]
    TypeBinding(String),
}

impl TreeError {
    /// CWMP fault code reported for this error
    pub fn fault_code(&self) -> u32 {
        match self {
            TreeError::InvalidParameterName(_) => FAULT_INVALID_PARAMETER_NAME,
            TreeError::NotWritable(_) => FAULT_NON_WRITABLE,
            TreeError::InvalidArguments(_) | TreeError::SetRejected(_) => FAULT_INVALID_ARGUMENTS,
            TreeError::ResourcesExceeded(_) => FAULT_RESOURCES_EXCEEDED,
            TreeError::RequestDenied(_) => FAULT_REQUEST_DENIED,
            TreeError::NotificationRejected(_) => FAULT_NOTIFICATION_REJECTED,
            TreeError::InvalidValue { source, .. } => source.fault_code(),
            TreeError::Model(_) | TreeError::TypeBinding(_) => FAULT_INTERNAL_ERROR,
        }
    }

    /// Per-parameter faults of a rejected SetParameterValues
    pub fn parameter_faults(&self) -> &[ParameterFault] {
        match self {
            TreeError::SetRejected(faults) => faults,
            _ => &[],
        }
    }

    /// Express this error as a fault against one parameter
    pub fn to_parameter_fault(&self, name: &str) -> ParameterFault {
        let detail = match self {
            TreeError::InvalidValue { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        ParameterFault::new(name, self.fault_code(), detail)
    }
}
