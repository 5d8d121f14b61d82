//! Error types for secondary-side model setup.
//!
//! Stepping the model never fails; only building it from a configuration does.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecondaryError {
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Property error: {0}")]
    Props(#[from] sg_props::PropsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type SecondaryResult<T> = Result<T, SecondaryError>;

impl SecondaryError {
    pub(crate) fn invalid(field: impl Into<String>, value: f64, reason: &str) -> Self {
        SecondaryError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
