//! Property provider errors.

use sg_core::CoreError;
use thiserror::Error;

/// Result type for property operations.
pub type PropsResult<T> = Result<T, PropsError>;

/// Errors raised while building or validating a property backend.
///
/// Property evaluation itself never fails; inputs are clamped to the fitted range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropsError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Error from a shared numeric check.
    #[error(transparent)]
    Core(#[from] CoreError),
}
