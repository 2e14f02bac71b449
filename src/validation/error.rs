//! Error types for the validation layer

use thiserror::Error;

/// Errors raised while checking untrusted order input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input cannot be parsed or does not have the required shape
    #[error("Invalid {field} format: {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    /// Input parsed but violates a numeric bound
    #[error("{field} {reason}")]
    OutOfRange { field: &'static str, reason: String },

    /// Required key absent from a parameter map
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

impl ValidationError {
    pub(crate) fn invalid_format(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(field: &'static str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidFormat { field, .. } | Self::OutOfRange { field, .. } => field,
            Self::MissingParameter(field) => field,
        }
    }
}
