//! Error types for field operations.

use thiserror::Error;

/// Structured error types for field fills.
///
/// Resolving a field never fails; only writes validate the record's storage
/// contract.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The record attribute a field writes through is not declared as
    /// structured-map storage.
    #[error("No cast found for [{attribute}] field.")]
    AttributeCast { attribute: String },
}

impl FieldError {
    /// Check if this error is a missing structured cast
    pub fn is_attribute_cast(&self) -> bool {
        matches!(self, FieldError::AttributeCast { .. })
    }

    /// Get the attribute name associated with this error
    pub fn attribute(&self) -> &str {
        match self {
            FieldError::AttributeCast { attribute } => attribute,
        }
    }
}

// Conversion from FieldError to the main Error type
impl From<FieldError> for crate::Error {
    fn from(err: FieldError) -> Self {
        crate::Error::Field(err)
    }
}
