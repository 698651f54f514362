//! Domain errors shared by the bounded contexts.

use thiserror::Error;

/// Validation failures raised by shared value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A field held a value outside its allowed domain.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidValue`].
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
