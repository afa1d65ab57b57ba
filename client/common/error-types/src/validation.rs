//! Validation error types
//!
//! Raised before any request leaves the client.

use thiserror::Error;

/// Field-level validation failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is empty or whitespace-only
    #[error("{field} must not be empty")]
    Blank { field: &'static str },

    /// Field is present but malformed
    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field } | Self::Invalid { field, .. } => field,
        }
    }
}

/// Common validation rules
pub mod rules {
    use super::ValidationError;

    /// Reject empty or whitespace-only input
    pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Blank { field });
        }
        Ok(())
    }
}
