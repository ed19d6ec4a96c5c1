//! Error types for the registration core.
//!
//! - [`StoreError`] - Durable storage failures
//! - [`Rejection`] - Why a submission was not accepted
//! - [`RegistrarError`] - Top-level action errors
//! - [`ServerError`] - HTTP server errors
//!
//! Corrupt stored data is not an error: the store recovers by treating the
//! collection as empty. Storage that cannot be read is, so nothing is ever
//! written over records that were not loaded. Error conversion is via `From`, so `?` works across
//! layers.

use thiserror::Error;

use crate::validation::FieldError;

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors from the durable record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage could not be read or written (disk full, permissions, missing directory).
    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// Records could not be serialized.
    #[error("Storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// Submission Rejections
// =============================================================================

/// Why a submitted form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// One or more fields failed validation; all of them are listed.
    #[error("{} field(s) invalid", .0.len())]
    FieldInvalid(Vec<FieldError>),

    /// Another record already uses this roll number.
    #[error("This roll number is already registered.")]
    DuplicateRollNo,

    /// Another record already uses this email.
    #[error("This email is already registered.")]
    DuplicateEmail,
}

impl Rejection {
    /// Field-level errors for display next to the inputs.
    pub fn field_errors(&self) -> Vec<FieldError> {
        use crate::validation::Field;

        match self {
            Rejection::FieldInvalid(errors) => errors.clone(),
            Rejection::DuplicateRollNo => vec![FieldError {
                field: Field::RollNo,
                message: self.to_string(),
            }],
            Rejection::DuplicateEmail => vec![FieldError {
                field: Field::Email,
                message: self.to_string(),
            }],
        }
    }

    /// Short summary for a notification.
    pub fn summary(&self) -> &'static str {
        match self {
            Rejection::FieldInvalid(_) => "Please fix the errors before submitting.",
            Rejection::DuplicateRollNo => "Roll number already exists!",
            Rejection::DuplicateEmail => "Email already registered!",
        }
    }
}

// =============================================================================
// Registrar Errors (top-level)
// =============================================================================

/// Errors from a user action.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The submission was rejected.
    #[error("Submission rejected: {0}")]
    Rejected(#[from] Rejection),

    /// No record with this id.
    #[error("Student not found: {0}")]
    NotFound(String),

    /// Storage failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// CSV export failure.
    #[error("Export error: {0}")]
    Export(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The store could not be read at startup.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for user actions.
pub type RegistrarResult<T> = Result<T, RegistrarError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    #[test]
    fn test_error_conversion_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let store_err: StoreError = io.into();
        let err: RegistrarError = store_err.into();
        assert!(err.to_string().contains("read-only"));

        let err: RegistrarError = Rejection::DuplicateEmail.into();
        assert!(err.to_string().contains("email is already registered"));
    }

    #[test]
    fn test_duplicates_map_to_their_field() {
        let errors = Rejection::DuplicateRollNo.field_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::RollNo);
        assert_eq!(errors[0].message, "This roll number is already registered.");

        assert_eq!(Rejection::DuplicateEmail.field_errors()[0].field, Field::Email);
    }

    #[test]
    fn test_field_invalid_format() {
        let rejection = Rejection::FieldInvalid(vec![
            FieldError { field: Field::Email, message: "bad".into() },
            FieldError { field: Field::Phone, message: "bad".into() },
        ]);
        assert_eq!(rejection.to_string(), "2 field(s) invalid");
        assert_eq!(rejection.field_errors().len(), 2);
    }
}
