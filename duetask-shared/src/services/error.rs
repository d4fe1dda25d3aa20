/// Domain errors for account and to-do operations

use crate::auth::{authorization::AuthzError, password::PasswordError};

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Sign-up with an email that is already registered
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Login with an email nobody registered
    #[error("No account found for this email")]
    NoSuchAccount,

    /// Login with the wrong password
    #[error("Invalid password")]
    InvalidPassword,

    /// To-do does not exist
    #[error("To-do {0} not found")]
    NotFound(i64),

    /// To-do exists but belongs to someone else
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Input rejected before reaching the store
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Password operation failed: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a validation error from `validator` output, keeping the first message
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                ServiceError::validation(field.to_string(), message)
            }
            None => ServiceError::validation("input", "is invalid"),
        }
    }
}
