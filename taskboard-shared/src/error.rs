/// Domain error taxonomy shared by the auth and task services
///
/// | Variant | Meaning |
/// |---|---|
/// | `Conflict` | email already registered |
/// | `Unauthorized` | bad credentials; message is always generic |
/// | `NotFound` | record absent or not owned by the caller |
/// | `InvalidInput` | a field failed validation |
/// | `Internal` | storage or crypto failure; details are for logs only |
///
/// Nothing here is retried. Storage failures fail the request.

use crate::{
    auth::{jwt::JwtError, password::PasswordError},
    store::StoreError,
};

/// Message returned for every credential failure
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Conflict(String),

    #[error("{}", INVALID_CREDENTIALS)]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ServiceError::Conflict("Email already exists".to_string()),
            StoreError::Database(e) => ServiceError::Internal(format!("storage failure: {}", e)),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::InvalidInput(message) => ServiceError::invalid("password", message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message_is_generic() {
        assert_eq!(ServiceError::Unauthorized.to_string(), INVALID_CREDENTIALS);
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            ServiceError::from(StoreError::DuplicateEmail),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Database(sqlx::Error::PoolTimedOut)),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn test_password_input_error_maps_to_field() {
        let err = ServiceError::from(PasswordError::InvalidInput("empty".to_string()));
        match err {
            ServiceError::InvalidInput { field, .. } => assert_eq!(field, "password"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
