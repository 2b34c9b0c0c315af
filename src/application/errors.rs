//! Service errors shared by all use cases

use thiserror::Error;

use crate::application::ports::outbound::{AiError, RepoError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("not allowed: {0}")]
    NotAllowed(String),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Ai(#[from] AiError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn not_allowed(reason: impl Into<String>) -> Self {
        ServiceError::NotAllowed(reason.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![message.into()])
    }

    /// `Ok(())` when there are no messages, otherwise a validation error
    pub fn check(errors: Vec<String>) -> ServiceResult<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(errors))
        }
    }
}

impl From<&'static str> for ServiceError {
    fn from(message: &'static str) -> Self {
        ServiceError::invalid(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_passes_without_messages() {
        assert!(ServiceError::check(Vec::new()).is_ok());
    }

    #[test]
    fn test_validation_display_joins_messages() {
        let err = ServiceError::Validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "validation failed: a; b");
    }
}
