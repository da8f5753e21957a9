//! Error type shared by every use case

use thiserror::Error;

use crate::application::ports::{IdentityError, StoreError};
use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

impl UseCaseError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_domain_error() {
        let err: UseCaseError = DomainError::AccessDenied.into();
        assert!(matches!(err, UseCaseError::Domain(DomainError::AccessDenied)));
        assert!(err.to_string().contains("Access denied"));
    }

    #[test]
    fn test_from_store_error() {
        let err: UseCaseError = StoreError::not_found("designs", "d1").into();
        assert!(matches!(err, UseCaseError::Store(_)));
        assert!(err.to_string().contains("designs/d1"));
    }

    #[test]
    fn test_from_identity_error() {
        let err: UseCaseError = IdentityError::EmailAlreadyExists.into();
        assert!(matches!(err, UseCaseError::Identity(_)));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            UseCaseError::not_found("Project").to_string(),
            "Project not found"
        );
    }
}
