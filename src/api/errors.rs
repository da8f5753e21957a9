use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::middleware::error_handling::DatabaseErrorUtils;
use crate::api::middleware::validation::{FieldError, ValidationErrors};
use crate::application::errors::UseCaseError;
use crate::application::ports::{IdentityError, StoreError};
use crate::domain::errors::DomainError;

/// Failure categories surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope written to the response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    /// Underlying cause of a 500; removed outside development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// API error response
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    errors: Vec<FieldError>,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: Vec::new(),
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Opaque 500 that keeps the cause for non-production responses
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(ErrorKind::Internal, "Internal server error")
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
            errors: self.errors,
            detail: self.detail,
        };

        (self.kind.status(), Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        Self {
            errors: err.into_errors(),
            ..Self::bad_request("Validation failed")
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::AccessDenied | DomainError::OwnerOnly { .. } => {
                ApiError::forbidden(err.to_string())
            }
            DomainError::ShareWithOwner => ApiError::bad_request(err.to_string()),
            DomainError::ObjectNotFound(_) => ApiError::not_found("Design object not found"),
            DomainError::InvalidDocument { .. } => ApiError::internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::not_found("Not found"),
            StoreError::Database(e) => ApiError::internal(DatabaseErrorUtils::sanitize_db_error(&e)),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken(_) | IdentityError::TokenExpired => {
                ApiError::unauthorized("Invalid or expired token")
            }
            IdentityError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            IdentityError::EmailAlreadyExists => ApiError::conflict(err.to_string()),
            IdentityError::AccountDisabled => ApiError::forbidden(err.to_string()),
            IdentityError::UserNotFound(_) => ApiError::not_found("No user found with this email"),
            IdentityError::InvalidResetCode => ApiError::bad_request(err.to_string()),
            IdentityError::Store(e) => e.into(),
            IdentityError::Hashing(_) | IdentityError::Signing(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

// Convert use case errors to API errors

impl From<UseCaseError> for ApiError {
    fn from(err: UseCaseError) -> Self {
        match err {
            UseCaseError::NotFound(msg) => ApiError::not_found(msg),
            UseCaseError::Forbidden(msg) => ApiError::forbidden(msg),
            UseCaseError::Conflict(msg) => ApiError::conflict(msg),
            UseCaseError::InvalidRequest(msg) => ApiError::bad_request(msg),
            UseCaseError::Domain(e) => e.into(),
            UseCaseError::Store(e) => e.into(),
            UseCaseError::Identity(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_status_codes() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Authentication.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Authorization.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_errors_keep_field_list() {
        let err: ApiError = ValidationErrors::new(vec![
            FieldError::new("name", "name must be between 3 and 100 characters"),
            FieldError::new("isPublic", "isPublic must be a boolean"),
        ])
        .into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_domain_mapping() {
        let err: ApiError = UseCaseError::from(DomainError::OwnerOnly {
            action: "share project",
        })
        .into();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(err.message(), "Only owner can share project");

        let err: ApiError = DomainError::ObjectNotFound("o1".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_identity_mapping() {
        let err: ApiError = IdentityError::TokenExpired.into();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.message(), "Invalid or expired token");

        let err: ApiError = IdentityError::EmailAlreadyExists.into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.message(), "Email already in use");
    }

    #[test]
    fn test_store_failures_are_opaque() {
        let err: ApiError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "Internal server error");
        assert_eq!(err.detail.as_deref(), Some("Database pool unavailable"));
    }

    #[test]
    fn test_use_case_not_found() {
        let err: ApiError = UseCaseError::not_found("Design").into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "Design not found");
    }
}
