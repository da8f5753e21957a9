use axum::http::{Method, StatusCode, Uri};
use tracing::{error, warn};

use super::config::ErrorHandlingConfig;

/// Error handling utilities
pub struct ErrorUtils;

impl ErrorUtils {
    /// Log error responses with method, path and status
    pub fn log_error(status: StatusCode, uri: &Uri, method: &Method, config: &ErrorHandlingConfig) {
        if status.is_server_error() {
            error!(
                method = %method,
                path = %uri.path(),
                status = status.as_u16(),
                "Server error"
            );
        } else if status.is_client_error() && config.log_client_errors {
            warn!(
                method = %method,
                path = %uri.path(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }
}

/// Maps sqlx failures to messages safe to show in development responses
pub struct DatabaseErrorUtils;

impl DatabaseErrorUtils {
    pub fn sanitize_db_error(error: &sqlx::Error) -> String {
        use sqlx::error::ErrorKind;

        let message = match error {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => "Document already exists",
                ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                    "Document rejected by database constraint"
                }
                _ => "Database operation error",
            },
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "Database connection error",
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "Database pool unavailable",
            sqlx::Error::RowNotFound => "Record not found",
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                "Stored document could not be decoded"
            }
            sqlx::Error::Configuration(_) => "Database configuration error",
            _ => "Database error",
        };
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_sanitization() {
        use sqlx::Error;

        let cases = [
            (
                Error::Configuration("postgres://admin:hunter2@db".into()),
                "Database configuration error",
            ),
            (
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "Connection refused",
                )),
                "Database connection error",
            ),
            (Error::PoolTimedOut, "Database pool unavailable"),
            (Error::RowNotFound, "Record not found"),
            (Error::Protocol("unexpected message".into()), "Database error"),
        ];

        for (error, expected) in cases {
            assert_eq!(DatabaseErrorUtils::sanitize_db_error(&error), expected);
        }
    }
}
