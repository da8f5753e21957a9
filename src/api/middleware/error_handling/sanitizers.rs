use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::config::ErrorHandlingConfig;
use crate::api::errors::ErrorBody;

const MAX_DETAIL_LENGTH: usize = 200;

/// Error sanitization utilities
pub struct ErrorSanitizer;

impl ErrorSanitizer {
    /// Redact messages that mention credentials and cap their length
    pub fn sanitize_error_message(message: &str, config: &ErrorHandlingConfig) -> String {
        let lower = message.to_lowercase();
        if config
            .sensitive_patterns
            .iter()
            .any(|pattern| lower.contains(pattern.as_str()))
        {
            return "An error occurred".to_string();
        }

        if message.chars().count() > MAX_DETAIL_LENGTH {
            let truncated: String = message.chars().take(MAX_DETAIL_LENGTH).collect();
            format!("{}...", truncated)
        } else {
            message.to_string()
        }
    }

    /// Envelope response with no field errors
    pub fn create_error_response(
        status: StatusCode,
        message: &str,
        detail: Option<String>,
    ) -> Response {
        let body = ErrorBody {
            success: false,
            error: message.to_string(),
            errors: Vec::new(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}
