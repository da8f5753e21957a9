use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::errors::ApiError;
use crate::application::ports::IdentityProvider;

/// Outcome of reading the `Authorization` header
#[derive(Debug, PartialEq, Eq)]
pub enum BearerToken<'a> {
    Missing,
    Malformed,
    Present(&'a str),
}

impl<'a> BearerToken<'a> {
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Self::Missing;
        };
        let Ok(value) = value.to_str() else {
            return Self::Malformed;
        };
        match value.strip_prefix("Bearer ").map(str::trim) {
            Some(token) if !token.is_empty() => Self::Present(token),
            _ => Self::Malformed,
        }
    }
}

/// Verifies the bearer token and attaches the caller's `Identity`
///
/// Mounted with `from_fn_with_state` on the protected sub-routers; a
/// rejected request never reaches its handler.
pub async fn require_auth(
    State(identity): State<Arc<dyn IdentityProvider>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();

    let token = match BearerToken::from_headers(request.headers()) {
        BearerToken::Missing => {
            tracing::debug!(path = %path, "Rejected request without token");
            return Err(ApiError::unauthorized("No token provided"));
        }
        BearerToken::Malformed => {
            tracing::debug!(path = %path, "Rejected malformed authorization header");
            return Err(ApiError::unauthorized("Invalid token format"));
        }
        BearerToken::Present(token) => token.to_string(),
    };

    match identity.verify_token(&token).await {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "Token verification failed");
            Err(ApiError::unauthorized("Invalid or expired token"))
        }
    }
}
