use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes, HttpBody},
    extract::Request,
    http::{self, header, Method, Uri},
    response::Response,
    BoxError,
};
use serde_json::Value;

use super::config::ErrorHandlingConfig;
use super::sanitizers::ErrorSanitizer;
use super::utils::ErrorUtils;

/// Largest error body read back for inspection
const MAX_INSPECTED_BODY: usize = 64 * 1024;

/// Logs every error response and rewrites it into the JSON error envelope
#[derive(Clone)]
pub struct ErrorHandlingLayer {
    config: Arc<ErrorHandlingConfig>,
}

impl ErrorHandlingLayer {
    pub fn new(config: ErrorHandlingConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> tower::Layer<S> for ErrorHandlingLayer {
    type Service = ErrorHandlingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorHandlingService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Error handling service wrapper
#[derive(Clone)]
pub struct ErrorHandlingService<S> {
    inner: S,
    config: Arc<ErrorHandlingConfig>,
}

impl<S, B> tower::Service<Request> for ErrorHandlingService<S>
where
    S: tower::Service<Request, Response = http::Response<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let uri = req.uri().clone();
            let method = req.method().clone();

            let response = inner.call(req).await?.map(Body::new);
            let status = response.status();
            if !status.is_client_error() && !status.is_server_error() {
                return Ok(response);
            }

            ErrorUtils::log_error(status, &uri, &method, &config);
            Ok(normalize(response, &uri, &method, &config).await)
        })
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// 5xx bodies become opaque; non-JSON 4xx bodies from the framework are wrapped
async fn normalize(
    response: Response,
    uri: &Uri,
    method: &Method,
    config: &ErrorHandlingConfig,
) -> Response {
    let status = response.status();
    let json = is_json(&response);
    if status.is_client_error() && json {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_INSPECTED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(method = %method, path = %uri.path(), error = %e, "Unreadable error body");
            Default::default()
        }
    };

    if status.is_server_error() {
        let detail = if config.include_debug_info {
            let raw = if json {
                serde_json::from_slice::<Value>(&bytes)
                    .ok()
                    .and_then(|v| v.get("detail").and_then(Value::as_str).map(String::from))
            } else {
                Some(String::from_utf8_lossy(&bytes).trim().to_string())
            };
            raw.filter(|d| !d.is_empty())
                .map(|d| ErrorSanitizer::sanitize_error_message(&d, config))
        } else {
            None
        };
        return ErrorSanitizer::create_error_response(status, "Internal server error", detail);
    }

    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("Request failed").to_string()
    } else {
        text
    };

    let mut wrapped = ErrorSanitizer::create_error_response(status, &message, None);
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            wrapped.headers_mut().insert(name.clone(), value.clone());
        }
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::ApiError;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::convert::Infallible;
    use tower::{Layer, ServiceExt};

    async fn run(config: ErrorHandlingConfig, response: fn() -> Response) -> (StatusCode, Value) {
        let service = ErrorHandlingLayer::new(config).layer(tower::service_fn(
            move |_req: Request| async move { Ok::<_, Infallible>(response()) },
        ));
        let response = service
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_production_hides_internal_detail() {
        let (status, body) = run(ErrorHandlingConfig::for_environment(true), || {
            ApiError::internal("Document not found: users/u1").into_response()
        })
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["success"], false);
        assert!(body.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_development_keeps_detail() {
        let (_, body) = run(ErrorHandlingConfig::for_environment(false), || {
            ApiError::internal("Database pool unavailable").into_response()
        })
        .await;
        assert_eq!(body["detail"], "Database pool unavailable");
    }

    #[tokio::test]
    async fn test_plain_text_panic_body_is_wrapped() {
        let (status, body) = run(ErrorHandlingConfig::for_environment(false), || {
            (StatusCode::INTERNAL_SERVER_ERROR, "handler panicked").into_response()
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "handler panicked");
    }

    #[tokio::test]
    async fn test_framework_rejection_gets_envelope() {
        let (status, body) = run(ErrorHandlingConfig::default(), || {
            StatusCode::METHOD_NOT_ALLOWED.into_response()
        })
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_json_client_errors_pass_through() {
        let (status, body) = run(ErrorHandlingConfig::default(), || {
            ApiError::not_found("Project not found").into_response()
        })
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Project not found");
    }
}
