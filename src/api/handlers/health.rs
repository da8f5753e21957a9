use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::router::AppState;

const READINESS_TIMEOUT: Duration = Duration::from_secs(2);

/// Basic health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub service: String,
    pub version: String,
    pub environment: String,
    pub timestamp: String,
}

/// Store readiness response
#[derive(Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub success: bool,
    pub status: String,
    pub store: String,
    pub response_time_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health
/// Liveness probe; touches nothing external
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: if state.config.is_production() {
            "production"
        } else {
            "development"
        }
        .to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /health/ready
/// Readiness probe with a bounded document store round trip
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Document store unreachable", body = ReadinessResponse)
    )
)]
pub async fn readiness_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let start = Instant::now();
    let check = tokio::time::timeout(READINESS_TIMEOUT, state.store.ping()).await;
    let response_time_ms = start.elapsed().as_millis();

    let error = match check {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Readiness check failed");
            Some("Document store unavailable".to_string())
        }
        Err(_) => {
            tracing::warn!(timeout_ms = READINESS_TIMEOUT.as_millis() as u64, "Readiness check timed out");
            Some("Document store timeout".to_string())
        }
    };

    let status = if error.is_none() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            success: error.is_none(),
            status: if error.is_none() { "ready" } else { "not_ready" }.to_string(),
            store: if error.is_none() { "connected" } else { "disconnected" }.to_string(),
            response_time_ms,
            error,
        }),
    )
}
