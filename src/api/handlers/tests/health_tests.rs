use std::sync::Arc;

use axum::{extract::State, http::StatusCode};

use crate::api::handlers::{health_handler, readiness_handler};
use crate::api::router::AppState;
use crate::application::ports::{MockDocumentStore, MockIdentityProvider, StoreError};
use crate::config::{Config, Environment};

fn state_with(store: MockDocumentStore, config: Config) -> AppState {
    AppState::new(config, Arc::new(store), Arc::new(MockIdentityProvider::new()))
}

#[tokio::test]
async fn test_health_handler() {
    let state = state_with(MockDocumentStore::new(), Config::default());
    let body = health_handler(State(state)).await;

    assert!(body.0.success);
    assert_eq!(body.0.status, "healthy");
    assert_eq!(body.0.environment, "development");
}

#[tokio::test]
async fn test_health_reports_production() {
    let config = Config {
        environment: Environment::Production,
        ..Config::default()
    };
    let body = health_handler(State(state_with(MockDocumentStore::new(), config))).await;
    assert_eq!(body.0.environment, "production");
}

#[tokio::test]
async fn test_readiness_with_reachable_store() {
    let mut store = MockDocumentStore::new();
    store.expect_ping().times(1).returning(|| Ok(()));

    let (status, body) = readiness_handler(State(state_with(store, Config::default()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.0.status, "ready");
    assert!(body.0.error.is_none());
}

#[tokio::test]
async fn test_readiness_with_failing_store() {
    let mut store = MockDocumentStore::new();
    store
        .expect_ping()
        .returning(|| Err(StoreError::Internal("connection refused".to_string())));

    let (status, body) = readiness_handler(State(state_with(store, Config::default()))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.0.store, "disconnected");
    assert_eq!(body.0.error.as_deref(), Some("Document store unavailable"));
}
