//! Shared test fixtures for the HTTP-level tests
//!
//! Builds the full router over a fresh in-memory document store so tests
//! can drive requests with `oneshot` and inspect the stored documents.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use roomielab_api::{
    api::create_router,
    application::builder::ApplicationBuilder,
    infrastructure::persistence::MemoryDocumentStore,
    ports::{DocumentStore, Query},
    Config,
};

pub const PASSWORD: &str = "secret123";

/// Router plus direct access to the store behind it
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDocumentStore>,
    pub config: Config,
}

/// Account created through the signup endpoint
pub struct TestUser {
    pub uid: String,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let state = ApplicationBuilder::new(config.clone())
            .with_store(store.clone())
            .with_identity()
            .expect("identity provider")
            .build()
            .expect("application state");

        Self {
            router: create_router(state),
            store,
            config,
        }
    }

    /// Send a request and return the status with the parsed JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = authenticated_request(method, uri, token, body);
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        extract_json_response(response).await
    }

    pub async fn signup(&self, email: &str, name: &str) -> TestUser {
        let (status, json) = self
            .request(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({"email": email, "password": PASSWORD, "displayName": name})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", json);

        TestUser {
            uid: json["data"]["uid"].as_str().unwrap().to_string(),
            email: json["data"]["email"].as_str().unwrap().to_string(),
            token: json["data"]["token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a project owned by `user` and return its id
    pub async fn create_project(&self, user: &TestUser, name: &str) -> String {
        let (status, json) = self
            .request(
                Method::POST,
                "/api/projects",
                Some(&user.token),
                Some(json!({"name": name, "roomType": "living_room"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "project create failed: {}", json);
        json["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_design(&self, user: &TestUser, project_id: &str, name: &str) -> String {
        let (status, json) = self
            .request(
                Method::POST,
                "/api/designs",
                Some(&user.token),
                Some(json!({
                    "projectId": project_id,
                    "name": name,
                    "canvasData": {"floor": "oak"},
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "design create failed: {}", json);
        json["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_furniture(&self, user: &TestUser, name: &str, price: f64) -> String {
        let (status, json) = self
            .request(
                Method::POST,
                "/api/furniture",
                Some(&user.token),
                Some(json!({
                    "name": name,
                    "description": "Solid wood with a linen finish",
                    "category": "seating",
                    "roomType": "living_room",
                    "price": price,
                    "tags": ["wood"],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "furniture create failed: {}", json);
        json["data"]["id"].as_str().unwrap().to_string()
    }

    /// Number of documents in `collection` owned by `uid`
    pub async fn owned_count(&self, collection: &str, uid: &str) -> usize {
        self.store
            .count(collection, &Query::new().where_eq("userId", uid))
            .await
            .unwrap()
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.store.count(collection, &Query::new()).await.unwrap()
    }

    /// A correctly signed token whose expiry is already in the past
    pub fn expired_token(&self, user: &TestUser) -> String {
        let now = Utc::now().timestamp();
        let claims = json!({
            "sub": user.uid,
            "email": user.email,
            "iat": now - 7200,
            "exp": now - 3600,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to create an authenticated JSON request
pub fn authenticated_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper function to extract JSON from response
pub async fn extract_json_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| json!(String::from_utf8_lossy(&body)))
    };
    (status, json)
}
