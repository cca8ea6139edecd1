//! Integration tests for Gem Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests against the in-memory store
//! cargo test -p gem-shop-integration-tests
//!
//! # Including the PostgreSQL store tests (needs a migrated database)
//! GEM_SHOP_TEST_DATABASE_URL=postgres://... cargo test -p gem-shop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `users` - Registration, admin bootstrap and login, user management
//! - `products` - Product catalog
//! - `postgres_store` - `PgStore` against a real database

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use gem_shop_api::db::MemoryStore;
use gem_shop_api::routes;
use gem_shop_api::state::AppState;

/// Router wired to a fresh in-memory store.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    /// The store behind the router, for operation counts and fault injection.
    pub store: Arc<MemoryStore>,
}

/// Status and decoded body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body, or a JSON string holding the raw text for non-JSON bodies.
    pub body: Value,
}

impl TestApp {
    /// Build the full application router over an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = routes::app(AppState::new(store.clone()));
        Self { router, store }
    }

    /// Send a request with an optional JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send_request(request).await
    }

    /// Send a prepared request.
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert that no key anywhere in `value` looks like a password.
pub fn assert_no_password(value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                assert!(
                    !key.to_lowercase().contains("password"),
                    "response leaked `{key}`: {value}"
                );
                assert_no_password(inner);
            }
        }
        Value::Array(items) => items.iter().for_each(assert_no_password),
        _ => {}
    }
}
