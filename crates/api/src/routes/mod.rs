//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (pings the store)
//!
//! # Accounts
//! POST   /api/admin/setup      - Create the first admin (once)
//! POST   /api/admin/login      - Check admin credentials
//! POST   /api/register         - Register a customer
//! GET    /api/users            - List users
//! GET    /api/users/{id}       - Get a user
//! PUT    /api/users/{id}       - Update name, email or role
//! DELETE /api/users/{id}       - Delete a user
//!
//! # Products
//! POST   /api/products         - Create a product
//! GET    /api/products         - List products in stock
//! GET    /api/products/{id}    - Get a product
//! PUT    /api/products/{id}    - Update a product
//! DELETE /api/products/{id}    - Delete a product
//! ```
//!
//! None of the routes require authentication.

pub mod products;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/setup", post(users::setup_admin))
        .route("/admin/login", post(users::login))
        .route("/register", post(users::register))
        .route("/users", get(users::index))
        .route(
            "/users/{id}",
            get(users::show).put(users::update).delete(users::delete),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .nest("/products", product_routes())
}

/// Build the complete application router with middleware.
///
/// Sentry layers are added by the binary so tests can drive the router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the record store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
