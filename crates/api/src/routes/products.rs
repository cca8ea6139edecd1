//! Product catalog routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::models::{Deleted, NewProduct, Product, ProductPatch};
use crate::services::ProductService;
use crate::state::AppState;

/// POST /api/products
///
/// # Errors
///
/// Returns 400 if a required field is missing or a value is out of range.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = ProductService::new(state.store()).create(body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Public listing: only products with stock.
///
/// GET /api/products
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductService::new(state.store()).list().await?))
}

/// GET /api/products/{id}
///
/// # Errors
///
/// Returns 400 for a malformed id, 404 if absent.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Product>> {
    Ok(Json(ProductService::new(state.store()).get(&id).await?))
}

/// PUT /api/products/{id}
///
/// # Errors
///
/// Returns 400 for a malformed id or invalid patch, 404 if absent.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<Product>> {
    Ok(Json(
        ProductService::new(state.store()).update(&id, patch).await?,
    ))
}

/// DELETE /api/products/{id}
///
/// # Errors
///
/// Returns 400 for a malformed id, 404 if absent.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Deleted>> {
    let id = ProductService::new(state.store()).delete(&id).await?;

    Ok(Json(Deleted {
        message: "Product deleted successfully.".to_owned(),
        id: id.to_string(),
    }))
}
