//! User and admin account routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::models::{
    AdminCreated, Deleted, LoginRequest, LoginResponse, RegisterRequest, RegisteredUser, User,
    UserPatch,
};
use crate::services::UserService;
use crate::state::AppState;

/// Create the first admin account.
///
/// POST /api/admin/setup
///
/// # Errors
///
/// Returns 403 once an admin exists, 400 for missing or invalid fields.
pub async fn setup_admin(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AdminCreated>)> {
    let user = UserService::new(state.store()).setup_admin(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminCreated {
            message: "Admin user created successfully.".to_owned(),
            user,
        }),
    ))
}

/// Register a customer account.
///
/// POST /api/register
///
/// # Errors
///
/// Returns 400 for missing or invalid fields, 409 for a taken email.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>)> {
    let user = UserService::new(state.store()).register(body).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Check admin credentials. No session or token is issued.
///
/// POST /api/admin/login
///
/// # Errors
///
/// Returns 401 for any refused login.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = UserService::new(state.store()).login(body).await?;

    Ok(Json(LoginResponse {
        message: "Admin login successful.".to_owned(),
        user: user.name,
    }))
}

/// GET /api/users
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(UserService::new(state.store()).list().await?))
}

/// GET /api/users/{id}
///
/// # Errors
///
/// Returns 400 for a malformed id, 404 if absent.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<User>> {
    Ok(Json(UserService::new(state.store()).get(&id).await?))
}

/// PUT /api/users/{id}
///
/// # Errors
///
/// Returns 400 for a malformed id or invalid patch, 404 if absent, 409 for a
/// taken email.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<User>> {
    Ok(Json(UserService::new(state.store()).update(&id, patch).await?))
}

/// DELETE /api/users/{id}
///
/// # Errors
///
/// Returns 400 for a malformed id, 404 if absent.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Deleted>> {
    let id = UserService::new(state.store()).delete(&id).await?;

    Ok(Json(Deleted {
        message: "User deleted successfully.".to_owned(),
        id: id.to_string(),
    }))
}
