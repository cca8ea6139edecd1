//! Admin bootstrap command.
//!
//! # Usage
//!
//! ```bash
//! GEM_SHOP_ADMIN_PASSWORD=... gem-cli admin setup -n "Admin Name" -e admin@example.com
//! ```
//!
//! Goes through the same service as `POST /api/admin/setup`, so it refuses to
//! run once any admin exists.
//!
//! # Environment Variables
//!
//! - `GEM_SHOP_DATABASE_URL` - `PostgreSQL` connection string
//! - `GEM_SHOP_ADMIN_PASSWORD` - Password for the new admin

use thiserror::Error;

use gem_shop_api::error::AppError;
use gem_shop_api::models::RegisterRequest;
use gem_shop_api::services::UserService;

use super::ConnectError;

const PASSWORD_VAR: &str = "GEM_SHOP_ADMIN_PASSWORD";

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// The service refused the bootstrap.
    #[error("{0}")]
    Rejected(#[from] AppError),
}

/// Create the first admin user.
///
/// # Errors
///
/// Returns `AdminError::Rejected` if an admin already exists or the input is
/// invalid.
pub async fn setup(name: &str, email: &str) -> Result<(), AdminError> {
    let password = std::env::var(PASSWORD_VAR)
        .ok()
        .filter(|p| !p.is_empty())
        .ok_or(AdminError::MissingEnvVar(PASSWORD_VAR))?;

    let store = super::connect().await?;

    tracing::info!("Creating admin user: {}", email);

    let user = UserService::new(&store)
        .setup_admin(RegisterRequest {
            name: Some(name.to_owned()),
            email: Some(email.to_owned()),
            password: Some(password),
        })
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}
