//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! gem-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `GEM_SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migration files live in `crates/api/migrations/` and are embedded at
//! compile time.

use thiserror::Error;

use gem_shop_api::db;

use super::ConnectError;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply every pending migration.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let store = super::connect().await?;

    tracing::info!("Running migrations...");
    db::migrate(store.pool()).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
