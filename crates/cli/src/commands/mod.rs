//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use gem_shop_api::config::{self, ConfigError};
use gem_shop_api::db::{self, PgStore};

/// Connect to the database named by `GEM_SHOP_DATABASE_URL` / `DATABASE_URL`.
async fn connect() -> Result<PgStore, ConnectError> {
    let database_url = config::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    Ok(PgStore::new(pool))
}

/// Errors reaching the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
