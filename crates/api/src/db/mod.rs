//! Record store for users and products.
//!
//! The API talks to persistence only through the [`RecordStore`] trait. Two
//! implementations exist:
//!
//! - [`PgStore`] - `PostgreSQL` via `sqlx`, used in production
//! - [`MemoryStore`] - process-local maps, used by tests and local development
//!
//! ## Tables
//!
//! - `users` - Accounts; `email` carries the `users_email_key` unique constraint
//! - `products` - Listings; `seq` preserves insertion order for the listing
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p gem-shop-cli -- migrate
//! ```

pub mod memory;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use gem_shop_core::{Email, ProductId, UserId};

use crate::models::{NewUser, Product, ProductChanges, ProductDraft, UserChanges, UserRecord};

pub use memory::MemoryStore;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Which constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Another user already has this email.
    DuplicateEmail,
    /// An admin already exists, so the bootstrap insert was refused.
    AdminExists,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEmail => f.write_str("email already exists"),
            Self::AdminExists => f.write_str("admin already exists"),
        }
    }
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(ConflictKind),
}

/// Persistence operations needed by the user and product services.
///
/// Lookups return `Ok(None)` and deletes return `Ok(false)` when no record has
/// the given id; the services turn those into "not found" responses.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Insert a user. Fails with [`ConflictKind::DuplicateEmail`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;

    /// Insert a user only if no admin exists yet, atomically.
    ///
    /// Fails with [`ConflictKind::AdminExists`] when an admin is already present.
    async fn create_first_admin(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;

    /// Whether any user holds the admin role.
    async fn admin_exists(&self) -> Result<bool, RepositoryError>;

    /// Find the admin whose email matches exactly.
    async fn find_admin_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserRecord>, RepositoryError>;

    /// All users in insertion order.
    async fn list_users(&self) -> Result<Vec<UserRecord>, RepositoryError>;

    /// Look up one user.
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError>;

    /// Merge `changes` into the stored user and return the result.
    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, RepositoryError>;

    /// Permanently remove a user. Returns whether a record was removed.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError>;

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Insert a product, stamping both timestamps.
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;

    /// Products with `stock > 0`, in insertion order.
    async fn list_products_in_stock(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Look up one product regardless of stock.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Merge `changes` into the stored product, bumping `updated_at`.
    async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Permanently remove a product. Returns whether a record was removed.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations against `pool`.
///
/// # Errors
///
/// Returns the migrator's error if any migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// `PostgreSQL`-backed [`RecordStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    const fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.pool)
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        self.users().create(&user).await
    }

    async fn create_first_admin(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        self.users().create_first_admin(&user).await
    }

    async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        self.users().admin_exists().await
    }

    async fn find_admin_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        self.users().get_admin_by_email(email).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        self.users().list().await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError> {
        self.users().get_by_id(id).await
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        self.users().update(id, &changes).await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        self.users().delete(id).await
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        self.products().create(&draft).await
    }

    async fn list_products_in_stock(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products().list_in_stock().await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.products().get_by_id(id).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        self.products().update(id, &changes).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        self.products().delete(id).await
    }
}
