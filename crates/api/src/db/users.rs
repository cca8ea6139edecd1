//! User repository for database operations.

use sqlx::PgPool;
use tracing::{debug, instrument};

use gem_shop_core::{Email, Role, UserId};

use super::{ConflictKind, RepositoryError};
use crate::models::{NewUser, UserChanges, UserRecord};

/// Advisory lock key serializing admin bootstrap across connections.
const ADMIN_BOOTSTRAP_LOCK: i64 = 0x6765_6d5f_6164_6d6e;

/// Name of the unique constraint on `users.email`.
const EMAIL_CONSTRAINT: &str = "users_email_key";

const USER_COLUMNS: &str = "id, name, email, password_hash, role, version";

/// Raw `users` row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    version: i32,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e} in database")))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            password_hash: row.password_hash,
            role,
            version: row.version,
        })
    }
}

/// Map an insert/update failure, recognising the email unique constraint.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
        && db_err.constraint() == Some(EMAIL_CONSTRAINT)
    {
        return RepositoryError::Conflict(ConflictKind::DuplicateEmail);
    }
    RepositoryError::Database(e)
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    pub async fn create(&self, user: &NewUser) -> Result<UserRecord, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (id, name, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(UserId::new_random())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        debug!(id = %row.id, "Inserted user");
        row.try_into()
    }

    /// Insert an admin unless one already exists.
    ///
    /// Concurrent callers are serialized by a transaction-scoped advisory
    /// lock, and the insert itself is conditional on no admin row existing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict(AdminExists)` if an admin exists.
    /// Returns `RepositoryError::Conflict(DuplicateEmail)` if the email is taken.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_first_admin(&self, user: &NewUser) -> Result<UserRecord, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMIN_BOOTSTRAP_LOCK)
            .execute(&mut *tx)
            .await?;

        let row: Option<UserRow> = sqlx::query_as(&format!(
            "INSERT INTO users (id, name, email, password_hash, role)
             SELECT $1, $2, $3, $4, 'admin'
             WHERE NOT EXISTS (SELECT 1 FROM users WHERE role = 'admin')
             RETURNING {USER_COLUMNS}"
        ))
        .bind(UserId::new_random())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_write_error)?;

        let Some(row) = row else {
            // Dropping the transaction rolls it back and releases the lock.
            return Err(RepositoryError::Conflict(ConflictKind::AdminExists));
        };

        tx.commit().await?;

        debug!(id = %row.id, "Inserted first admin");
        row.try_into()
    }

    /// Check whether an admin account exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')")
                .fetch_one(self.pool)
                .await?;

        Ok(row.0)
    }

    /// Get the admin with this exact email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_admin_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND role = 'admin'"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all users in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY seq"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Merge changes into a user.
    ///
    /// Returns `Ok(None)` if no user has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, changes), fields(user_id = %id))]
    pub async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 role = COALESCE($4, role),
                 version = version + 1
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_ref().map(Email::as_str))
        .bind(changes.role.map(Role::as_str))
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
