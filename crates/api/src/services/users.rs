//! User account operations.

use tracing::{info, instrument};

use gem_shop_core::{Email, Role, UserId};

use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{
    LoginRequest, NewUser, RegisterRequest, User, UserChanges, UserPatch, UserRecord,
};
use crate::services::password;

/// Registration fields after presence checks.
struct Credentials {
    name: String,
    email: Email,
    password: String,
}

impl Credentials {
    /// Check that every field is present and non-blank, then parse the email.
    fn from_request(req: RegisterRequest) -> Result<Self> {
        let name = req.name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
        let email = req.email.filter(|e| !e.trim().is_empty());
        let password = req.password.filter(|p| !p.is_empty());

        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(AppError::MissingFields("name, email, password".to_owned()));
        };

        let email = Email::parse(&email).map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(Self {
            name,
            email,
            password,
        })
    }

    async fn into_new_user(self, role: Role) -> Result<NewUser> {
        Ok(NewUser {
            name: self.name,
            email: self.email,
            password_hash: password::hash(self.password).await?,
            role,
        })
    }
}

/// Parse a path segment as a user id without touching the store.
fn parse_id(id: &str) -> Result<UserId> {
    UserId::parse(id).map_err(|_| AppError::MalformedId("User"))
}

/// User service.
///
/// Holds no state of its own; every call goes to the record store.
pub struct UserService<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> UserService<'a> {
    /// Create a user service over the given store.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Create the first admin account.
    ///
    /// Once an admin exists this fails with `AdminAlreadyExists` whatever the
    /// payload. The insert itself is conditional in the store, so concurrent
    /// bootstraps cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AdminAlreadyExists` if an admin is already present.
    /// Returns `AppError::MissingFields` or `AppError::Validation` for bad input.
    /// Returns `AppError::DuplicateEmail` if the email belongs to a customer.
    #[instrument(skip(self, req))]
    pub async fn setup_admin(&self, req: RegisterRequest) -> Result<User> {
        if self.store.admin_exists().await? {
            return Err(AppError::AdminAlreadyExists);
        }

        let new_user = Credentials::from_request(req)?
            .into_new_user(Role::Admin)
            .await?;
        let user = self.store.create_first_admin(new_user).await?.into_public();

        info!(user_id = %user.id, "Admin account bootstrapped");
        Ok(user)
    }

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingFields` if any field is absent or blank.
    /// Returns `AppError::Validation` if the email is malformed.
    /// Returns `AppError::DuplicateEmail` if the email is already registered.
    #[instrument(skip(self, req))]
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        let new_user = Credentials::from_request(req)?
            .into_new_user(Role::Customer)
            .await?;
        let user = self.store.create_user(new_user).await?.into_public();

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check admin credentials.
    ///
    /// Unknown emails, non-admin accounts and wrong passwords are
    /// indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidCredentials` if the login is refused.
    #[instrument(skip(self, req))]
    pub async fn login(&self, req: LoginRequest) -> Result<User> {
        let (Some(email), Some(password)) = (req.email, req.password) else {
            return Err(AppError::InvalidCredentials);
        };
        let Ok(email) = Email::parse(&email) else {
            return Err(AppError::InvalidCredentials);
        };

        let record = self
            .store
            .find_admin_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify(password, record.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = %record.id, "Admin logged in");
        Ok(record.into_public())
    }

    /// List every user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store fails.
    pub async fn list(&self) -> Result<Vec<User>> {
        let records = self.store.list_users().await?;
        Ok(records.into_iter().map(UserRecord::into_public).collect())
    }

    /// Get one user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedId` or `AppError::NotFound`.
    pub async fn get(&self, id: &str) -> Result<User> {
        let id = parse_id(id)?;
        self.store
            .find_user(id)
            .await?
            .map(UserRecord::into_public)
            .ok_or(AppError::NotFound("User"))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedId`, `AppError::Validation`,
    /// `AppError::NotFound` or `AppError::DuplicateEmail`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: UserPatch) -> Result<User> {
        let id = parse_id(id)?;
        let changes = validate_patch(patch)?;

        // Nothing to write; answer with the current record.
        let record = if changes.is_empty() {
            self.store.find_user(id).await?
        } else {
            self.store.update_user(id, changes).await?
        };
        let user = record.ok_or(AppError::NotFound("User"))?.into_public();

        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Permanently delete a user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedId` or `AppError::NotFound`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<UserId> {
        let id = parse_id(id)?;
        if !self.store.delete_user(id).await? {
            return Err(AppError::NotFound("User"));
        }

        info!(user_id = %id, "User deleted");
        Ok(id)
    }
}

fn validate_patch(patch: UserPatch) -> Result<UserChanges> {
    let name = patch
        .name
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                Err(AppError::Validation("name must not be empty".to_owned()))
            } else {
                Ok(name.to_owned())
            }
        })
        .transpose()?;

    let email = patch
        .email
        .map(|email| Email::parse(&email).map_err(|e| AppError::Validation(e.to_string())))
        .transpose()?;

    Ok(UserChanges {
        name,
        email,
        role: patch.role,
    })
}
