//! User domain types.
//!
//! [`UserRecord`] is what the store holds, including the password hash and
//! the internal version marker. [`User`] is the projection handed to callers;
//! converting between the two is the only way a record leaves the service
//! layer, so neither field can leak into a response.

use serde::{Deserialize, Serialize};

use gem_shop_core::{Email, Role, UserId};

/// A stored user account.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique login email.
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Incremented by the store on every update.
    pub version: i32,
}

impl UserRecord {
    /// Strip the password hash and version marker.
    #[must_use]
    pub fn into_public(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
        }
    }
}

/// A user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

/// Validated input for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
}

/// Validated partial update for a user. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub role: Option<Role>,
}

impl UserChanges {
    /// Whether the update touches no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }

    /// Apply these changes to a stored record in place.
    pub fn apply_to(&self, record: &mut UserRecord) {
        if let Some(name) = &self.name {
            record.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            record.email = email.clone();
        }
        if let Some(role) = self.role {
            record.role = role;
        }
    }
}

// =============================================================================
// Request bodies
// =============================================================================

/// Body of `POST /api/register` and `POST /api/admin/setup`.
///
/// Fields are optional at the type level so that absent fields surface as a
/// "missing fields" error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/admin/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `PUT /api/users/:id`.
///
/// The password cannot be changed through this route; any key other than
/// the three below is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

// =============================================================================
// Response bodies
// =============================================================================

/// Response of a successful registration. The role is implied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Response of a successful admin bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreated {
    pub message: String,
    pub user: User,
}

/// Response of a successful admin login. No session is issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    /// Display name of the admin.
    pub user: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            id: UserId::new_random(),
            name: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
            role: Role::Customer,
            version: 3,
        }
    }

    #[test]
    fn test_public_projection_has_no_secrets() {
        let json = serde_json::to_value(record().into_public()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj.contains_key("id"));
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("password_hash"));
        assert!(!obj.contains_key("version"));
        assert_eq!(json["role"], "customer");
    }

    #[test]
    fn test_changes_apply_only_given_fields() {
        let mut user = record();
        let changes = UserChanges {
            role: Some(Role::Admin),
            ..UserChanges::default()
        };
        changes.apply_to(&mut user);
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_patch_rejects_password() {
        let result = serde_json::from_str::<UserPatch>(r#"{"password":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_rejects_unknown_role() {
        let result = serde_json::from_str::<UserPatch>(r#"{"role":"owner"}"#);
        assert!(result.is_err());
    }
}
