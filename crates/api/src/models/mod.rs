//! Domain models for the API.
//!
//! Stored records, the projections returned to callers, and the request and
//! response bodies of each route.

pub mod product;
pub mod user;

pub use product::{
    DEFAULT_CATEGORY, NewProduct, Product, ProductChanges, ProductDraft, ProductPatch,
};
pub use user::{
    AdminCreated, LoginRequest, LoginResponse, NewUser, RegisterRequest, RegisteredUser, User,
    UserChanges, UserPatch, UserRecord,
};

use serde::{Deserialize, Serialize};

/// Confirmation returned by the delete routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
    pub id: String,
}
