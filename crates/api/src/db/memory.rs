//! In-memory [`RecordStore`] for tests and local development.
//!
//! Every operation runs under a single mutex, so the uniqueness checks and
//! the admin bootstrap are as atomic as their `PostgreSQL` counterparts.
//! Records are kept in insertion order.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use gem_shop_core::{Email, ProductId, Role, UserId};

use super::{ConflictKind, RecordStore, RepositoryError};
use crate::models::{NewUser, Product, ProductChanges, ProductDraft, UserChanges, UserRecord};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<UserRecord>,
    products: Vec<Product>,
}

/// Process-local record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    operations: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations issued so far.
    #[must_use]
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Count the operation and lock the collections.
    fn begin(&self) -> Result<MutexGuard<'_, Collections>, RepositoryError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner))
    }
}

impl Collections {
    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == *email && Some(u.id) != except)
    }

    fn insert_user(&mut self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        if self.email_taken(&user.email, None) {
            return Err(RepositoryError::Conflict(ConflictKind::DuplicateEmail));
        }
        let record = UserRecord {
            id: UserId::new_random(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            version: 0,
        };
        self.users.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.begin().map(drop)
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        self.begin()?.insert_user(user)
    }

    async fn create_first_admin(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        let mut db = self.begin()?;
        if db.users.iter().any(|u| u.role == Role::Admin) {
            return Err(RepositoryError::Conflict(ConflictKind::AdminExists));
        }
        db.insert_user(NewUser {
            role: Role::Admin,
            ..user
        })
    }

    async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        let db = self.begin()?;
        Ok(db.users.iter().any(|u| u.role == Role::Admin))
    }

    async fn find_admin_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let db = self.begin()?;
        Ok(db
            .users
            .iter()
            .find(|u| u.role == Role::Admin && u.email == *email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        Ok(self.begin()?.users.clone())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError> {
        let db = self.begin()?;
        Ok(db.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let mut db = self.begin()?;
        if let Some(email) = &changes.email
            && db.email_taken(email, Some(id))
        {
            return Err(RepositoryError::Conflict(ConflictKind::DuplicateEmail));
        }
        let Some(user) = db.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        changes.apply_to(user);
        user.version += 1;
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut db = self.begin()?;
        let before = db.users.len();
        db.users.retain(|u| u.id != id);
        Ok(db.users.len() < before)
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let mut db = self.begin()?;
        let now = Utc::now();
        let product = Product {
            id: ProductId::new_random(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            image_url: draft.image_url,
            stock: draft.stock,
            category: draft.category,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        db.products.push(product.clone());
        Ok(product)
    }

    async fn list_products_in_stock(&self) -> Result<Vec<Product>, RepositoryError> {
        let db = self.begin()?;
        Ok(db
            .products
            .iter()
            .filter(|p| p.is_in_stock())
            .cloned()
            .collect())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let db = self.begin()?;
        Ok(db.products.iter().find(|p| p.id == id).cloned())
    }

    async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut db = self.begin()?;
        let Some(product) = db.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        changes.apply_to(product);
        product.version += 1;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut db = self.begin()?;
        let before = db.products.len();
        db.products.retain(|p| p.id != id);
        Ok(db.products.len() < before)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::DEFAULT_CATEGORY;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Test".to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            role,
        }
    }

    fn draft(stock: i32) -> ProductDraft {
        ProductDraft {
            name: "Ring".to_owned(),
            description: String::new(),
            price: Decimal::from(10),
            image_url: "x.jpg".to_owned(),
            stock,
            category: DEFAULT_CATEGORY.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("a@example.com", Role::Customer))
            .await
            .unwrap();
        let err = store
            .create_user(new_user("a@example.com", Role::Customer))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Conflict(ConflictKind::DuplicateEmail)
        ));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_first_admin_only_once() {
        let store = MemoryStore::new();
        let admin = store
            .create_first_admin(new_user("root@example.com", Role::Customer))
            .await
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        let err = store
            .create_first_admin(new_user("other@example.com", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Conflict(ConflictKind::AdminExists)
        ));
    }

    #[tokio::test]
    async fn test_update_user_to_taken_email_conflicts() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("a@example.com", Role::Customer))
            .await
            .unwrap();
        let b = store
            .create_user(new_user("b@example.com", Role::Customer))
            .await
            .unwrap();

        let changes = UserChanges {
            email: Some(Email::parse("a@example.com").unwrap()),
            ..UserChanges::default()
        };
        let err = store.update_user(b.id, changes).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Conflict(ConflictKind::DuplicateEmail)
        ));

        // Keeping one's own email is not a conflict.
        let same = UserChanges {
            email: Some(Email::parse("b@example.com").unwrap()),
            ..UserChanges::default()
        };
        let updated = store.update_user(b.id, same).await.unwrap().unwrap();
        assert_eq!(updated.version, 1);
    }

    #[tokio::test]
    async fn test_listing_filters_out_of_stock() {
        let store = MemoryStore::new();
        let hidden = store.create_product(draft(0)).await.unwrap();
        let shown = store.create_product(draft(3)).await.unwrap();

        let listed = store.list_products_in_stock().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, shown.id);

        let restock = ProductChanges {
            stock: Some(2),
            ..ProductChanges::default()
        };
        store.update_product(hidden.id, restock).await.unwrap();
        let listed = store.list_products_in_stock().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, hidden.id);
    }

    #[tokio::test]
    async fn test_delete_reports_absence() {
        let store = MemoryStore::new();
        let product = store.create_product(draft(1)).await.unwrap();
        assert!(store.delete_product(product.id).await.unwrap());
        assert!(!store.delete_product(product.id).await.unwrap());
        assert!(store.find_product(product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_offline_fails_and_counts() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(store.ping().await.is_err());
        assert!(store.list_users().await.is_err());
        assert_eq!(store.operations(), 2);
    }
}
