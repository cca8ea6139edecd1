//! Integration tests for the `PostgreSQL` record store.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `GEM_SHOP_TEST_DATABASE_URL` pointing at it (the schema is migrated on connect)
//!
//! The tests share tables, so every record uses a unique email and the
//! assertions only look at rows the test created.
//!
//! Run with: cargo test -p gem-shop-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::SecretString;

use gem_shop_api::db::{self, PgStore, RecordStore};
use gem_shop_api::error::AppError;
use gem_shop_api::models::{NewProduct, ProductPatch, RegisterRequest};
use gem_shop_api::services::{ProductService, UserService};
use gem_shop_core::UserId;

async fn store() -> PgStore {
    let url = std::env::var("GEM_SHOP_TEST_DATABASE_URL")
        .expect("GEM_SHOP_TEST_DATABASE_URL must be set for database tests");
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    db::migrate(&pool).await.unwrap();
    PgStore::new(pool)
}

fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@example.com", UserId::new_random())
}

fn register_req(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: Some("Test".to_owned()),
        email: Some(email.to_owned()),
        password: Some("pw".to_owned()),
    }
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (GEM_SHOP_TEST_DATABASE_URL)"]
async fn test_email_unique_constraint_maps_to_conflict() {
    let store = store().await;
    let users = UserService::new(&store);
    let email = unique_email("dup");

    users.register(register_req(&email)).await.unwrap();
    let err = users.register(register_req(&email)).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateEmail));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (GEM_SHOP_TEST_DATABASE_URL)"]
async fn test_admin_bootstrap_is_atomic() {
    let store = Arc::new(store().await);
    let already_had_admin = store.admin_exists().await.unwrap();

    let mut attempts = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let store = store.clone();
        attempts.spawn(async move {
            UserService::new(store.as_ref())
                .setup_admin(register_req(&unique_email("admin")))
                .await
        });
    }
    let results = attempts.join_all().await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, usize::from(!already_had_admin));
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AppError::AdminAlreadyExists))
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (GEM_SHOP_TEST_DATABASE_URL)"]
async fn test_update_bumps_version() {
    let store = store().await;
    let users = UserService::new(&store);
    let user = users
        .register(register_req(&unique_email("ver")))
        .await
        .unwrap();

    let before = store.find_user(user.id).await.unwrap().unwrap();
    let changes = gem_shop_api::models::UserChanges {
        name: Some("Renamed".to_owned()),
        ..Default::default()
    };
    let after = store.update_user(user.id, changes).await.unwrap().unwrap();
    assert_eq!(after.version, before.version + 1);
    assert_eq!(after.name, "Renamed");
    assert_eq!(after.email, before.email);

    assert!(store.delete_user(user.id).await.unwrap());
    assert!(!store.delete_user(user.id).await.unwrap());
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (GEM_SHOP_TEST_DATABASE_URL)"]
async fn test_product_lifecycle() {
    let store = store().await;
    let products = ProductService::new(&store);

    let body = NewProduct {
        name: Some("Garnet Ring".to_owned()),
        price: Some(Decimal::new(4250, 2)),
        image_url: Some("g.jpg".to_owned()),
        stock: Some(0),
        ..NewProduct::default()
    };
    let created = products.create(body).await.unwrap();
    assert_eq!(created.category, "Gemstone Jewelry");

    let listed = products.list().await.unwrap();
    assert!(listed.iter().all(|p| p.id != created.id));

    let restock = ProductPatch {
        stock: Some(3),
        ..ProductPatch::default()
    };
    let updated = products
        .update(&created.id.to_string(), restock)
        .await
        .unwrap();
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.price, Decimal::new(4250, 2));

    let listed = products.list().await.unwrap();
    assert!(listed.iter().any(|p| p.id == created.id));

    products.delete(&created.id.to_string()).await.unwrap();
    let err = products.get(&created.id.to_string()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("Product")));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (GEM_SHOP_TEST_DATABASE_URL)"]
async fn test_ping() {
    let store = store().await;
    store.ping().await.unwrap();
}
