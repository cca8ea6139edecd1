//! Product catalog operations.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use gem_shop_core::ProductId;

use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{
    DEFAULT_CATEGORY, NewProduct, Product, ProductChanges, ProductDraft, ProductPatch,
};

/// Parse a path segment as a product id without touching the store.
fn parse_id(id: &str) -> Result<ProductId> {
    ProductId::parse(id).map_err(|_| AppError::MalformedId("Product"))
}

/// Collects field problems so the caller sees all of them at once.
#[derive(Default)]
struct Problems(Vec<String>);

impl Problems {
    fn push(&mut self, problem: impl Into<String>) {
        self.0.push(problem.into());
    }

    fn into_error(self) -> AppError {
        AppError::Validation(self.0.join("; "))
    }

    fn into_result(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

fn check_name(name: &str, problems: &mut Problems) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        problems.push("name is required");
        None
    } else {
        Some(name.to_owned())
    }
}

fn check_price(price: Decimal, problems: &mut Problems) -> Option<Decimal> {
    if price < Decimal::ZERO {
        problems.push("price must not be negative");
        None
    } else {
        Some(price)
    }
}

fn check_image_url(image_url: String, problems: &mut Problems) -> Option<String> {
    if image_url.trim().is_empty() {
        problems.push("imageUrl is required");
        None
    } else {
        Some(image_url)
    }
}

fn check_stock(stock: i64, problems: &mut Problems) -> Option<i32> {
    if stock < 0 {
        problems.push("stock must not be negative");
        return None;
    }
    i32::try_from(stock).map_or_else(
        |_| {
            problems.push("stock is too large");
            None
        },
        Some,
    )
}

/// Apply defaults and check a creation body.
fn validate_new(body: NewProduct) -> Result<ProductDraft> {
    let mut problems = Problems::default();

    let name = match body.name {
        Some(name) => check_name(&name, &mut problems),
        None => {
            problems.push("name is required");
            None
        }
    };
    let price = match body.price {
        Some(price) => check_price(price, &mut problems),
        None => {
            problems.push("price is required");
            None
        }
    };
    let image_url = match body.image_url {
        Some(url) => check_image_url(url, &mut problems),
        None => {
            problems.push("imageUrl is required");
            None
        }
    };
    let stock = check_stock(body.stock.unwrap_or(0), &mut problems);

    let (Some(name), Some(price), Some(image_url), Some(stock)) = (name, price, image_url, stock)
    else {
        return Err(problems.into_error());
    };

    Ok(ProductDraft {
        name,
        description: body
            .description
            .map(|d| d.trim().to_owned())
            .unwrap_or_default(),
        price,
        image_url,
        stock,
        category: body
            .category
            .map_or_else(|| DEFAULT_CATEGORY.to_owned(), |c| c.trim().to_owned()),
    })
}

/// Check each field present in a patch.
fn validate_patch(patch: ProductPatch) -> Result<ProductChanges> {
    let mut problems = Problems::default();

    let changes = ProductChanges {
        name: patch.name.and_then(|n| check_name(&n, &mut problems)),
        description: patch.description.map(|d| d.trim().to_owned()),
        price: patch.price.and_then(|p| check_price(p, &mut problems)),
        image_url: patch
            .image_url
            .and_then(|u| check_image_url(u, &mut problems)),
        stock: patch.stock.and_then(|s| check_stock(s, &mut problems)),
        category: patch.category.map(|c| c.trim().to_owned()),
    };

    problems.into_result()?;
    Ok(changes)
}

/// Product service.
pub struct ProductService<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> ProductService<'a> {
    /// Create a product service over the given store.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if a required field is missing or a
    /// value is out of range.
    #[instrument(skip(self, body))]
    pub async fn create(&self, body: NewProduct) -> Result<Product> {
        let draft = validate_new(body)?;
        let product = self.store.create_product(draft).await?;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Products currently in stock, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store fails.
    pub async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.store.list_products_in_stock().await?)
    }

    /// Get one product, whatever its stock.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedId` or `AppError::NotFound`.
    pub async fn get(&self, id: &str) -> Result<Product> {
        let id = parse_id(id)?;
        self.store
            .find_product(id)
            .await?
            .ok_or(AppError::NotFound("Product"))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedId`, `AppError::Validation` or
    /// `AppError::NotFound`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        let id = parse_id(id)?;
        let changes = validate_patch(patch)?;

        let product = if changes == ProductChanges::default() {
            self.store.find_product(id).await?
        } else {
            self.store.update_product(id, changes).await?
        }
        .ok_or(AppError::NotFound("Product"))?;

        info!(product_id = %product.id, stock = product.stock, "Product updated");
        Ok(product)
    }

    /// Permanently delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedId` or `AppError::NotFound`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<ProductId> {
        let id = parse_id(id)?;
        if !self.store.delete_product(id).await? {
            return Err(AppError::NotFound("Product"));
        }

        info!(product_id = %id, "Product deleted");
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn ring(stock: Option<i64>) -> NewProduct {
        NewProduct {
            name: Some("  Ring ".to_owned()),
            price: Some(Decimal::new(19_999, 2)),
            image_url: Some("r.jpg".to_owned()),
            stock,
            ..NewProduct::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let draft = validate_new(ring(None)).unwrap();
        assert_eq!(draft.name, "Ring");
        assert_eq!(draft.stock, 0);
        assert_eq!(draft.description, "");
        assert_eq!(draft.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let err = validate_new(NewProduct::default()).unwrap_err();
        let AppError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("name is required"));
        assert!(message.contains("price is required"));
        assert!(message.contains("imageUrl is required"));
    }

    #[test]
    fn test_negative_values_rejected() {
        let body = NewProduct {
            price: Some(Decimal::new(-1, 0)),
            ..ring(Some(-3))
        };
        let AppError::Validation(message) = validate_new(body).unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(message.contains("price"));
        assert!(message.contains("stock"));
    }

    #[test]
    fn test_zero_price_allowed() {
        let body = NewProduct {
            price: Some(Decimal::ZERO),
            ..ring(None)
        };
        assert_eq!(validate_new(body).unwrap().price, Decimal::ZERO);
    }

    #[test]
    fn test_stock_overflow_rejected() {
        assert!(validate_new(ring(Some(i64::from(i32::MAX) + 1))).is_err());
    }

    #[tokio::test]
    async fn test_out_of_stock_hidden_but_fetchable() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);
        let hidden = service.create(ring(Some(0))).await.unwrap();
        let shown = service.create(ring(Some(2))).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, shown.id);

        let fetched = service.get(&hidden.id.to_string()).await.unwrap();
        assert_eq!(fetched.stock, 0);
    }

    #[tokio::test]
    async fn test_update_rejects_negative_stock_without_writing() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);
        let product = service.create(ring(Some(1))).await.unwrap();
        let before = store.operations();

        let patch = ProductPatch {
            stock: Some(-1),
            ..ProductPatch::default()
        };
        let err = service
            .update(&product.id.to_string(), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.operations(), before);
    }

    #[tokio::test]
    async fn test_malformed_id_skips_store() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);
        for id in ["", "123", "not-a-uuid"] {
            assert!(matches!(
                service.get(id).await.unwrap_err(),
                AppError::MalformedId("Product")
            ));
            assert!(matches!(
                service.delete(id).await.unwrap_err(),
                AppError::MalformedId("Product")
            ));
        }
        assert_eq!(store.operations(), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_id_not_found() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);
        let patch = ProductPatch {
            stock: Some(4),
            ..ProductPatch::default()
        };
        let err = service
            .update(&ProductId::new_random().to_string(), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Product")));
    }
}
