//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gem_shop_core::ProductId;

/// Category applied when a product is created without one.
pub const DEFAULT_CATEGORY: &str = "Gemstone Jewelry";

/// A product listing.
///
/// The internal version marker is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: String,
    pub stock: i32,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub version: i32,
}

impl Product {
    /// Whether the product shows up in the public listing.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Validated input for inserting a product, with defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub stock: i32,
    pub category: String,
}

/// Validated partial update for a product. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub stock: Option<i32>,
    pub category: Option<String>,
}

impl ProductChanges {
    /// Apply these changes to a stored product in place.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image_url) = &self.image_url {
            product.image_url.clone_from(image_url);
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = &self.category {
            product.category.clone_from(category);
        }
    }
}

// =============================================================================
// Request bodies
// =============================================================================

/// Body of `POST /api/products`.
///
/// Every field is optional at the type level; required fields and ranges are
/// checked by the product service so the caller gets one validation message.
/// Keys other than the six listed are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub stock: Option<i64>,
    pub category: Option<String>,
}

/// Body of `PUT /api/products/:id`.
///
/// Only the listed fields may be changed; any other key is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub stock: Option<i64>,
    pub category: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new_random(),
            name: "Ring".to_owned(),
            description: String::new(),
            price: Decimal::new(1050, 2),
            image_url: "x.jpg".to_owned(),
            stock,
            category: DEFAULT_CATEGORY.to_owned(),
            created_at: now,
            updated_at: now,
            version: 7,
        }
    }

    #[test]
    fn test_serializes_camel_case_without_version() {
        let json = serde_json::to_value(product(5)).unwrap();
        assert_eq!(json["imageUrl"], "x.jpg");
        assert_eq!(json["price"].as_f64(), Some(10.5));
        assert!(json.get("createdAt").is_some());
        assert!(json.get("version").is_none());
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_in_stock() {
        assert!(product(1).is_in_stock());
        assert!(!product(0).is_in_stock());
    }

    #[test]
    fn test_new_product_accepts_numbers() {
        let body: NewProduct =
            serde_json::from_str(r#"{"name":"Ring","price":10,"imageUrl":"x.jpg","stock":5}"#)
                .unwrap();
        assert_eq!(body.price, Some(Decimal::from(10)));
        assert_eq!(body.stock, Some(5));
        assert!(body.category.is_none());
    }

    #[test]
    fn test_patch_rejects_unknown_keys() {
        let result = serde_json::from_str::<ProductPatch>(r#"{"featured":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_rejects_fractional_stock() {
        let result = serde_json::from_str::<ProductPatch>(r#"{"stock":1.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_changes_apply() {
        let mut p = product(5);
        let changes = ProductChanges {
            stock: Some(0),
            category: Some("Rings".to_owned()),
            ..ProductChanges::default()
        };
        changes.apply_to(&mut p);
        assert_eq!(p.stock, 0);
        assert_eq!(p.category, "Rings");
        assert_eq!(p.name, "Ring");
    }
}
