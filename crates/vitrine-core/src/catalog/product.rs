//! Product types.

use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use crate::StoreError;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// Stock is a plain unit count, decremented only by successful order
/// validation. It never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// URL-friendly slug (unique).
    pub slug: String,
    /// Full description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Money,
    /// Units in stock.
    pub stock: i64,
    /// Category this product belongs to.
    pub category_id: Option<CategoryId>,
    /// Available size labels, in display order.
    pub sizes: Vec<String>,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// Part of the latest drop.
    pub is_new_drop: bool,
    /// Featured on the storefront.
    pub is_featured: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Check if the product has any units left.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Check if a specific quantity is available.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// Check if a size label is offered.
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_new_drop: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl ProductDraft {
    /// Validate the draft, collecting every violation.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut errors = Vec::new();

        if self.name.trim().len() < 2 {
            errors.push("name must be at least 2 characters".to_string());
        }
        if self.slug.trim().is_empty() {
            errors.push("slug is required".to_string());
        } else if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            errors.push("slug may only contain letters, digits, and dashes".to_string());
        }
        if !self.price.is_positive() {
            errors.push("price must be positive".to_string());
        }
        if self.stock < 0 {
            errors.push("stock must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }

    /// Materialize the draft into a product with a fresh ID.
    pub fn into_product(self) -> Result<Product, StoreError> {
        self.validate()?;
        let now = current_timestamp();
        Ok(Product {
            id: ProductId::generate(),
            name: self.name,
            slug: self.slug,
            description: self.description,
            price: self.price,
            stock: self.stock,
            category_id: self.category_id,
            sizes: self.sizes,
            image_url: self.image_url,
            is_new_drop: self.is_new_drop,
            is_featured: self.is_featured,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update for a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
    pub category_id: Option<CategoryId>,
    pub sizes: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub is_new_drop: Option<bool>,
    pub is_featured: Option<bool>,
}

impl ProductPatch {
    /// Apply the patch to a product, bumping `updated_at`.
    pub fn apply(self, product: &mut Product) -> Result<(), StoreError> {
        let mut errors = Vec::new();

        if let Some(name) = self.name {
            if name.trim().len() < 2 {
                errors.push("name must be at least 2 characters".to_string());
            } else {
                product.name = name;
            }
        }
        if let Some(slug) = self.slug {
            if slug.trim().is_empty() {
                errors.push("slug is required".to_string());
            } else {
                product.slug = slug;
            }
        }
        if let Some(price) = self.price {
            if !price.is_positive() {
                errors.push("price must be positive".to_string());
            } else {
                product.price = price;
            }
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                errors.push("stock must not be negative".to_string());
            } else {
                product.stock = stock;
            }
        }
        if let Some(description) = self.description {
            product.description = Some(description);
        }
        if let Some(category_id) = self.category_id {
            product.category_id = Some(category_id);
        }
        if let Some(sizes) = self.sizes {
            product.sizes = sizes;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = Some(image_url);
        }
        if let Some(flag) = self.is_new_drop {
            product.is_new_drop = flag;
        }
        if let Some(flag) = self.is_featured {
            product.is_featured = flag;
        }

        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }
        product.updated_at = current_timestamp();
        Ok(())
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Box Logo Tee".to_string(),
            slug: "box-logo-tee".to_string(),
            description: None,
            price: Money::from_decimal(49.99),
            stock: 10,
            category_id: None,
            sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            image_url: None,
            is_new_drop: true,
            is_featured: false,
        }
    }

    #[test]
    fn test_draft_into_product() {
        let product = draft().into_product().unwrap();
        assert_eq!(product.name, "Box Logo Tee");
        assert_eq!(product.stock, 10);
        assert!(product.is_in_stock());
        assert!(product.can_fulfill(10));
        assert!(!product.can_fulfill(11));
        assert!(product.has_size("M"));
        assert!(!product.has_size("XXL"));
    }

    #[test]
    fn test_draft_validation() {
        let mut bad = draft();
        bad.name = "X".to_string();
        bad.price = Money::zero();
        bad.stock = -1;
        match bad.validate() {
            Err(StoreError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_draft_rejects_bad_slug() {
        let mut bad = draft();
        bad.slug = "box logo tee!".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_patch_applies_fields() {
        let mut product = draft().into_product().unwrap();
        let patch = ProductPatch {
            price: Some(Money::from_decimal(59.99)),
            stock: Some(3),
            is_featured: Some(true),
            ..Default::default()
        };
        patch.apply(&mut product).unwrap();
        assert_eq!(product.price.cents, 5999);
        assert_eq!(product.stock, 3);
        assert!(product.is_featured);
    }

    #[test]
    fn test_patch_rejects_negative_stock() {
        let mut product = draft().into_product().unwrap();
        let patch = ProductPatch {
            stock: Some(-5),
            ..Default::default()
        };
        assert!(patch.apply(&mut product).is_err());
    }
}
