//! Product repository.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use vitrine_core::catalog::{Product, ProductDraft, ProductPatch};
use vitrine_core::ids::{CategoryId, ProductId};
use vitrine_core::money::Money;
use vitrine_core::StoreError;

use crate::pool::ConnectionPool;
use crate::{current_timestamp, db_err, insert_err};

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price_cents, stock, category_id, \
                               sizes, image_url, is_new_drop, is_featured, created_at, updated_at";

/// Catalog repository: admin CRUD plus storefront reads.
///
/// Stock is read here but only ever decremented by order validation.
#[derive(Clone)]
pub struct ProductStore {
    pool: Arc<ConnectionPool>,
}

impl ProductStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Insert a new product from a draft.
    pub fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let product = draft.into_product()?;
        let sizes = serde_json::to_string(&product.sizes)?;

        self.pool.with_writer(|conn| {
            conn.execute(
                "INSERT INTO products (id, name, slug, description, price_cents, stock, \
                 category_id, sizes, image_url, is_new_drop, is_featured, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    product.id.as_str(),
                    product.name,
                    product.slug,
                    product.description,
                    product.price.cents,
                    product.stock,
                    product.category_id.as_ref().map(|c| c.as_str()),
                    sizes,
                    product.image_url,
                    product.is_new_drop as i64,
                    product.is_featured as i64,
                    product.created_at,
                    product.updated_at,
                ],
            )
            .map_err(|e| insert_err(e, &format!("product slug '{}'", product.slug)))?;
            Ok(())
        })?;

        debug!(product = %product.id, slug = %product.slug, "product created");
        Ok(product)
    }

    /// Apply a partial update to a product.
    pub fn update(&self, id: &ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        self.pool.with_writer(|conn| {
            let tx = conn.transaction().map_err(db_err)?;

            let mut product = query_product(
                &tx,
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                id.as_str(),
            )?
            .ok_or_else(|| StoreError::ProductNotFound(id.to_string()))?;

            patch.apply(&mut product)?;
            let sizes = serde_json::to_string(&product.sizes)?;

            tx.execute(
                "UPDATE products SET name = ?1, slug = ?2, description = ?3, price_cents = ?4, \
                 stock = ?5, category_id = ?6, sizes = ?7, image_url = ?8, is_new_drop = ?9, \
                 is_featured = ?10, updated_at = ?11 WHERE id = ?12",
                params![
                    product.name,
                    product.slug,
                    product.description,
                    product.price.cents,
                    product.stock,
                    product.category_id.as_ref().map(|c| c.as_str()),
                    sizes,
                    product.image_url,
                    product.is_new_drop as i64,
                    product.is_featured as i64,
                    product.updated_at,
                    product.id.as_str(),
                ],
            )
            .map_err(|e| insert_err(e, &format!("product slug '{}'", product.slug)))?;

            tx.commit().map_err(db_err)?;
            Ok(product)
        })
    }

    /// Delete a product.
    ///
    /// Refused while any pending order references it; completed and
    /// cancelled history keeps its snapshots and never blocks cleanup.
    pub fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        self.pool.with_writer(|conn| {
            let tx = conn.transaction().map_err(db_err)?;

            let exists: Option<String> = tx
                .query_row(
                    "SELECT id FROM products WHERE id = ?1",
                    [id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_err)?;
            if exists.is_none() {
                return Err(StoreError::ProductNotFound(id.to_string()));
            }

            let pending: i64 = tx
                .query_row(
                    "SELECT COUNT(*) FROM order_items oi \
                     JOIN orders o ON o.id = oi.order_id \
                     WHERE oi.product_id = ?1 AND o.status = 'pending'",
                    [id.as_str()],
                    |row| row.get(0),
                )
                .map_err(db_err)?;
            if pending > 0 {
                return Err(StoreError::InvalidState(
                    "product is referenced by pending orders".to_string(),
                ));
            }

            tx.execute("DELETE FROM products WHERE id = ?1", [id.as_str()])
                .map_err(db_err)?;
            tx.commit().map_err(db_err)?;

            debug!(product = %id, "product deleted");
            Ok(())
        })
    }

    /// Fetch a product by ID.
    pub fn get(&self, id: &ProductId) -> Result<Product, StoreError> {
        self.pool
            .with_reader(|conn| {
                query_product(
                    conn,
                    &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                    id.as_str(),
                )
            })?
            .ok_or_else(|| StoreError::ProductNotFound(id.to_string()))
    }

    /// Fetch a product by slug.
    pub fn get_by_slug(&self, slug: &str) -> Result<Product, StoreError> {
        self.pool
            .with_reader(|conn| {
                query_product(
                    conn,
                    &format!("SELECT {} FROM products WHERE slug = ?1", PRODUCT_COLUMNS),
                    slug,
                )
            })?
            .ok_or_else(|| StoreError::ProductNotFound(slug.to_string()))
    }

    /// List all products, newest first.
    pub fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.pool.with_reader(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM products ORDER BY created_at DESC, id DESC",
                    PRODUCT_COLUMNS
                ))
                .map_err(db_err)?;
            let rows = stmt
                .query_map([], product_from_row)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            Ok(rows)
        })
    }

    /// Directly set the stock count (admin restock/correction).
    pub fn set_stock(&self, id: &ProductId, stock: i64) -> Result<(), StoreError> {
        if stock < 0 {
            return Err(StoreError::validation("stock must not be negative"));
        }
        self.pool.with_writer(|conn| {
            let changed = conn
                .execute(
                    "UPDATE products SET stock = ?1, updated_at = ?2 WHERE id = ?3",
                    params![stock, current_timestamp(), id.as_str()],
                )
                .map_err(db_err)?;
            if changed == 0 {
                return Err(StoreError::ProductNotFound(id.to_string()));
            }
            Ok(())
        })
    }
}

fn query_product(
    conn: &rusqlite::Connection,
    sql: &str,
    key: &str,
) -> Result<Option<Product>, StoreError> {
    conn.query_row(sql, [key], product_from_row)
        .optional()
        .map_err(db_err)
}

pub(crate) fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let sizes_json: String = row.get("sizes")?;
    let sizes: Vec<String> = serde_json::from_str(&sizes_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Product {
        id: ProductId::new(row.get::<_, String>("id")?),
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        price: Money::new(row.get("price_cents")?),
        stock: row.get("stock")?,
        category_id: row
            .get::<_, Option<String>>("category_id")?
            .map(CategoryId::new),
        sizes,
        image_url: row.get("image_url")?,
        is_new_drop: row.get::<_, i64>("is_new_drop")? != 0,
        is_featured: row.get::<_, i64>("is_featured")? != 0,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn store() -> ProductStore {
        let pool = Arc::new(ConnectionPool::open_in_memory().unwrap());
        schema::init(&pool).unwrap();
        ProductStore::new(pool)
    }

    fn draft(name: &str, slug: &str, stock: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            price: Money::from_decimal(49.99),
            stock,
            category_id: None,
            sizes: vec!["S".to_string(), "M".to_string()],
            image_url: Some("https://cdn.example.com/tee.jpg".to_string()),
            is_new_drop: true,
            is_featured: false,
        }
    }

    #[test]
    fn test_insert_and_get_roundtrip() {
        let store = store();
        let created = store.insert(draft("Box Logo Tee", "box-logo-tee", 10)).unwrap();

        let by_id = store.get(&created.id).unwrap();
        assert_eq!(by_id, created);

        let by_slug = store.get_by_slug("box-logo-tee").unwrap();
        assert_eq!(by_slug.sizes, vec!["S", "M"]);
        assert_eq!(by_slug.price.cents, 4999);
    }

    #[test]
    fn test_duplicate_slug_conflicts() {
        let store = store();
        store.insert(draft("Tee A", "same-slug", 1)).unwrap();
        match store.insert(draft("Tee B", "same-slug", 1)) {
            Err(StoreError::Conflict(_)) => {}
            other => panic!("expected conflict, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_update_patch() {
        let store = store();
        let created = store.insert(draft("Hoodie", "hoodie", 5)).unwrap();

        let updated = store
            .update(
                &created.id,
                ProductPatch {
                    price: Some(Money::from_decimal(89.99)),
                    is_featured: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price.cents, 8999);
        assert!(updated.is_featured);
        assert_eq!(store.get(&created.id).unwrap().price.cents, 8999);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = store();
        match store.get(&ProductId::new("nope")) {
            Err(StoreError::ProductNotFound(_)) => {}
            other => panic!("expected not found, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_delete() {
        let store = store();
        let created = store.insert(draft("Cap", "cap", 3)).unwrap();
        store.delete(&created.id).unwrap();
        assert!(store.get(&created.id).is_err());
    }

    #[test]
    fn test_set_stock() {
        let store = store();
        let created = store.insert(draft("Cap", "cap", 3)).unwrap();
        store.set_stock(&created.id, 12).unwrap();
        assert_eq!(store.get(&created.id).unwrap().stock, 12);
        assert!(store.set_stock(&created.id, -1).is_err());
    }

    #[test]
    fn test_list_newest_first() {
        let store = store();
        store.insert(draft("A", "a", 1)).unwrap();
        store.insert(draft("B", "b", 1)).unwrap();
        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
    }
}
