//! Category repository.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};

use vitrine_core::catalog::Category;
use vitrine_core::ids::CategoryId;
use vitrine_core::StoreError;

use crate::pool::ConnectionPool;
use crate::{db_err, insert_err};

/// Flat category list for the storefront navigation.
#[derive(Clone)]
pub struct CategoryStore {
    pool: Arc<ConnectionPool>,
}

impl CategoryStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Insert a new category.
    pub fn insert(&self, category: Category) -> Result<Category, StoreError> {
        if category.name.trim().is_empty() || category.slug.trim().is_empty() {
            return Err(StoreError::validation("category name and slug are required"));
        }
        self.pool.with_writer(|conn| {
            conn.execute(
                "INSERT INTO categories (id, name, slug, position) VALUES (?1, ?2, ?3, ?4)",
                params![
                    category.id.as_str(),
                    category.name,
                    category.slug,
                    category.position
                ],
            )
            .map_err(|e| insert_err(e, &format!("category slug '{}'", category.slug)))?;
            Ok(())
        })?;
        Ok(category)
    }

    /// Fetch a category by ID.
    pub fn get(&self, id: &CategoryId) -> Result<Category, StoreError> {
        self.pool
            .with_reader(|conn| {
                conn.query_row(
                    "SELECT id, name, slug, position FROM categories WHERE id = ?1",
                    [id.as_str()],
                    category_from_row,
                )
                .optional()
                .map_err(db_err)
            })?
            .ok_or_else(|| StoreError::CategoryNotFound(id.to_string()))
    }

    /// List all categories in display order.
    pub fn list(&self) -> Result<Vec<Category>, StoreError> {
        self.pool.with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, slug, position FROM categories ORDER BY position, name")
                .map_err(db_err)?;
            let rows = stmt
                .query_map([], category_from_row)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            Ok(rows)
        })
    }

    /// Delete a category; products keep their rows with a dangling
    /// category reference cleared.
    pub fn delete(&self, id: &CategoryId) -> Result<(), StoreError> {
        self.pool.with_writer(|conn| {
            let tx = conn.transaction().map_err(db_err)?;
            tx.execute(
                "UPDATE products SET category_id = NULL WHERE category_id = ?1",
                [id.as_str()],
            )
            .map_err(db_err)?;
            let changed = tx
                .execute("DELETE FROM categories WHERE id = ?1", [id.as_str()])
                .map_err(db_err)?;
            if changed == 0 {
                return Err(StoreError::CategoryNotFound(id.to_string()));
            }
            tx.commit().map_err(db_err)
        })
    }
}

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: CategoryId::new(row.get::<_, String>("id")?),
        name: row.get("name")?,
        slug: row.get("slug")?,
        position: row.get("position")?,
    })
}
