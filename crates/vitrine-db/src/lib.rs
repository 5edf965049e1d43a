//! SQLite persistence layer for the Vitrine storefront.
//!
//! Single write connection + read pool (WAL mode). All coordination
//! between concurrent requests is delegated to SQLite: writes serialize
//! on the writer connection, and the order-validation workflow runs as
//! one immediate transaction so competing stock decrements can never
//! interleave.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_db::{ConnectionPool, OrderStore, ProductStore};
//!
//! let pool = std::sync::Arc::new(ConnectionPool::open(path, 2)?);
//! vitrine_db::schema::init(&pool)?;
//!
//! let products = ProductStore::new(pool.clone());
//! let orders = OrderStore::new(pool.clone());
//!
//! let (order, items) = orders.create(&draft)?;
//! let validated = orders.validate(&order.id)?;
//! ```

pub mod admin;
pub mod categories;
pub mod orders;
pub mod pool;
pub mod products;
pub mod schema;

pub use admin::{AdminUserRecord, AdminUserStore, SessionRecord, SessionStore};
pub use categories::CategoryStore;
pub use orders::OrderStore;
pub use pool::ConnectionPool;
pub use products::ProductStore;

use vitrine_core::StoreError;

/// Map a rusqlite failure into the store taxonomy.
pub(crate) fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Map a unique-constraint failure onto `Conflict`, everything else onto
/// `Database`.
pub(crate) fn insert_err(e: rusqlite::Error, what: &str) -> StoreError {
    if let rusqlite::Error::SqliteFailure(inner, _) = &e {
        if inner.code == rusqlite::ErrorCode::ConstraintViolation {
            return StoreError::Conflict(what.to_string());
        }
    }
    db_err(e)
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
