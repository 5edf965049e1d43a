//! Shared application state.

use std::sync::Arc;

use vitrine_auth::AuthService;
use vitrine_db::{CategoryStore, ConnectionPool, OrderStore, ProductStore};

/// Services injected into every handler.
///
/// Built once at startup; clones share the one connection pool. No
/// module-level singletons anywhere — handlers get their collaborators
/// through this state.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductStore,
    pub categories: CategoryStore,
    pub orders: OrderStore,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            products: ProductStore::new(pool.clone()),
            categories: CategoryStore::new(pool.clone()),
            orders: OrderStore::new(pool.clone()),
            auth: AuthService::new(pool),
        }
    }
}
