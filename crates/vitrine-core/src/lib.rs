//! Domain types and rules for the Vitrine storefront.
//!
//! This crate holds everything the storefront and back-office agree on:
//!
//! - **Catalog**: products with stock counts, sizes, and drop/featured flags
//! - **Orders**: orders, line items, and the order status state machine
//! - **Money**: cents-based monetary values
//! - **Errors**: the `StoreError` taxonomy shared by every layer
//!
//! The crate is deliberately persistence-free; the SQL lives in
//! `vitrine-db` and the HTTP surface in `vitrine-api`.

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod orders;

pub use error::StoreError;
pub use ids::*;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::StoreError;
    pub use crate::ids::*;
    pub use crate::money::Money;

    // Catalog
    pub use crate::catalog::{Category, Product, ProductDraft, ProductPatch};

    // Orders
    pub use crate::orders::{
        Order, OrderDraft, OrderItem, OrderItemDraft, OrderPatch, OrderStats, OrderStatus,
        StatusBreakdown,
    };
}
