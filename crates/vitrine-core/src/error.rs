//! Store error types.
//!
//! One tagged error per failure class; every layer maps into this taxonomy
//! instead of inspecting exception-style payloads at call sites.

use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Malformed or missing input fields, with field-level details.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Operation not permitted given the current order status.
    #[error("{0}")]
    InvalidState(String),

    /// One or more line items exceed available stock.
    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        name: String,
        requested: i64,
        available: i64,
    },

    /// Slug or other unique column already taken.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Build a validation error from a single message.
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(vec![msg.into()])
    }

    /// Check if this failure was caused by the caller's input or the
    /// order's current state (as opposed to an internal fault).
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            StoreError::Database(_) | StoreError::Serialization(_)
        )
    }

    /// Check if this is a missing-entity failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ProductNotFound(_)
                | StoreError::CategoryNotFound(_)
                | StoreError::OrderNotFound(_)
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
