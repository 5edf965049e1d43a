//! Order intake and edit payloads.

use crate::money::Money;
use crate::ids::ProductId;
use crate::StoreError;
use serde::{Deserialize, Serialize};

/// One requested line in an order draft.
///
/// The unit price comes from the customer's cart; the product name and
/// image are snapshotted server-side when the order is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDraft {
    /// Referenced product.
    pub product_id: ProductId,
    /// Chosen size label, if any.
    #[serde(default)]
    pub size: Option<String>,
    /// Quantity requested.
    pub quantity: i64,
    /// Unit price at cart time.
    pub price: Money,
}

impl OrderItemDraft {
    /// Subtotal for this line.
    pub fn subtotal(&self) -> Money {
        self.price * self.quantity
    }
}

/// Input for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<OrderItemDraft>,
}

impl OrderDraft {
    /// Validate the draft, collecting every violation.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut errors = Vec::new();

        if self.customer_name.trim().len() < 2 {
            errors.push("customer name must be at least 2 characters".to_string());
        }
        if self.customer_phone.trim().len() < 10 {
            errors.push("customer phone must be at least 10 characters".to_string());
        }
        if let Some(email) = &self.customer_email {
            if !is_valid_email(email) {
                errors.push("customer email is not well-formed".to_string());
            }
        }
        errors.extend(validate_items(&self.items));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }

    /// Total over all line items.
    pub fn total(&self) -> Money {
        items_total(&self.items)
    }
}

/// Partial update for a pending order. `None` fields are left untouched.
///
/// When `items` is supplied the total is recomputed from the new set and
/// any `total` field is ignored. When `items` is absent but `total` is
/// given, the caller's value is written verbatim — a caller-trusted
/// override, kept for back-office corrections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub items: Option<Vec<OrderItemDraft>>,
    pub total: Option<Money>,
}

impl OrderPatch {
    /// Validate the patched fields, collecting every violation.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut errors = Vec::new();

        if let Some(name) = &self.customer_name {
            if name.trim().len() < 2 {
                errors.push("customer name must be at least 2 characters".to_string());
            }
        }
        if let Some(phone) = &self.customer_phone {
            if phone.trim().len() < 10 {
                errors.push("customer phone must be at least 10 characters".to_string());
            }
        }
        if let Some(email) = &self.customer_email {
            if !is_valid_email(email) {
                errors.push("customer email is not well-formed".to_string());
            }
        }
        if let Some(items) = &self.items {
            errors.extend(validate_items(items));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }
}

/// Total over a set of line item drafts.
pub fn items_total(items: &[OrderItemDraft]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.subtotal())
}

fn validate_items(items: &[OrderItemDraft]) -> Vec<String> {
    let mut errors = Vec::new();
    if items.is_empty() {
        errors.push("order must contain at least one item".to_string());
    }
    for (i, item) in items.iter().enumerate() {
        if item.quantity <= 0 {
            errors.push(format!("item {}: quantity must be positive", i + 1));
        }
        if !item.price.is_positive() {
            errors.push(format!("item {}: price must be positive", i + 1));
        }
    }
    errors
}

/// Minimal well-formedness check: one `@` with a dotted domain after it.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}
