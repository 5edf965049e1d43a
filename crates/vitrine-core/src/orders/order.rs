//! Order types.

use crate::ids::{OrderId, OrderItemId, ProductId};
use crate::money::Money;
use crate::StoreError;
use serde::{Deserialize, Serialize};

/// Order status.
///
/// Transitions are strict: Pending → Completed via validation,
/// Pending → Cancelled via cancellation. Completed is terminal; a
/// Cancelled order only accepts a repeat cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting validation.
    #[default]
    Pending,
    /// Order validated; stock has been decremented.
    Completed,
    /// Order cancelled; no stock was taken.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a stored status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Check if the order can still be edited.
    pub fn can_edit(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Check if the order can be validated.
    pub fn can_validate(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Check if the order can be cancelled. Re-cancelling a cancelled
    /// order is allowed and re-applies the same update.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, OrderStatus::Completed)
    }
}

/// An order placed through the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Customer name.
    pub customer_name: String,
    /// Customer phone, used for WhatsApp follow-up.
    pub customer_phone: String,
    /// Customer email, if given.
    pub customer_email: Option<String>,
    /// Grand total, computed from line items at last write.
    pub total: Money,
    /// Order status.
    pub status: OrderStatus,
    /// Free-form note from the customer or back-office.
    pub notes: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    /// Unix timestamp of validation (if completed).
    pub validated_at: Option<i64>,
}

impl Order {
    /// Guard an edit attempt against the current status.
    pub fn ensure_editable(&self) -> Result<(), StoreError> {
        if self.status.can_edit() {
            Ok(())
        } else {
            Err(StoreError::InvalidState(
                "only pending orders can be edited".to_string(),
            ))
        }
    }

    /// Guard a validation attempt against the current status.
    pub fn ensure_validatable(&self) -> Result<(), StoreError> {
        if self.status.can_validate() {
            Ok(())
        } else {
            Err(StoreError::InvalidState(
                "only pending orders may be validated".to_string(),
            ))
        }
    }

    /// Guard a cancellation attempt against the current status.
    pub fn ensure_cancellable(&self) -> Result<(), StoreError> {
        if self.status.can_cancel() {
            Ok(())
        } else {
            Err(StoreError::InvalidState(
                "completed orders cannot be cancelled".to_string(),
            ))
        }
    }

    /// Mark the order completed.
    pub fn complete(&mut self) {
        let now = current_timestamp();
        self.status = OrderStatus::Completed;
        self.validated_at = Some(now);
        self.updated_at = now;
    }

    /// Mark the order cancelled.
    pub fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
        self.updated_at = current_timestamp();
    }
}

/// A line item in an order.
///
/// Name, unit price, and image are snapshotted at order-creation time so
/// historical orders survive later product edits. Do not join back to the
/// live product for these fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique line item identifier.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Product name at time of order.
    pub name: String,
    /// Unit price at time of order.
    pub unit_price: Money,
    /// Product image at time of order.
    pub image_url: Option<String>,
    /// Chosen size label, if any.
    pub size: Option<String>,
    /// Quantity ordered.
    pub quantity: i64,
    /// Total price for this line.
    pub subtotal: Money,
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
