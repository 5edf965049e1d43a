//! Back-office order aggregates.

use crate::money::Money;
use crate::orders::OrderStatus;
use serde::{Deserialize, Serialize};

/// Count of orders per status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub pending: i64,
    pub completed: i64,
    pub cancelled: i64,
}

impl StatusBreakdown {
    /// Record a count for a status.
    pub fn set(&mut self, status: OrderStatus, count: i64) {
        match status {
            OrderStatus::Pending => self.pending = count,
            OrderStatus::Completed => self.completed = count,
            OrderStatus::Cancelled => self.cancelled = count,
        }
    }

    /// Total orders across all statuses.
    pub fn total(&self) -> i64 {
        self.pending + self.completed + self.cancelled
    }
}

/// Read-only order statistics for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderStats {
    /// Sum of totals over completed orders.
    pub total_sales: Money,
    /// Order counts grouped by status.
    pub orders_by_status: StatusBreakdown,
}
