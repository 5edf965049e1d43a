//! Order repository and lifecycle workflows.
//!
//! Owns the Pending → Completed | Cancelled transitions and the
//! stock-decrement algorithm. Every write path runs as one immediate
//! transaction on the pool's writer connection: either the whole
//! operation lands or none of it does.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::{info, warn};

use vitrine_core::money::Money;
use vitrine_core::ids::{OrderId, OrderItemId, ProductId};
use vitrine_core::orders::{
    items_total, Order, OrderDraft, OrderItem, OrderItemDraft, OrderPatch, OrderStats,
    OrderStatus, StatusBreakdown,
};
use vitrine_core::StoreError;

use crate::pool::ConnectionPool;
use crate::{current_timestamp, db_err};

const ORDER_COLUMNS: &str = "id, customer_name, customer_phone, customer_email, total_cents, \
                             status, notes, created_at, updated_at, validated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, name, unit_price_cents, image_url, size, \
                            quantity, subtotal_cents";

/// Order lifecycle manager.
///
/// Constructed once per process and handed to the HTTP layer by value;
/// clones share the underlying pool.
#[derive(Clone)]
pub struct OrderStore {
    pool: Arc<ConnectionPool>,
}

impl OrderStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Create a pending order with its line items.
    ///
    /// The order header and every item are inserted in a single
    /// transaction; a missing product rolls the whole thing back. Item
    /// name/image are snapshotted from the catalog at this moment, the
    /// unit price comes from the submitted cart.
    pub fn create(&self, draft: &OrderDraft) -> Result<(Order, Vec<OrderItem>), StoreError> {
        draft.validate()?;

        let now = current_timestamp();
        let order = Order {
            id: OrderId::generate(),
            customer_name: draft.customer_name.trim().to_string(),
            customer_phone: draft.customer_phone.trim().to_string(),
            customer_email: draft.customer_email.clone(),
            total: draft.total(),
            status: OrderStatus::Pending,
            notes: draft.notes.clone(),
            created_at: now,
            updated_at: now,
            validated_at: None,
        };

        let items = self.pool.with_writer(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(db_err)?;

            tx.execute(
                "INSERT INTO orders (id, customer_name, customer_phone, customer_email, \
                 total_cents, status, notes, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    order.id.as_str(),
                    order.customer_name,
                    order.customer_phone,
                    order.customer_email,
                    order.total.cents,
                    order.status.as_str(),
                    order.notes,
                    order.created_at,
                    order.updated_at,
                ],
            )
            .map_err(db_err)?;

            let items = insert_items(&tx, &order.id, &draft.items)?;
            tx.commit().map_err(db_err)?;
            Ok(items)
        })?;

        info!(order = %order.id, total = %order.total, items = items.len(), "order created");
        Ok((order, items))
    }

    /// Edit a pending order.
    ///
    /// A supplied item set atomically replaces the old one
    /// (delete-then-insert in the same transaction) and the total is
    /// recomputed from it. Without items, an explicit `total` is written
    /// verbatim — caller-trusted, used by the back-office for manual
    /// corrections.
    pub fn update(&self, id: &OrderId, patch: OrderPatch) -> Result<Order, StoreError> {
        patch.validate()?;

        let order = self.pool.with_writer(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(db_err)?;

            let mut order = load_order(&tx, id)?
                .ok_or_else(|| StoreError::OrderNotFound(id.to_string()))?;
            order.ensure_editable()?;

            if let Some(name) = patch.customer_name {
                order.customer_name = name.trim().to_string();
            }
            if let Some(phone) = patch.customer_phone {
                order.customer_phone = phone.trim().to_string();
            }
            if let Some(email) = patch.customer_email {
                order.customer_email = Some(email);
            }
            if let Some(notes) = patch.notes {
                order.notes = Some(notes);
            }

            if let Some(item_drafts) = patch.items {
                order.total = items_total(&item_drafts);
                tx.execute(
                    "DELETE FROM order_items WHERE order_id = ?1",
                    [id.as_str()],
                )
                .map_err(db_err)?;
                insert_items(&tx, id, &item_drafts)?;
            } else if let Some(total) = patch.total {
                order.total = total;
            }

            order.updated_at = current_timestamp();
            tx.execute(
                "UPDATE orders SET customer_name = ?1, customer_phone = ?2, \
                 customer_email = ?3, notes = ?4, total_cents = ?5, updated_at = ?6 \
                 WHERE id = ?7",
                params![
                    order.customer_name,
                    order.customer_phone,
                    order.customer_email,
                    order.notes,
                    order.total.cents,
                    order.updated_at,
                    id.as_str(),
                ],
            )
            .map_err(db_err)?;

            tx.commit().map_err(db_err)?;
            Ok(order)
        })?;

        info!(order = %id, "order updated");
        Ok(order)
    }

    /// Validate a pending order, decrementing stock for every line item.
    ///
    /// Runs as one immediate transaction: BEGIN IMMEDIATE takes the write
    /// lock up front, so two validations competing for the same order or
    /// the same product's stock can never interleave between check and
    /// decrement. Each item uses a guarded decrement (`... AND stock >=
    /// qty`) and a zero affected-row count aborts the whole transaction —
    /// either every item's stock is taken and the order is Completed, or
    /// nothing changed and the order is still Pending.
    pub fn validate(&self, id: &OrderId) -> Result<Order, StoreError> {
        let result = self.pool.with_writer(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(db_err)?;

            let mut order = load_order(&tx, id)?
                .ok_or_else(|| StoreError::OrderNotFound(id.to_string()))?;
            order.ensure_validatable()?;

            let items = load_items(&tx, id)?;
            let now = current_timestamp();
            for item in &items {
                let changed = tx
                    .execute(
                        "UPDATE products SET stock = stock - ?1, updated_at = ?2 \
                         WHERE id = ?3 AND stock >= ?1",
                        params![item.quantity, now, item.product_id.as_str()],
                    )
                    .map_err(db_err)?;

                if changed == 0 {
                    // Guarded decrement missed: the product is gone or its
                    // stock is short. Returning drops the transaction,
                    // rolling back any decrements already applied.
                    let available: Option<i64> = tx
                        .query_row(
                            "SELECT stock FROM products WHERE id = ?1",
                            [item.product_id.as_str()],
                            |row| row.get(0),
                        )
                        .optional()
                        .map_err(db_err)?;
                    return Err(match available {
                        None => StoreError::ProductNotFound(item.product_id.to_string()),
                        Some(available) => StoreError::InsufficientStock {
                            product_id: item.product_id.to_string(),
                            name: item.name.clone(),
                            requested: item.quantity,
                            available,
                        },
                    });
                }
            }

            order.complete();
            tx.execute(
                "UPDATE orders SET status = ?1, validated_at = ?2, updated_at = ?3 WHERE id = ?4",
                params![
                    order.status.as_str(),
                    order.validated_at,
                    order.updated_at,
                    id.as_str(),
                ],
            )
            .map_err(db_err)?;

            tx.commit().map_err(db_err)?;
            Ok(order)
        });

        match &result {
            Ok(order) => info!(order = %order.id, "order validated, stock decremented"),
            Err(e) if e.is_client_error() => {
                warn!(order = %id, error = %e, "order validation rejected")
            }
            Err(e) => warn!(order = %id, error = %e, "order validation failed"),
        }
        result
    }

    /// Cancel an order.
    ///
    /// No stock is restored: a pending order never took any, and a
    /// completed order refuses cancellation outright. Re-cancelling a
    /// cancelled order re-applies the same update.
    pub fn cancel(&self, id: &OrderId) -> Result<Order, StoreError> {
        let order = self.pool.with_writer(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(db_err)?;

            let mut order = load_order(&tx, id)?
                .ok_or_else(|| StoreError::OrderNotFound(id.to_string()))?;
            order.ensure_cancellable()?;

            order.cancel();
            tx.execute(
                "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![order.status.as_str(), order.updated_at, id.as_str()],
            )
            .map_err(db_err)?;

            tx.commit().map_err(db_err)?;
            Ok(order)
        })?;

        info!(order = %id, "order cancelled");
        Ok(order)
    }

    /// Fetch an order with its line items.
    pub fn get(&self, id: &OrderId) -> Result<(Order, Vec<OrderItem>), StoreError> {
        self.pool.with_reader(|conn| {
            let order = load_order(conn, id)?
                .ok_or_else(|| StoreError::OrderNotFound(id.to_string()))?;
            let items = load_items(conn, id)?;
            Ok((order, items))
        })
    }

    /// List all orders, newest first.
    pub fn list(&self) -> Result<Vec<Order>, StoreError> {
        self.pool.with_reader(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM orders ORDER BY created_at DESC, id DESC",
                    ORDER_COLUMNS
                ))
                .map_err(db_err)?;
            let rows = stmt
                .query_map([], order_from_row)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            Ok(rows)
        })
    }

    /// Dashboard aggregates: completed sales total and counts by status.
    pub fn stats(&self) -> Result<OrderStats, StoreError> {
        self.pool.with_reader(|conn| {
            let total_sales: i64 = conn
                .query_row(
                    "SELECT COALESCE(SUM(total_cents), 0) FROM orders WHERE status = 'completed'",
                    [],
                    |row| row.get(0),
                )
                .map_err(db_err)?;

            let mut breakdown = StatusBreakdown::default();
            let mut stmt = conn
                .prepare("SELECT status, COUNT(*) FROM orders GROUP BY status")
                .map_err(db_err)?;
            let counts = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            for (status, count) in counts {
                if let Some(status) = OrderStatus::parse(&status) {
                    breakdown.set(status, count);
                }
            }

            Ok(OrderStats {
                total_sales: Money::new(total_sales),
                orders_by_status: breakdown,
            })
        })
    }
}

/// Insert line items for an order, snapshotting product name and image
/// from the catalog. Must run inside the caller's transaction.
fn insert_items(
    conn: &Connection,
    order_id: &OrderId,
    drafts: &[OrderItemDraft],
) -> Result<Vec<OrderItem>, StoreError> {
    let mut items = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let snapshot: Option<(String, Option<String>)> = conn
            .query_row(
                "SELECT name, image_url FROM products WHERE id = ?1",
                [draft.product_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(db_err)?;
        let (name, image_url) = snapshot
            .ok_or_else(|| StoreError::ProductNotFound(draft.product_id.to_string()))?;

        let item = OrderItem {
            id: OrderItemId::generate(),
            order_id: order_id.clone(),
            product_id: draft.product_id.clone(),
            name,
            unit_price: draft.price,
            image_url,
            size: draft.size.clone(),
            quantity: draft.quantity,
            subtotal: draft.subtotal(),
        };

        conn.execute(
            "INSERT INTO order_items (id, order_id, product_id, name, unit_price_cents, \
             image_url, size, quantity, subtotal_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                item.id.as_str(),
                item.order_id.as_str(),
                item.product_id.as_str(),
                item.name,
                item.unit_price.cents,
                item.image_url,
                item.size,
                item.quantity,
                item.subtotal.cents,
            ],
        )
        .map_err(db_err)?;
        items.push(item);
    }
    Ok(items)
}

fn load_order(conn: &Connection, id: &OrderId) -> Result<Option<Order>, StoreError> {
    conn.query_row(
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
        [id.as_str()],
        order_from_row,
    )
    .optional()
    .map_err(db_err)
}

fn load_items(conn: &Connection, id: &OrderId) -> Result<Vec<OrderItem>, StoreError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY rowid",
            ITEM_COLUMNS
        ))
        .map_err(db_err)?;
    let rows = stmt
        .query_map([id.as_str()], item_from_row)
        .map_err(db_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(db_err)?;
    Ok(rows)
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let status_str: String = row.get("status")?;
    let status = OrderStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown order status '{}'", status_str).into(),
        )
    })?;

    Ok(Order {
        id: OrderId::new(row.get::<_, String>("id")?),
        customer_name: row.get("customer_name")?,
        customer_phone: row.get("customer_phone")?,
        customer_email: row.get("customer_email")?,
        total: Money::new(row.get("total_cents")?),
        status,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        validated_at: row.get("validated_at")?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<OrderItem> {
    Ok(OrderItem {
        id: OrderItemId::new(row.get::<_, String>("id")?),
        order_id: OrderId::new(row.get::<_, String>("order_id")?),
        product_id: ProductId::new(row.get::<_, String>("product_id")?),
        name: row.get("name")?,
        unit_price: Money::new(row.get("unit_price_cents")?),
        image_url: row.get("image_url")?,
        size: row.get("size")?,
        quantity: row.get("quantity")?,
        subtotal: Money::new(row.get("subtotal_cents")?),
    })
}
