//! Schema bootstrap.
//!
//! Idempotent `CREATE TABLE IF NOT EXISTS` batch, run once at startup on
//! the writer connection. The `stock >= 0` check backs up the guarded
//! decrement in the order-validation workflow; the decrement is what keeps
//! stock non-negative, the constraint is the last line of enforcement.

use crate::pool::ConnectionPool;
use vitrine_core::StoreError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    position    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS products (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    description TEXT,
    price_cents INTEGER NOT NULL,
    stock       INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    category_id TEXT REFERENCES categories(id),
    sizes       TEXT NOT NULL DEFAULT '[]',
    image_url   TEXT,
    is_new_drop INTEGER NOT NULL DEFAULT 0,
    is_featured INTEGER NOT NULL DEFAULT 0,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id             TEXT PRIMARY KEY,
    customer_name  TEXT NOT NULL,
    customer_phone TEXT NOT NULL,
    customer_email TEXT,
    total_cents    INTEGER NOT NULL,
    status         TEXT NOT NULL DEFAULT 'pending',
    notes          TEXT,
    created_at     INTEGER NOT NULL,
    updated_at     INTEGER NOT NULL,
    validated_at   INTEGER
);

-- Line items carry a snapshot of the product at order time; product_id is
-- deliberately unconstrained so catalog cleanup never breaks history.
CREATE TABLE IF NOT EXISTS order_items (
    id               TEXT PRIMARY KEY,
    order_id         TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id       TEXT NOT NULL,
    name             TEXT NOT NULL,
    unit_price_cents INTEGER NOT NULL,
    image_url        TEXT,
    size             TEXT,
    quantity         INTEGER NOT NULL CHECK (quantity > 0),
    subtotal_cents   INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);

CREATE TABLE IF NOT EXISTS admin_users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'admin',
    created_at    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES admin_users(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);
";

/// Create all tables and indexes if missing.
pub fn init(pool: &ConnectionPool) -> Result<(), StoreError> {
    pool.with_writer(|conn| conn.execute_batch(SCHEMA).map_err(crate::db_err))
}
