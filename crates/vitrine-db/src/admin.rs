//! Back-office user and session storage.
//!
//! Records are persistence-shaped: the role is stored as text and typed
//! by `vitrine-auth`, which owns the role/permission semantics.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension, Row};

use vitrine_core::ids::UserId;
use vitrine_core::StoreError;

use crate::pool::ConnectionPool;
use crate::{current_timestamp, db_err, insert_err};

/// A stored back-office user.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: i64,
}

/// A stored bearer session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: UserId,
    pub created_at: i64,
    pub expires_at: i64,
}

impl SessionRecord {
    /// Check if the session has expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp() > self.expires_at
    }
}

/// Repository for `admin_users`.
#[derive(Clone)]
pub struct AdminUserStore {
    pool: Arc<ConnectionPool>,
}

impl AdminUserStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Insert a new back-office user.
    pub fn insert(&self, record: &AdminUserRecord) -> Result<(), StoreError> {
        self.pool.with_writer(|conn| {
            conn.execute(
                "INSERT INTO admin_users (id, email, password_hash, role, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id.as_str(),
                    record.email,
                    record.password_hash,
                    record.role,
                    record.created_at,
                ],
            )
            .map_err(|e| insert_err(e, &format!("admin user '{}'", record.email)))?;
            Ok(())
        })
    }

    /// Look up a user by email.
    pub fn find_by_email(&self, email: &str) -> Result<Option<AdminUserRecord>, StoreError> {
        self.pool.with_reader(|conn| {
            conn.query_row(
                "SELECT id, email, password_hash, role, created_at \
                 FROM admin_users WHERE email = ?1",
                [email],
                user_from_row,
            )
            .optional()
            .map_err(db_err)
        })
    }

    /// Look up a user by ID.
    pub fn find_by_id(&self, id: &UserId) -> Result<Option<AdminUserRecord>, StoreError> {
        self.pool.with_reader(|conn| {
            conn.query_row(
                "SELECT id, email, password_hash, role, created_at \
                 FROM admin_users WHERE id = ?1",
                [id.as_str()],
                user_from_row,
            )
            .optional()
            .map_err(db_err)
        })
    }
}

/// Repository for `sessions`.
#[derive(Clone)]
pub struct SessionStore {
    pool: Arc<ConnectionPool>,
}

impl SessionStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Persist a new session.
    pub fn insert(&self, session: &SessionRecord) -> Result<(), StoreError> {
        self.pool.with_writer(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, created_at, expires_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token,
                    session.user_id.as_str(),
                    session.created_at,
                    session.expires_at,
                ],
            )
            .map_err(db_err)?;
            Ok(())
        })
    }

    /// Look up a session by bearer token.
    pub fn find(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        self.pool.with_reader(|conn| {
            conn.query_row(
                "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
                [token],
                session_from_row,
            )
            .optional()
            .map_err(db_err)
        })
    }

    /// Remove a session (logout or expiry sweep).
    pub fn delete(&self, token: &str) -> Result<(), StoreError> {
        self.pool.with_writer(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])
                .map_err(db_err)?;
            Ok(())
        })
    }

    /// Drop every expired session.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        self.pool.with_writer(|conn| {
            conn.execute(
                "DELETE FROM sessions WHERE expires_at < ?1",
                [current_timestamp()],
            )
            .map_err(db_err)
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<AdminUserRecord> {
    Ok(AdminUserRecord {
        id: UserId::new(row.get::<_, String>("id")?),
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role: row.get("role")?,
        created_at: row.get("created_at")?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        token: row.get("token")?,
        user_id: UserId::new(row.get::<_, String>("user_id")?),
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
    })
}
