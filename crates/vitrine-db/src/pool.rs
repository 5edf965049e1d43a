//! ConnectionPool — writer + read pool with round-robin selection.
//!
//! The only place in the crate that holds `Mutex<Connection>`. Repositories
//! access storage through `with_writer` / `with_reader` closures.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;
use vitrine_core::StoreError;

/// Default number of reader connections.
const DEFAULT_READ_POOL_SIZE: usize = 2;

/// Connection pool: 1 writer + N readers.
///
/// WAL mode is enabled on all file-backed connections. Reader selection is
/// round-robin via an atomic counter. Because every write goes through the
/// single writer connection, write transactions are serialized in-process
/// before SQLite's own locking even comes into play.
pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    read_index: AtomicUsize,
}

impl ConnectionPool {
    /// Open a file-backed connection pool.
    ///
    /// Creates `read_pool_size` read-only connections + 1 writer.
    pub fn open(path: &Path, read_pool_size: usize) -> Result<Self, StoreError> {
        let pool_size = if read_pool_size == 0 {
            DEFAULT_READ_POOL_SIZE
        } else {
            read_pool_size
        };

        let writer = Connection::open(path)
            .map_err(|e| StoreError::Database(format!("failed to open writer: {}", e)))?;
        configure_connection(&writer)?;

        let mut readers = Vec::with_capacity(pool_size);
        for i in 0..pool_size {
            let reader = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| StoreError::Database(format!("failed to open reader {}: {}", i, e)))?;
            configure_readonly_connection(&reader)?;
            readers.push(Mutex::new(reader));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            read_index: AtomicUsize::new(0),
        })
    }

    /// Open an in-memory connection pool (tests).
    ///
    /// Separate `Connection::open_in_memory()` handles would each see their
    /// own database, so readers are left empty and `with_reader` falls back
    /// to the single shared writer connection.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let writer = Connection::open_in_memory()
            .map_err(|e| StoreError::Database(format!("failed to open in-memory db: {}", e)))?;
        configure_connection(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            read_index: AtomicUsize::new(0),
        })
    }

    /// Execute a closure with the writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = self
            .writer
            .lock()
            .map_err(|e| StoreError::Database(format!("writer lock poisoned: {}", e)))?;
        f(&mut conn)
    }

    /// Execute a closure with a reader connection (round-robin).
    ///
    /// Falls back to the writer if no readers exist (in-memory mode).
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        if self.readers.is_empty() {
            return self.with_writer(|conn| f(conn));
        }

        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[index]
            .lock()
            .map_err(|e| StoreError::Database(format!("reader lock poisoned: {}", e)))?;
        f(&conn)
    }
}

/// Configure a read-write SQLite connection.
///
/// WAL keeps readers unblocked during writes; busy_timeout bounds lock
/// waits so a conflicting transaction fails instead of hanging.
fn configure_connection(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .map_err(crate::db_err)
}

/// Same PRAGMAs plus `query_only` to prevent accidental writes.
fn configure_readonly_connection(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA query_only = ON;
        ",
    )
    .map_err(crate::db_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_reads_through_writer() {
        let pool = ConnectionPool::open_in_memory().unwrap();
        pool.with_writer(|conn| {
            conn.execute_batch("CREATE TABLE t (x INTEGER)")
                .map_err(crate::db_err)
        })
        .unwrap();

        let count: i64 = pool
            .with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
                    .map_err(crate::db_err)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_file_pool_readers_see_writes() {
        let dir = std::env::temp_dir().join(format!("vitrine-pool-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pool_test.db");
        let _ = std::fs::remove_file(&path);

        let pool = ConnectionPool::open(&path, 2).unwrap();
        pool.with_writer(|conn| {
            conn.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (7);")
                .map_err(crate::db_err)
        })
        .unwrap();

        let x: i64 = pool
            .with_reader(|conn| {
                conn.query_row("SELECT x FROM t", [], |row| row.get(0))
                    .map_err(crate::db_err)
            })
            .unwrap();
        assert_eq!(x, 7);

        let _ = std::fs::remove_file(&path);
    }
}
