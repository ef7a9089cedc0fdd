// src/db/connection.rs
//
// Embedded database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - No hidden connection creation
// - Clear error propagation
// - Thread-safe access

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Get the database file path
///
/// Database is stored in the application data directory.
/// Path structure: {APP_DATA}/learnhub/learnhub.db
pub fn get_database_path() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Other("Could not determine app data directory".to_string()))?;

    let learnhub_dir = app_data_dir.join("learnhub");

    // Ensure directory exists
    std::fs::create_dir_all(&learnhub_dir).map_err(AppError::Io)?;

    Ok(learnhub_dir.join("learnhub.db"))
}

/// Create a connection pool at the default application data path.
pub fn create_connection_pool() -> AppResult<ConnectionPool> {
    let db_path = get_database_path()?;
    create_connection_pool_at(&db_path)
}

/// Create a connection pool for an explicit database file.
///
/// Pool configuration:
/// - Max 15 connections (reasonable for a client-side store)
/// - SQLite in WAL mode for better concurrency
/// - Foreign keys enabled (lesson cascade relies on it)
/// - Busy timeout set to avoid immediate errors
pub fn create_connection_pool_at(db_path: &Path) -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(15)
        .build(manager)
        .map_err(|e| AppError::StorageUnavailable(format!("Failed to create connection pool: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// This is a convenience wrapper that provides better error messages.
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get database connection: {}", e)))
}

#[cfg(test)]
pub mod test_support {
    //! Shared test fixture: a pooled connection over a throwaway database
    //! file. An in-memory database will not do here because every pooled
    //! connection would see its own empty store.

    use super::*;
    use crate::db::migrations::initialize_database;
    use std::sync::Arc;

    pub struct TestDb {
        pub pool: Arc<ConnectionPool>,
        // Held so the backing file outlives the pool.
        _dir: tempfile::TempDir,
    }

    pub fn create_test_pool() -> TestDb {
        let dir = tempfile::tempdir().expect("create temp dir");
        let pool = create_connection_pool_at(&dir.path().join("test.db")).expect("create pool");
        {
            let conn = pool.get().expect("get connection");
            initialize_database(&conn).expect("initialize schema");
        }
        TestDb {
            pool: Arc::new(pool),
            _dir: dir,
        }
    }
}
