// src/db/mod.rs
//
// Embedded (SQLite) persistence plumbing

pub mod connection;
pub mod migrations;

pub use connection::{
    create_connection_pool, create_connection_pool_at, get_connection, ConnectionPool, PooledConn,
};
pub use migrations::{initialize_database, verify_database_integrity};
