//! vt-db: SQLite persistence for the video catalog and share links.
//!
//! Connection pooling via r2d2, embedded migrations, row mapping for the
//! vt-core records, and one query module per table.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;

pub use pool::{get_conn, init_memory_pool, init_pool, DbPool, PooledConnection};
