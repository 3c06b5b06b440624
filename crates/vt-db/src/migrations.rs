//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order. A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;
use vt_core::{Error, Result};

/// V1: the video catalog and share links.
///
/// `shared_links.video_id` is deliberately not a foreign key: a link may
/// outlive the video it names, and resolving such a link reports the video
/// as missing.
const V1_INITIAL: &str = r#"
CREATE TABLE videos (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    size_bytes    INTEGER NOT NULL,
    duration_secs REAL NOT NULL,
    url           TEXT NOT NULL,
    created_at    TEXT NOT NULL
);
CREATE INDEX idx_videos_created ON videos(created_at);

CREATE TABLE shared_links (
    id       TEXT PRIMARY KEY,
    video_id TEXT NOT NULL,
    expiry   TEXT NOT NULL
);
CREATE INDEX idx_shared_links_video ON shared_links(video_id);
"#;

/// Ordered list of (version, sql) pairs.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;

        tracing::debug!(version, "applied migration");
    }

    Ok(())
}
