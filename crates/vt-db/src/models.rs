//! Row mapping for the catalog tables.
//!
//! The records themselves live in vt-core; this module turns
//! `rusqlite::Row`s into them and fixes the on-disk timestamp format.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use uuid::Uuid;
use vt_core::{Artifact, ShareLink};

/// Columns selected for an [`Artifact`], in `artifact_from_row` order.
pub const VIDEO_COLS: &str = "id, name, size_bytes, duration_secs, url, created_at";

/// Columns selected for a [`ShareLink`], in `share_link_from_row` order.
pub const LINK_COLS: &str = "id, video_id, expiry";

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| conversion_err(idx, e))?;
    Ok(T::from(uuid))
}

fn parse_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

pub fn artifact_from_row(row: &rusqlite::Row) -> rusqlite::Result<Artifact> {
    let size: i64 = row.get(2)?;
    Ok(Artifact {
        id: parse_id(row, 0)?,
        name: row.get(1)?,
        size_in_bytes: u64::try_from(size).map_err(|e| conversion_err(2, e))?,
        duration_in_seconds: row.get(3)?,
        url: row.get(4)?,
        created_at: parse_ts(row, 5)?,
    })
}

pub fn share_link_from_row(row: &rusqlite::Row) -> rusqlite::Result<ShareLink> {
    Ok(ShareLink {
        id: parse_id(row, 0)?,
        video_id: parse_id(row, 1)?,
        expiry: parse_ts(row, 2)?,
    })
}
