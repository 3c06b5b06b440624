//! Video catalog operations.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::Connection;
use vt_core::{Artifact, ArtifactId, Error, NewArtifact, Result};

use crate::models::{artifact_from_row, format_ts, VIDEO_COLS};

/// Insert a new catalog entry with a fresh id.
pub fn create_video(
    conn: &Connection,
    new: &NewArtifact,
    created_at: DateTime<Utc>,
) -> Result<Artifact> {
    let id = ArtifactId::new();
    // Stored with microsecond precision.
    let created_at = created_at.trunc_subsecs(6);
    let size = i64::try_from(new.size_in_bytes)
        .map_err(|_| Error::Validation("file size is too large to record".into()))?;

    conn.execute(
        "INSERT INTO videos (id, name, size_bytes, duration_secs, url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            id.to_string(),
            new.name,
            size,
            new.duration_in_seconds,
            new.url,
            format_ts(created_at),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Artifact {
        id,
        name: new.name.clone(),
        size_in_bytes: new.size_in_bytes,
        duration_in_seconds: new.duration_in_seconds,
        url: new.url.clone(),
        created_at,
    })
}

/// Get a video by ID.
pub fn get_video(conn: &Connection, id: ArtifactId) -> Result<Option<Artifact>> {
    let q = format!("SELECT {VIDEO_COLS} FROM videos WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], artifact_from_row) {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Fetch every video whose id is in `ids`. Unknown ids are skipped and the
/// result order is unspecified.
pub fn get_videos_by_ids(conn: &Connection, ids: &[ArtifactId]) -> Result<Vec<Artifact>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = (1..=ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let q = format!("SELECT {VIDEO_COLS} FROM videos WHERE id IN ({placeholders})");

    let mut stmt = conn
        .prepare(&q)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(ids.iter().map(ToString::to_string)),
            artifact_from_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// List all videos, newest first. Ties keep reverse insertion order.
pub fn list_videos(conn: &Connection) -> Result<Vec<Artifact>> {
    let q = format!("SELECT {VIDEO_COLS} FROM videos ORDER BY created_at DESC, rowid DESC");
    let mut stmt = conn
        .prepare(&q)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], artifact_from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use chrono::{Duration, TimeZone};

    fn new_video(name: &str) -> NewArtifact {
        NewArtifact {
            name: name.into(),
            size_in_bytes: 2048,
            duration_in_seconds: 12.5,
            url: format!("uploads/{name}"),
        }
    }

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let v = create_video(&conn, &new_video("a.mp4"), at).unwrap();
        let found = get_video(&conn, v.id).unwrap().unwrap();
        assert_eq!(found, v);
        assert_eq!(found.created_at, at);

        assert!(get_video(&conn, ArtifactId::new()).unwrap().is_none());
    }

    #[test]
    fn batch_lookup_skips_unknown_ids() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc::now();

        let a = create_video(&conn, &new_video("a.mp4"), now).unwrap();
        let b = create_video(&conn, &new_video("b.mp4"), now).unwrap();

        let found = get_videos_by_ids(&conn, &[a.id, ArtifactId::new(), b.id]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|v| v.id == a.id));
        assert!(found.iter().any(|v| v.id == b.id));

        assert!(get_videos_by_ids(&conn, &[]).unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let old = create_video(&conn, &new_video("old.mp4"), base).unwrap();
        let new = create_video(&conn, &new_video("new.mp4"), base + Duration::seconds(30)).unwrap();
        let mid = create_video(&conn, &new_video("mid.mp4"), base + Duration::seconds(10)).unwrap();

        let ids: Vec<_> = list_videos(&conn).unwrap().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![new.id, mid.id, old.id]);
    }

    #[test]
    fn list_ties_break_by_insertion() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let at = Utc::now();

        let first = create_video(&conn, &new_video("1.mp4"), at).unwrap();
        let second = create_video(&conn, &new_video("2.mp4"), at).unwrap();

        let ids: Vec<_> = list_videos(&conn).unwrap().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
