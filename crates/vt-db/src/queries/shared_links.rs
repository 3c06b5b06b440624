//! Share link operations.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::Connection;
use vt_core::{ArtifactId, Error, Result, ShareLink, ShareLinkId};

use crate::models::{format_ts, share_link_from_row, LINK_COLS};

/// Insert a new link for `video_id` expiring at `expiry`.
///
/// The video's existence is not checked here.
pub fn create_link(
    conn: &Connection,
    video_id: ArtifactId,
    expiry: DateTime<Utc>,
) -> Result<ShareLink> {
    let id = ShareLinkId::new();
    let expiry = expiry.trunc_subsecs(6);

    conn.execute(
        "INSERT INTO shared_links (id, video_id, expiry) VALUES (?1, ?2, ?3)",
        rusqlite::params![id.to_string(), video_id.to_string(), format_ts(expiry)],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(ShareLink {
        id,
        video_id,
        expiry,
    })
}

/// Get a link by ID.
pub fn get_link(conn: &Connection, id: ShareLinkId) -> Result<Option<ShareLink>> {
    let q = format!("SELECT {LINK_COLS} FROM shared_links WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], share_link_from_row) {
        Ok(l) => Ok(Some(l)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use chrono::{Duration, TimeZone};

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let expiry =
            Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap() + Duration::milliseconds(250);
        let video = ArtifactId::new();

        let link = create_link(&conn, video, expiry).unwrap();
        let found = get_link(&conn, link.id).unwrap().unwrap();
        assert_eq!(found, link);
        assert_eq!(found.video_id, video);
        assert_eq!(found.expiry, expiry);
    }

    #[test]
    fn unknown_link_is_none() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(get_link(&conn, ShareLinkId::new()).unwrap().is_none());
    }
}
