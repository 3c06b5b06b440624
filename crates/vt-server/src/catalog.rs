//! SQLite-backed implementations of the pipeline's storage ports.
//!
//! Each call checks out a pooled connection on the blocking thread pool so
//! catalog I/O never stalls the async workers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vt_core::{Artifact, ArtifactId, Clock, Error, NewArtifact, Result, ShareLink, ShareLinkId};
use vt_db::queries::{shared_links, videos};
use vt_db::{get_conn, DbPool, PooledConnection};
use vt_pipeline::{ArtifactCatalog, LinkStore};

#[derive(Clone)]
pub struct DbCatalog {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DbCatalog {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&PooledConnection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
    }
}

#[async_trait]
impl ArtifactCatalog for DbCatalog {
    async fn create(&self, new: NewArtifact) -> Result<Artifact> {
        let created_at = self.clock.now();
        self.with_conn(move |conn| videos::create_video(conn, &new, created_at))
            .await
    }

    async fn find_by_id(&self, id: ArtifactId) -> Result<Option<Artifact>> {
        self.with_conn(move |conn| videos::get_video(conn, id)).await
    }

    async fn find_by_ids(&self, ids: &[ArtifactId]) -> Result<Vec<Artifact>> {
        let ids = ids.to_vec();
        self.with_conn(move |conn| videos::get_videos_by_ids(conn, &ids))
            .await
    }

    async fn list_ordered(&self) -> Result<Vec<Artifact>> {
        self.with_conn(|conn| videos::list_videos(conn)).await
    }
}

#[async_trait]
impl LinkStore for DbCatalog {
    async fn create_link(&self, video_id: ArtifactId, expiry: DateTime<Utc>) -> Result<ShareLink> {
        self.with_conn(move |conn| shared_links::create_link(conn, video_id, expiry))
            .await
    }

    async fn find_link(&self, id: ShareLinkId) -> Result<Option<ShareLink>> {
        self.with_conn(move |conn| shared_links::get_link(conn, id))
            .await
    }
}
