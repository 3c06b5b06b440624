//! Storage ports for artifacts and share links.
//!
//! The engines depend only on these traits. [`MemoryCatalog`] implements
//! both for tests and embedding; the server supplies a SQLite-backed one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use vt_core::{
    Artifact, ArtifactId, Clock, NewArtifact, Result, ShareLink, ShareLinkId, SystemClock,
};

/// The artifact catalog: create and read, never update.
#[async_trait]
pub trait ArtifactCatalog: Send + Sync {
    /// Persist a new artifact. The catalog assigns its id and creation time.
    async fn create(&self, new: NewArtifact) -> Result<Artifact>;

    async fn find_by_id(&self, id: ArtifactId) -> Result<Option<Artifact>>;

    /// Batch lookup. Unknown ids are skipped; order is unspecified.
    async fn find_by_ids(&self, ids: &[ArtifactId]) -> Result<Vec<Artifact>>;

    /// All artifacts, newest first.
    async fn list_ordered(&self) -> Result<Vec<Artifact>>;
}

/// Persistence for share links.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn create_link(&self, video_id: ArtifactId, expiry: DateTime<Utc>) -> Result<ShareLink>;

    async fn find_link(&self, id: ShareLinkId) -> Result<Option<ShareLink>>;
}

/// An in-process catalog and link store.
pub struct MemoryCatalog {
    artifacts: RwLock<Vec<Artifact>>,
    links: RwLock<HashMap<ShareLinkId, ShareLink>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// A catalog that stamps creation times from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            artifacts: RwLock::new(Vec::new()),
            links: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Drop an artifact. Links that reference it are left in place.
    pub fn remove(&self, id: ArtifactId) -> Option<Artifact> {
        let mut artifacts = self.artifacts.write();
        let pos = artifacts.iter().position(|a| a.id == id)?;
        Some(artifacts.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.artifacts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.read().is_empty()
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactCatalog for MemoryCatalog {
    async fn create(&self, new: NewArtifact) -> Result<Artifact> {
        let artifact = Artifact {
            id: ArtifactId::new(),
            name: new.name,
            size_in_bytes: new.size_in_bytes,
            duration_in_seconds: new.duration_in_seconds,
            url: new.url,
            created_at: self.clock.now(),
        };
        self.artifacts.write().push(artifact.clone());
        Ok(artifact)
    }

    async fn find_by_id(&self, id: ArtifactId) -> Result<Option<Artifact>> {
        Ok(self.artifacts.read().iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ArtifactId]) -> Result<Vec<Artifact>> {
        Ok(self
            .artifacts
            .read()
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn list_ordered(&self) -> Result<Vec<Artifact>> {
        // Reverse insertion order first so the stable sort breaks ties
        // newest-inserted first.
        let mut all: Vec<Artifact> = self.artifacts.read().iter().rev().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[async_trait]
impl LinkStore for MemoryCatalog {
    async fn create_link(&self, video_id: ArtifactId, expiry: DateTime<Utc>) -> Result<ShareLink> {
        let link = ShareLink {
            id: ShareLinkId::new(),
            video_id,
            expiry,
        };
        self.links.write().insert(link.id, link.clone());
        Ok(link)
    }

    async fn find_link(&self, id: ShareLinkId) -> Result<Option<ShareLink>> {
        Ok(self.links.read().get(&id).cloned())
    }
}
