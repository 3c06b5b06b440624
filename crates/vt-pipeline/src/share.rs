//! Expiring share links.

use std::sync::Arc;

use vt_core::{ArtifactId, Clock, Error, Result, ShareLink, ShareLinkId};

use crate::catalog::{ArtifactCatalog, LinkStore};

/// Issues links bound to an artifact and resolves them back to its
/// locator until they expire.
#[derive(Clone)]
pub struct LinkIssuer {
    catalog: Arc<dyn ArtifactCatalog>,
    links: Arc<dyn LinkStore>,
    clock: Arc<dyn Clock>,
    default_expiry_secs: u64,
}

impl LinkIssuer {
    pub fn new(
        catalog: Arc<dyn ArtifactCatalog>,
        links: Arc<dyn LinkStore>,
        clock: Arc<dyn Clock>,
        default_expiry_secs: u64,
    ) -> Self {
        Self {
            catalog,
            links,
            clock,
            default_expiry_secs,
        }
    }

    /// Issue a link to `video_id` valid for `expiry_secs` (or the default).
    pub async fn issue(&self, video_id: ArtifactId, expiry_secs: Option<u64>) -> Result<ShareLink> {
        let secs = expiry_secs.unwrap_or(self.default_expiry_secs);
        if secs == 0 {
            return Err(Error::Validation(
                "expiryInSeconds must be greater than zero.".into(),
            ));
        }

        if self.catalog.find_by_id(video_id).await?.is_none() {
            return Err(Error::not_found("Video", video_id));
        }

        let expiry = i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|d| self.clock.now().checked_add_signed(d))
            .ok_or_else(|| Error::Validation("expiryInSeconds is too large.".into()))?;

        let link = self.links.create_link(video_id, expiry).await?;
        tracing::info!(link = %link.id, video = %video_id, %expiry, "issued share link");
        Ok(link)
    }

    /// The locator of the artifact behind `link_id`.
    ///
    /// Unknown links and links whose artifact is gone are not found; a
    /// link is expired from its expiry instant onward.
    pub async fn resolve(&self, link_id: ShareLinkId) -> Result<String> {
        let link = self
            .links
            .find_link(link_id)
            .await?
            .ok_or_else(|| Error::not_found("Shared link", link_id))?;

        if link.is_expired_at(self.clock.now()) {
            return Err(Error::Expired {
                id: link_id.to_string(),
            });
        }

        let artifact = self
            .catalog
            .find_by_id(link.video_id)
            .await?
            .ok_or_else(|| Error::not_found("Video", link.video_id))?;

        Ok(artifact.url)
    }
}
