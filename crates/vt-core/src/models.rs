//! Catalog records for stored videos and the links that share them.
//!
//! Both records are immutable once created. Trimming or merging never
//! mutates a source [`Artifact`]; it produces a new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ArtifactId, ShareLinkId};

/// One stored video file, uploaded or derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[schema(value_type = String, format = Uuid)]
    pub id: ArtifactId,
    /// Display name (the uploaded file name, or a derived name).
    pub name: String,
    pub size_in_bytes: u64,
    pub duration_in_seconds: f64,
    /// Storage locator of the file, relative to the server's working directory.
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// The fields a caller supplies when adding an artifact to the catalog.
/// The catalog assigns the id and creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub name: String,
    pub size_in_bytes: u64,
    pub duration_in_seconds: f64,
    pub url: String,
}

/// A time-limited reference to an artifact.
///
/// The link holds only the artifact's id; the artifact may disappear from
/// the catalog without the link being touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: ShareLinkId,
    pub video_id: ArtifactId,
    pub expiry: DateTime<Utc>,
}

impl ShareLink {
    /// A link is expired once `now` reaches its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn artifact_serializes_camel_case() {
        let a = Artifact {
            id: ArtifactId::new(),
            name: "clip.mp4".into(),
            size_in_bytes: 1024,
            duration_in_seconds: 12.5,
            url: "uploads/clip.mp4".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["name"], "clip.mp4");
        assert_eq!(json["sizeInBytes"], 1024);
        assert_eq!(json["durationInSeconds"], 12.5);
        assert_eq!(json["url"], "uploads/clip.mp4");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn link_expiry_boundary() {
        let now = Utc::now();
        let link = ShareLink {
            id: ShareLinkId::new(),
            video_id: ArtifactId::new(),
            expiry: now + Duration::seconds(10),
        };
        assert!(!link.is_expired_at(now));
        assert!(!link.is_expired_at(now + Duration::seconds(9)));
        assert!(link.is_expired_at(now + Duration::seconds(10)));
        assert!(link.is_expired_at(now + Duration::seconds(11)));
    }
}
