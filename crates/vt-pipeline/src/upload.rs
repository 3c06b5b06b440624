//! Upload policy gate and catalog commit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vt_av::MediaProbe;
use vt_core::{Artifact, Error, NewArtifact, Result, UploadPolicy};

use crate::catalog::ArtifactCatalog;
use crate::naming::locator_string;

/// Applies an [`UploadPolicy`] to a file already on disk.
///
/// Checks run in a fixed order: size format, size limit, probe, duration
/// bounds. A file rejected on size is never probed.
#[derive(Clone)]
pub struct UploadValidator {
    probe: Arc<dyn MediaProbe>,
}

impl UploadValidator {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self { probe }
    }

    /// Returns the probed duration in seconds when the file passes.
    pub async fn validate(
        &self,
        file_size: u64,
        locator: &Path,
        policy: &UploadPolicy,
    ) -> Result<f64> {
        let max_bytes = policy.max_bytes()?;
        if file_size > max_bytes {
            return Err(Error::SizeExceeded {
                size: file_size,
                limit: max_bytes,
            });
        }

        let duration = self.probe.probe_duration(locator).await?;
        if !policy.duration_allowed(duration) {
            return Err(Error::DurationOutOfBounds {
                duration,
                min: policy.min_duration_secs,
                max: policy.max_duration_secs,
            });
        }

        Ok(duration)
    }
}

/// A received file written to its final locator, not yet in the catalog.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// The client's file name, used as the display name.
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Validates stored uploads and commits the accepted ones.
#[derive(Clone)]
pub struct UploadIngest {
    validator: UploadValidator,
    catalog: Arc<dyn ArtifactCatalog>,
}

impl UploadIngest {
    pub fn new(validator: UploadValidator, catalog: Arc<dyn ArtifactCatalog>) -> Self {
        Self { validator, catalog }
    }

    /// Validate `upload` against `policy` and add it to the catalog.
    ///
    /// A rejected file is removed from disk.
    pub async fn ingest(&self, upload: StoredUpload, policy: &UploadPolicy) -> Result<Artifact> {
        let duration = match self
            .validator
            .validate(upload.size, &upload.path, policy)
            .await
        {
            Ok(d) => d,
            Err(e) => {
                tracing::info!(name = %upload.name, "upload rejected: {e}");
                crate::discard(&upload.path).await;
                return Err(e);
            }
        };

        let created = self
            .catalog
            .create(NewArtifact {
                name: upload.name.clone(),
                size_in_bytes: upload.size,
                duration_in_seconds: duration,
                url: locator_string(&upload.path),
            })
            .await;

        match created {
            Ok(artifact) => {
                tracing::info!(
                    id = %artifact.id,
                    name = %artifact.name,
                    size = artifact.size_in_bytes,
                    duration = artifact.duration_in_seconds,
                    "upload stored"
                );
                Ok(artifact)
            }
            Err(e) => {
                crate::discard(&upload.path).await;
                Err(e)
            }
        }
    }
}
