//! # vt-pipeline
//!
//! The artifact pipeline: validating uploads, deriving new artifacts by
//! trimming and merging, and issuing expiring share links.
//!
//! This crate provides:
//!
//! - **Ports** ([`ArtifactCatalog`], [`LinkStore`]) -- the narrow storage
//!   interface the engines depend on, plus an in-memory
//!   [`MemoryCatalog`].
//! - **[`UploadValidator`]** / **[`UploadIngest`]** -- size and duration
//!   gate for incoming files, and committing accepted ones.
//! - **[`TrimEngine`]** and **[`MergeEngine`]** -- produce new artifacts
//!   through a [`MediaEditor`](vt_av::MediaEditor).
//! - **[`LinkIssuer`]** -- create and resolve time-limited links.
//!
//! Engines never mutate a source artifact and never write a catalog entry
//! unless the external media step and the re-probe both succeeded.

pub mod catalog;
pub mod merge;
pub mod naming;
pub mod share;
pub mod trim;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{ArtifactCatalog, LinkStore, MemoryCatalog};
pub use merge::MergeEngine;
pub use share::LinkIssuer;
pub use trim::TrimEngine;
pub use upload::{StoredUpload, UploadIngest, UploadValidator};

use std::path::Path;

/// Map a failure of the external media step into a processing error for
/// `operation`.
pub(crate) fn processing_error(operation: &str, e: vt_core::Error) -> vt_core::Error {
    match e {
        vt_core::Error::Processing { .. } => e,
        vt_core::Error::Tool { tool, message } => {
            vt_core::Error::processing(operation, format!("{tool}: {message}"))
        }
        other => vt_core::Error::processing(operation, other.to_string()),
    }
}

/// Best-effort removal of a file that will not become a catalog entry.
pub(crate) async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "removed discarded file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "failed to remove discarded file: {e}"),
    }
}

/// Stat and re-probe a freshly produced `output`, then commit it as `name`.
/// The file is removed if any step fails.
pub(crate) async fn commit_output(
    catalog: &dyn ArtifactCatalog,
    probe: &dyn vt_av::MediaProbe,
    output: &Path,
    name: String,
) -> vt_core::Result<vt_core::Artifact> {
    let committed: vt_core::Result<vt_core::Artifact> = async {
        let size = tokio::fs::metadata(output).await?.len();
        let duration = probe.probe_duration(output).await?;
        catalog
            .create(vt_core::NewArtifact {
                name,
                size_in_bytes: size,
                duration_in_seconds: duration,
                url: naming::locator_string(output),
            })
            .await
    }
    .await;

    if committed.is_err() {
        discard(output).await;
    }
    committed
}
