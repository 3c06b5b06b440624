//! Time-bounded slices of existing artifacts.

use std::path::Path;
use std::sync::Arc;

use vt_av::{MediaEditor, MediaProbe, TrimRange};
use vt_core::{Artifact, ArtifactId, Error, Result};

use crate::catalog::ArtifactCatalog;
use crate::naming::{trimmed_locator, trimmed_name};

/// Produces a new artifact holding `[start, end)` of a source artifact.
#[derive(Clone)]
pub struct TrimEngine {
    catalog: Arc<dyn ArtifactCatalog>,
    probe: Arc<dyn MediaProbe>,
    editor: Arc<dyn MediaEditor>,
}

impl TrimEngine {
    pub fn new(
        catalog: Arc<dyn ArtifactCatalog>,
        probe: Arc<dyn MediaProbe>,
        editor: Arc<dyn MediaEditor>,
    ) -> Self {
        Self {
            catalog,
            probe,
            editor,
        }
    }

    /// Trim `id`. `start` defaults to 0 and `end` to the source's recorded
    /// duration.
    ///
    /// The output is written next to the source, re-probed for its actual
    /// duration, and committed as `trimmed_<source name>`.
    pub async fn trim(
        &self,
        id: ArtifactId,
        start: Option<f64>,
        end: Option<f64>,
    ) -> Result<Artifact> {
        let source = self
            .catalog
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Video", id))?;

        let range = TrimRange::new(
            start.unwrap_or(0.0),
            end.unwrap_or(source.duration_in_seconds),
        );
        check_range(range)?;

        let input = Path::new(&source.url);
        let output = trimmed_locator(input);

        if let Err(e) = self.editor.trim(input, range, &output).await {
            crate::discard(&output).await;
            return Err(crate::processing_error("trim", e));
        }

        let artifact = crate::commit_output(
            self.catalog.as_ref(),
            self.probe.as_ref(),
            &output,
            trimmed_name(&source.name),
        )
        .await?;
        tracing::info!(
            source = %source.id,
            id = %artifact.id,
            start = range.start,
            end = range.end,
            duration = artifact.duration_in_seconds,
            "trimmed video"
        );
        Ok(artifact)
    }
}

fn check_range(range: TrimRange) -> Result<()> {
    if !range.start.is_finite() || !range.end.is_finite() {
        return Err(Error::Validation("Trim bounds must be finite numbers.".into()));
    }
    if range.start < 0.0 {
        return Err(Error::Validation("Trim start must not be negative.".into()));
    }
    if range.start >= range.end {
        return Err(Error::Validation("Trim start must be before trim end.".into()));
    }
    Ok(())
}
