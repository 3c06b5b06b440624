//! Ordered concatenation of existing artifacts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use vt_av::{MediaEditor, MediaProbe};
use vt_core::{Artifact, ArtifactId, Error, Result};

use crate::catalog::ArtifactCatalog;
use crate::naming::{merged_locator, MERGED_NAME};

/// Produces one artifact from two or more others, played back-to-back in
/// the order the caller lists them.
#[derive(Clone)]
pub struct MergeEngine {
    catalog: Arc<dyn ArtifactCatalog>,
    probe: Arc<dyn MediaProbe>,
    editor: Arc<dyn MediaEditor>,
    output_dir: PathBuf,
}

impl MergeEngine {
    pub fn new(
        catalog: Arc<dyn ArtifactCatalog>,
        probe: Arc<dyn MediaProbe>,
        editor: Arc<dyn MediaEditor>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            probe,
            editor,
            output_dir: output_dir.into(),
        }
    }

    /// Merge `ids` in the given order.
    ///
    /// Every id must resolve before any work starts. An id may appear more
    /// than once.
    pub async fn merge(&self, ids: &[ArtifactId]) -> Result<Artifact> {
        if ids.len() < 2 {
            return Err(Error::Validation(
                "At least two video IDs are required for merging.".into(),
            ));
        }

        let mut unique: Vec<ArtifactId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let found = self.catalog.find_by_ids(&unique).await?;
        if found.len() < unique.len() {
            return Err(Error::SomeNotFound {
                requested: unique.len(),
                found: found.len(),
            });
        }

        let by_id: HashMap<ArtifactId, &Artifact> = found.iter().map(|a| (a.id, a)).collect();
        let inputs = ids
            .iter()
            .map(|id| {
                by_id
                    .get(id)
                    .map(|a| PathBuf::from(&a.url))
                    .ok_or_else(|| Error::not_found("Video", id))
            })
            .collect::<Result<Vec<_>>>()?;

        let output = merged_locator(&self.output_dir);

        if let Err(e) = self.editor.concat(&inputs, &output).await {
            crate::discard(&output).await;
            return Err(crate::processing_error("merge", e));
        }

        let artifact = crate::commit_output(
            self.catalog.as_ref(),
            self.probe.as_ref(),
            &output,
            MERGED_NAME.to_string(),
        )
        .await?;
        tracing::info!(
            sources = ids.len(),
            id = %artifact.id,
            duration = artifact.duration_in_seconds,
            "merged videos"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::naming::locator_string;
    use crate::testing::{FakeEditor, FakeProbe, ReadOnlyCatalog};
    use std::path::Path;
    use vt_core::NewArtifact;

    struct Fixture {
        dir: tempfile::TempDir,
        catalog: Arc<MemoryCatalog>,
        editor: Arc<FakeEditor>,
        engine: MergeEngine,
        a: Artifact,
        b: Artifact,
    }

    async fn add(catalog: &MemoryCatalog, dir: &Path, name: &str) -> Artifact {
        let path = dir.join(name);
        std::fs::write(&path, name).unwrap();
        catalog
            .create(NewArtifact {
                name: name.into(),
                size_in_bytes: name.len() as u64,
                duration_in_seconds: 10.0,
                url: locator_string(&path),
            })
            .await
            .unwrap()
    }

    async fn fixture(editor: FakeEditor) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(MemoryCatalog::new());
        let a = add(&catalog, dir.path(), "a.mp4").await;
        let b = add(&catalog, dir.path(), "b.mp4").await;
        let editor = Arc::new(editor);
        let engine = MergeEngine::new(
            catalog.clone(),
            Arc::new(FakeProbe::returning(20.0)),
            editor.clone(),
            dir.path().join("out"),
        );
        Fixture {
            dir,
            catalog,
            editor,
            engine,
            a,
            b,
        }
    }

    fn url(a: &Artifact) -> PathBuf {
        PathBuf::from(&a.url)
    }

    #[tokio::test]
    async fn merge_creates_artifact() {
        let f = fixture(FakeEditor::writing(2048)).await;

        let out = f.engine.merge(&[f.a.id, f.b.id]).await.unwrap();

        assert_eq!(out.name, "merged_video.mp4");
        assert_eq!(out.size_in_bytes, 2048);
        assert_eq!(out.duration_in_seconds, 20.0);
        assert!(Path::new(&out.url).starts_with(f.dir.path().join("out")));
        assert_eq!(f.catalog.len(), 3);
    }

    #[tokio::test]
    async fn concat_order_follows_caller() {
        let f = fixture(FakeEditor::writing(1)).await;

        let ab = f.engine.merge(&[f.a.id, f.b.id]).await.unwrap();
        let ba = f.engine.merge(&[f.b.id, f.a.id]).await.unwrap();
        assert_ne!(ab.url, ba.url);

        let concats = f.editor.concats.lock();
        assert_eq!(concats[0].0, vec![url(&f.a), url(&f.b)]);
        assert_eq!(concats[1].0, vec![url(&f.b), url(&f.a)]);
    }

    #[tokio::test]
    async fn repeated_ids_are_concatenated_as_given() {
        let f = fixture(FakeEditor::writing(1)).await;

        f.engine.merge(&[f.a.id, f.b.id, f.a.id]).await.unwrap();

        let concats = f.editor.concats.lock();
        assert_eq!(concats[0].0, vec![url(&f.a), url(&f.b), url(&f.a)]);
    }

    #[tokio::test]
    async fn single_id_is_rejected_before_lookup() {
        let f = fixture(FakeEditor::writing(1)).await;

        let err = f.engine.merge(&[f.a.id]).await.unwrap_err();
        assert_eq!(err.to_string(), "At least two video IDs are required for merging.");

        let err = f.engine.merge(&[]).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(f.editor.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_id_fails_whole_merge() {
        let f = fixture(FakeEditor::writing(1)).await;

        let err = f.engine.merge(&[f.a.id, ArtifactId::new()]).await.unwrap_err();

        assert_eq!(err.to_string(), "Some videos were not found.");
        assert!(matches!(err, Error::SomeNotFound { requested: 2, found: 1 }));
        assert_eq!(f.editor.call_count(), 0);
        assert_eq!(f.catalog.len(), 2);
    }

    #[tokio::test]
    async fn editor_failure_commits_nothing() {
        let f = fixture(FakeEditor::failing()).await;

        let err = f.engine.merge(&[f.a.id, f.b.id]).await.unwrap_err();

        assert!(matches!(err, Error::Processing { ref operation, .. } if operation == "merge"));
        assert_eq!(err.http_status(), 502);
        assert_eq!(f.catalog.len(), 2);
    }

    #[tokio::test]
    async fn partial_output_is_removed_when_editor_fails() {
        let f = fixture(FakeEditor::failing_after(64)).await;

        let err = f.engine.merge(&[f.a.id, f.b.id]).await.unwrap_err();

        assert!(matches!(err, Error::Processing { .. }));
        let output = f.editor.concats.lock()[0].1.clone();
        assert!(!output.exists(), "left behind: {}", output.display());
    }

    #[tokio::test]
    async fn catalog_failure_removes_output() {
        let f = fixture(FakeEditor::writing(8)).await;
        let engine = MergeEngine::new(
            Arc::new(ReadOnlyCatalog {
                inner: f.catalog.clone(),
            }),
            Arc::new(FakeProbe::returning(20.0)),
            f.editor.clone(),
            f.dir.path().join("out"),
        );

        let err = engine.merge(&[f.a.id, f.b.id]).await.unwrap_err();

        assert!(matches!(err, Error::Database { .. }));
        let output = f.editor.concats.lock()[0].1.clone();
        assert!(!output.exists());
        assert_eq!(f.catalog.len(), 2);
    }
}
