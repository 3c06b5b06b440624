//! Scripted media tools and catalogs for engine tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use vt_av::{MediaEditor, MediaProbe, TrimRange};
use vt_core::{Artifact, ArtifactId, NewArtifact};

use crate::catalog::{ArtifactCatalog, MemoryCatalog};

/// Returns `default` for every path, or a probe error if there is none.
#[derive(Default)]
pub struct FakeProbe {
    pub default: Option<f64>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeProbe {
    pub fn returning(default: f64) -> Self {
        Self {
            default: Some(default),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn probe_duration(&self, path: &Path) -> vt_core::Result<f64> {
        self.calls.lock().push(path.to_path_buf());
        self.default
            .ok_or_else(|| vt_core::Error::Probe(format!("{}: invalid data", path.display())))
    }
}

/// Records every invocation and writes `output_bytes` to the output path.
/// When `fail` is set the call errors afterwards, so a non-zero
/// `output_bytes` leaves a partial file behind the way ffmpeg does.
#[derive(Default)]
pub struct FakeEditor {
    pub output_bytes: usize,
    pub fail: bool,
    pub trims: Mutex<Vec<(PathBuf, TrimRange, PathBuf)>>,
    pub concats: Mutex<Vec<(Vec<PathBuf>, PathBuf)>>,
}

impl FakeEditor {
    pub fn writing(output_bytes: usize) -> Self {
        Self {
            output_bytes,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Writes a partial output, then fails.
    pub fn failing_after(output_bytes: usize) -> Self {
        Self {
            output_bytes,
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.trims.lock().len() + self.concats.lock().len()
    }

    async fn produce(&self, output: &Path) -> vt_core::Result<()> {
        if self.output_bytes > 0 {
            if let Some(parent) = output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(output, vec![0u8; self.output_bytes]).await?;
        }
        if self.fail {
            return Err(vt_core::Error::tool("ffmpeg", "exited with status 1: moov atom not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaEditor for FakeEditor {
    async fn trim(&self, input: &Path, range: TrimRange, output: &Path) -> vt_core::Result<()> {
        self.trims
            .lock()
            .push((input.to_path_buf(), range, output.to_path_buf()));
        self.produce(output).await
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> vt_core::Result<()> {
        self.concats
            .lock()
            .push((inputs.to_vec(), output.to_path_buf()));
        self.produce(output).await
    }
}

/// Reads from `inner` but refuses every insert.
pub struct ReadOnlyCatalog {
    pub inner: std::sync::Arc<MemoryCatalog>,
}

#[async_trait]
impl ArtifactCatalog for ReadOnlyCatalog {
    async fn create(&self, _new: NewArtifact) -> vt_core::Result<Artifact> {
        Err(vt_core::Error::database("attempt to write a readonly database"))
    }

    async fn find_by_id(&self, id: ArtifactId) -> vt_core::Result<Option<Artifact>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_ids(&self, ids: &[ArtifactId]) -> vt_core::Result<Vec<Artifact>> {
        self.inner.find_by_ids(ids).await
    }

    async fn list_ordered(&self) -> vt_core::Result<Vec<Artifact>> {
        self.inner.list_ordered().await
    }
}
