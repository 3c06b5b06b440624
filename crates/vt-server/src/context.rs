//! Application context shared across all route handlers via Axum state.

use std::sync::Arc;

use vt_av::{FfmpegEditor, FfprobeProber, MediaEditor, MediaProbe, ToolRegistry};
use vt_core::config::Config;
use vt_core::{Clock, SystemClock};
use vt_db::DbPool;
use vt_pipeline::{
    ArtifactCatalog, LinkIssuer, MergeEngine, TrimEngine, UploadIngest, UploadValidator,
};

use crate::catalog::DbCatalog;

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    pub catalog: Arc<dyn ArtifactCatalog>,
    pub uploads: UploadIngest,
    pub trimmer: TrimEngine,
    pub merger: MergeEngine,
    pub links: LinkIssuer,
}

impl AppContext {
    /// Production wiring: ffprobe/ffmpeg from `tools`, wall-clock time.
    pub fn new(config: Config, db: DbPool, tools: Arc<ToolRegistry>) -> Self {
        let probe: Arc<dyn MediaProbe> = Arc::new(FfprobeProber::new(tools.clone()));
        let editor: Arc<dyn MediaEditor> = Arc::new(FfmpegEditor::new(tools));
        Self::with_media(config, db, probe, editor, Arc::new(SystemClock))
    }

    /// Wire the engines over a SQLite catalog with explicit media tools and
    /// clock.
    pub fn with_media(
        config: Config,
        db: DbPool,
        probe: Arc<dyn MediaProbe>,
        editor: Arc<dyn MediaEditor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(DbCatalog::new(db, clock.clone()));
        let catalog: Arc<dyn ArtifactCatalog> = store.clone();

        let uploads = UploadIngest::new(UploadValidator::new(probe.clone()), catalog.clone());
        let trimmer = TrimEngine::new(catalog.clone(), probe.clone(), editor.clone());
        let merger = MergeEngine::new(
            catalog.clone(),
            probe,
            editor,
            config.storage.upload_dir.clone(),
        );
        let links = LinkIssuer::new(
            catalog.clone(),
            store,
            clock,
            config.sharing.default_expiry_secs,
        );

        Self {
            config: Arc::new(config),
            catalog,
            uploads,
            trimmer,
            merger,
            links,
        }
    }
}
