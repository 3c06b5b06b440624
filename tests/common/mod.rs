//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary
//! upload directory, a manually driven clock and a full [`AppContext`]
//! whose media tools are [`TextMedia`]. The server is started with Axum on
//! a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tempfile::TempDir;

use vt_av::{MediaEditor, MediaProbe, TrimRange};
use vt_core::config::Config;
use vt_core::FixedClock;
use vt_db::{init_memory_pool, DbPool};
use vt_server::context::AppContext;
use vt_server::router::build_router;

pub const TOKEN: &str = "test-token";

/// Media stand-in where a file's content is its duration in seconds, as
/// text. Anything that does not parse fails to probe.
#[derive(Default)]
pub struct TextMedia {
    pub fail_edits: AtomicBool,
    pub concats: Mutex<Vec<Vec<PathBuf>>>,
}

impl TextMedia {
    async fn duration_of(path: &Path) -> vt_core::Result<f64> {
        let text = tokio::fs::read_to_string(path).await.unwrap_or_default();
        text.trim()
            .parse::<f64>()
            .map_err(|_| {
                vt_core::Error::Probe(format!(
                    "{}: Invalid data found when processing input",
                    path.display()
                ))
            })
    }

    fn check_failure(&self) -> vt_core::Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(vt_core::Error::tool(
                "ffmpeg",
                "exited with status 1: Invalid data found when processing input",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaProbe for TextMedia {
    async fn probe_duration(&self, path: &Path) -> vt_core::Result<f64> {
        Self::duration_of(path).await
    }
}

#[async_trait]
impl MediaEditor for TextMedia {
    async fn trim(&self, input: &Path, range: TrimRange, output: &Path) -> vt_core::Result<()> {
        self.check_failure()?;
        let source = Self::duration_of(input).await?;
        let length = (range.end.min(source) - range.start).max(0.0);
        tokio::fs::write(output, length.to_string()).await?;
        Ok(())
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> vt_core::Result<()> {
        self.check_failure()?;
        let mut total = 0.0;
        for input in inputs {
            total += Self::duration_of(input).await?;
        }
        self.concats.lock().push(inputs.to_vec());
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, total.to_string()).await?;
        Ok(())
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub media: Arc<TextMedia>,
    pub clock: Arc<FixedClock>,
    pub dir: TempDir,
}

impl TestHarness {
    /// Config with bearer auth on and storage in `dir`.
    pub fn config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.auth.api_token = Some(TOKEN.into());
        config.storage.upload_dir = dir.join("uploads");
        config.server.base_url = "http://videos.test".into();
        config
    }

    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness, letting `adjust` tweak the default test config.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let mut config = Self::config(dir.path());
        adjust(&mut config);

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let media = Arc::new(TextMedia::default());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));

        let ctx = AppContext::with_media(
            config,
            db.clone(),
            media.clone(),
            media.clone(),
            clock.clone(),
        );

        Self {
            ctx,
            db,
            media,
            clock,
            dir,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start an Axum server with an adjusted config on a random port.
    pub async fn with_server_config(adjust: impl FnOnce(&mut Config)) -> (Self, SocketAddr) {
        Self::with_config(adjust).serve().await
    }

    async fn serve(self) -> (Self, SocketAddr) {
        let app = build_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> vt_db::PooledConnection {
        vt_db::get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.ctx.config.storage.upload_dir.clone()
    }

    /// Number of regular files in the upload directory.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().is_file())
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Client that sends the test bearer token on every request.
pub fn client() -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::AUTHORIZATION,
        format!("Bearer {TOKEN}").parse().unwrap(),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap()
}

/// Upload `content` as a file named `name` and return the response.
pub async fn upload(
    addr: SocketAddr,
    name: &str,
    content: &str,
    query: &str,
) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(content.as_bytes().to_vec())
        .file_name(name.to_string())
        .mime_str("video/mp4")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    client()
        .post(format!("http://{addr}/videos/upload{query}"))
        .multipart(form)
        .send()
        .await
        .expect("upload request failed")
}

/// Upload a video of `duration` seconds and return its JSON record.
pub async fn upload_video(addr: SocketAddr, name: &str, duration: f64) -> serde_json::Value {
    let resp = upload(addr, name, &duration.to_string(), "").await;
    assert_eq!(resp.status(), 201, "upload of {name} failed");
    resp.json().await.unwrap()
}
