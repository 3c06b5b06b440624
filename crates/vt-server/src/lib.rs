//! vt-server: the HTTP surface of the video transformer.
//!
//! Ties the other vt-* crates together into a running server:
//!
//! - Axum API for upload, trim, merge, list and link sharing, gated by a
//!   static bearer token
//! - SQLite-backed catalog adapter for the pipeline's storage ports
//! - Static serving of stored files and OpenAPI docs
//! - Graceful shutdown via signal handling

pub mod catalog;
pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vt_core::config::Config;

use crate::context::AppContext;

/// Start the server and run until a shutdown signal arrives.
///
/// Opens (or creates) the database, prepares the upload directory,
/// discovers ffmpeg/ffprobe, and serves the router on the configured
/// address.
pub async fn start(config: Config) -> vt_core::Result<()> {
    start_with_cancel(config, CancellationToken::new()).await
}

/// Like [`start`], but also stops when `cancel` is triggered.
pub async fn start_with_cancel(config: Config, cancel: CancellationToken) -> vt_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db = vt_db::init_pool(&config.server.db_path)?;

    let upload_dir = &config.storage.upload_dir;
    tokio::fs::create_dir_all(upload_dir).await?;
    tracing::info!("Storing videos in {}", upload_dir.display());

    let tools = Arc::new(vt_av::ToolRegistry::discover(&config.tools));
    for info in tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}; media operations will fail", info.name);
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| vt_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config, db, tools);
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| vt_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT, SIGTERM, or cancellation).
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
