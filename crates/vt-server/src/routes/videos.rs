//! Video route handlers: upload, trim, merge, list, share and resolve.

use std::path::Path;

use axum::extract::multipart::Field;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use vt_core::config::Config;
use vt_core::{Artifact, ArtifactId, ShareLinkId, UploadPolicy};
use vt_pipeline::naming::upload_locator;
use vt_pipeline::StoredUpload;

use crate::context::AppContext;
use crate::error::AppError;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Optional overrides of the configured upload policy.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Maximum size, e.g. "100mb" or "1gb".
    pub max_size: Option<String>,
    /// Minimum duration in whole seconds.
    pub min_duration: Option<String>,
    /// Maximum duration in whole seconds.
    pub max_duration: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrimRequest {
    pub video_id: String,
    /// Start offset in seconds (number or numeric string).
    #[serde(default, deserialize_with = "seconds::optional")]
    #[schema(value_type = Option<f64>)]
    pub start: Option<f64>,
    /// End offset in seconds (number or numeric string).
    #[serde(default, deserialize_with = "seconds::optional")]
    #[schema(value_type = Option<f64>)]
    pub end: Option<f64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    /// Ids to concatenate, in playback order.
    #[serde(default)]
    pub video_ids: Vec<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub video_id: String,
    /// Lifetime of the link; defaults to the configured value.
    pub expiry_in_seconds: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub link_id: String,
    /// Public address that resolves the link.
    pub link: String,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SharedVideoResponse {
    /// Public address of the shared video file.
    pub link: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /videos/upload
#[utoipa::path(
    post,
    path = "/videos/upload",
    params(UploadQuery),
    request_body(
        content_type = "multipart/form-data",
        description = "Video in a field named `file`"
    ),
    responses(
        (status = 201, description = "Video stored", body = Artifact),
        (status = 400, description = "Size or duration policy violated"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 422, description = "Duration could not be determined")
    ),
    security(("bearer" = []))
)]
pub async fn upload_video(
    State(ctx): State<AppContext>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let policy = UploadPolicy::with_overrides(
        &ctx.config.upload,
        query.max_size.as_deref(),
        query.min_duration.as_deref(),
        query.max_duration.as_deref(),
    )?;

    let limit = policy.max_bytes()?;
    let upload = receive_file(&ctx.config.storage.upload_dir, &mut multipart, limit).await?;
    let artifact = ctx.uploads.ingest(upload, &policy).await?;

    Ok((StatusCode::CREATED, Json(artifact)))
}

/// POST /videos/trim
#[utoipa::path(
    post,
    path = "/videos/trim",
    request_body = TrimRequest,
    responses(
        (status = 201, description = "Trimmed video created", body = Artifact),
        (status = 400, description = "No bounds given or invalid range"),
        (status = 404, description = "Video not found"),
        (status = 502, description = "Media processing failed")
    ),
    security(("bearer" = []))
)]
pub async fn trim_video(
    State(ctx): State<AppContext>,
    body: Result<Json<TrimRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body.map_err(bad_json)?;

    if req.start.is_none() && req.end.is_none() {
        return Err(
            vt_core::Error::Validation("At least one of start or end is required.".into()).into(),
        );
    }

    let id = parse_video_id(&req.video_id)?;
    let artifact = ctx.trimmer.trim(id, req.start, req.end).await?;

    Ok((StatusCode::CREATED, Json(artifact)))
}

/// POST /videos/merge
#[utoipa::path(
    post,
    path = "/videos/merge",
    request_body = MergeRequest,
    responses(
        (status = 201, description = "Merged video created", body = Artifact),
        (status = 400, description = "Fewer than two ids"),
        (status = 404, description = "Some videos were not found"),
        (status = 502, description = "Media processing failed")
    ),
    security(("bearer" = []))
)]
pub async fn merge_videos(
    State(ctx): State<AppContext>,
    body: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body.map_err(bad_json)?;

    let ids: Vec<ArtifactId> = req
        .video_ids
        .iter()
        .filter_map(|raw| raw.parse().ok())
        .collect();

    // An id that does not parse cannot resolve.
    if req.video_ids.len() >= 2 && ids.len() < req.video_ids.len() {
        return Err(vt_core::Error::SomeNotFound {
            requested: req.video_ids.len(),
            found: ids.len(),
        }
        .into());
    }

    let artifact = ctx.merger.merge(&ids).await?;
    Ok((StatusCode::CREATED, Json(artifact)))
}

/// GET /videos
#[utoipa::path(
    get,
    path = "/videos",
    responses(
        (status = 200, description = "All videos, newest first", body = Vec<Artifact>)
    ),
    security(("bearer" = []))
)]
pub async fn list_videos(State(ctx): State<AppContext>) -> Result<Json<Vec<Artifact>>, AppError> {
    Ok(Json(ctx.catalog.list_ordered().await?))
}

/// POST /videos/share
#[utoipa::path(
    post,
    path = "/videos/share",
    request_body = ShareRequest,
    responses(
        (status = 201, description = "Link issued", body = ShareResponse),
        (status = 404, description = "Video not found")
    ),
    security(("bearer" = []))
)]
pub async fn share_video(
    State(ctx): State<AppContext>,
    body: Result<Json<ShareRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body.map_err(bad_json)?;

    let id = parse_video_id(&req.video_id)?;
    let link = ctx.links.issue(id, req.expiry_in_seconds).await?;

    let response = ShareResponse {
        link_id: link.id.to_string(),
        link: share_url(&ctx.config, link.id),
        expiry: link.expiry,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /videos/shared/{id}
#[utoipa::path(
    get,
    path = "/videos/shared/{id}",
    params(("id" = String, Path, description = "Share link ID")),
    responses(
        (status = 200, description = "Public address of the video", body = SharedVideoResponse),
        (status = 404, description = "Unknown link, missing video, or expired link")
    ),
    security(("bearer" = []))
)]
pub async fn get_shared_video(
    State(ctx): State<AppContext>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<SharedVideoResponse>, AppError> {
    let link_id: ShareLinkId = id
        .parse()
        .map_err(|_| vt_core::Error::not_found("Shared link", &id))?;

    let locator = ctx.links.resolve(link_id).await?;
    Ok(Json(SharedVideoResponse {
        link: public_url(&ctx.config, &locator),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bad_json(rejection: JsonRejection) -> AppError {
    vt_core::Error::Validation(rejection.body_text()).into()
}

fn parse_video_id(raw: &str) -> vt_core::Result<ArtifactId> {
    raw.parse().map_err(|_| vt_core::Error::not_found("Video", raw))
}

/// Public address of a stored file. Files under the upload directory are
/// served at `/uploads`; anything else is appended to the base URL as is.
pub fn public_url(config: &Config, locator: &str) -> String {
    let base = config.server.base_url.trim_end_matches('/');
    let path = Path::new(locator);

    match path.strip_prefix(&config.storage.upload_dir) {
        Ok(rel) => {
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            format!("{base}/uploads/{rel}")
        }
        Err(_) => {
            let rel = locator.trim_start_matches("./").trim_start_matches('/');
            format!("{base}/{rel}")
        }
    }
}

/// Public address that resolves a share link.
pub fn share_url(config: &Config, id: ShareLinkId) -> String {
    let base = config.server.base_url.trim_end_matches('/');
    format!("{base}/videos/shared/{id}")
}

/// Stream the `file` field of `multipart` into the upload directory,
/// giving up as soon as it grows past `limit` bytes.
async fn receive_file(
    dir: &Path,
    multipart: &mut Multipart,
    limit: u64,
) -> vt_core::Result<StoredUpload> {
    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field
            .file_name()
            .and_then(|n| Path::new(n).file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "upload".to_string());

        tokio::fs::create_dir_all(dir).await?;
        let path = upload_locator(dir, &name);

        return match write_field(&mut field, &path, limit).await {
            Ok(size) => {
                tracing::debug!(name = %name, path = %path.display(), size, "received upload");
                Ok(StoredUpload { name, path, size })
            }
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), "failed to remove partial upload: {rm}");
                }
                Err(e)
            }
        };
    }

    Err(vt_core::Error::Validation(
        "No file uploaded; send the video in a multipart field named 'file'.".into(),
    ))
}

async fn write_field(field: &mut Field<'_>, path: &Path, limit: u64) -> vt_core::Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut size = 0u64;

    while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
        size += chunk.len() as u64;
        if size > limit {
            return Err(vt_core::Error::SizeExceeded { size, limit });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(size)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> vt_core::Error {
    vt_core::Error::Validation(format!("Invalid multipart body: {}", e.body_text()))
}

mod seconds {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    /// Seconds given as a JSON number or a numeric string. Blank strings
    /// and `null` count as absent.
    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Number(n)) => Ok(Some(n)),
            Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Raw::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid number of seconds: {s:?}"))),
        }
    }
}
