//! Axum router construction.
//!
//! Builds the full application router with the video routes behind bearer
//! authentication, static serving of stored files, API docs and the
//! middleware stack.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::auth::auth_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::videos::upload_video,
        routes::videos::trim_video,
        routes::videos::merge_videos,
        routes::videos::list_videos,
        routes::videos::share_video,
        routes::videos::get_shared_video,
    ),
    components(schemas(
        vt_core::Artifact,
        routes::videos::TrimRequest,
        routes::videos::MergeRequest,
        routes::videos::ShareRequest,
        routes::videos::ShareResponse,
        routes::videos::SharedVideoResponse,
    )),
    modifiers(&BearerAuth),
    tags((name = "videos", description = "Upload, trim, merge and share videos"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let videos = Router::new()
        .route("/", get(routes::videos::list_videos))
        .route(
            "/upload",
            post(routes::videos::upload_video).layer(DefaultBodyLimit::disable()),
        )
        .route("/trim", post(routes::videos::trim_video))
        .route("/merge", post(routes::videos::merge_videos))
        .route("/share", post(routes::videos::share_video))
        .route("/shared/{id}", get(routes::videos::get_shared_video))
        .layer(middleware::from_fn_with_state(ctx.clone(), auth_middleware));

    let upload_dir = ctx.config.storage.upload_dir.clone();

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/videos", videos)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
