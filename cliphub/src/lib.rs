//! # cliphub: a self-hostable audio clipping service
//!
//! `cliphub` accepts audio file uploads over HTTP, cuts time ranges out of
//! them with the system `ffmpeg` binary, and serves both originals and
//! trimmed clips for download. There is no database: state is two flat
//! directories on local disk, where the file name is the only index.
//!
//! ## Request Flow
//!
//! `POST /upload` stores a multipart file under its client-supplied name in
//! the uploads area (overwriting any previous file of that name), and
//! `GET /files` lists what is there. `POST /trim` takes a source name, a
//! `[start, end)` range in fractional seconds, and an output base name; it
//! spawns `ffmpeg` in stream-copy mode to produce `<output_name>.mp3` in the
//! clips area, and reports failure if the tool exits non-zero.
//! `GET /uploads/{filename}` and `GET /download/{filename}` stream files
//! back from the respective areas.
//!
//! Every caller-supplied name passes [`storage::validate_name`] before it
//! touches the filesystem, and concurrent `ffmpeg` children are capped by a
//! semaphore ([`clip::FfmpegClipper`]).
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer. Handlers depend on two seams: [`storage::FileStore`]
//! (swappable backing store, with an in-memory fake for tests) and
//! [`clip::Clipper`] (the external-tool capability). [`AppState`] wires the
//! production implementations together; [`build_router`] adds CORS, request
//! tracing, optional Prometheus metrics, and OpenAPI docs at `/docs`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use cliphub::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = cliphub::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     cliphub::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod clip;
pub mod config;
pub mod errors;
mod openapi;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Json, Router,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::clip::{Clipper, FfmpegClipper};
use crate::config::CorsOrigin;
use crate::openapi::ApiDoc;
use crate::storage::{FileStore, LocalFileStore};

pub use config::Config;

/// Application state shared across all request handlers.
///
/// Handlers see the two storage areas and the clip capability only through
/// their traits, so tests can swap in fakes without touching the routing.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    /// Storage area for caller-uploaded originals
    pub uploads: Arc<dyn FileStore>,
    /// Storage area for trimmed clip outputs
    pub clips: Arc<dyn FileStore>,
    /// External-tool capability used by the trim endpoint
    pub clipper: Arc<dyn Clipper>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = &config.cors;

    let mut layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if cors.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        layer = layer.allow_origin(Any);
    } else {
        let mut origins = Vec::new();
        for origin in &cors.allowed_origins {
            if let CorsOrigin::Origin(value) = origin {
                origins.push(value.parse::<HeaderValue>()?);
            }
        }
        layer = layer.allow_origin(origins);
    }

    if let Some(max_age) = cors.max_age {
        layer = layer.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(layer)
}

/// Build the application router with all endpoints and middleware.
///
/// Routes are wired per the state's configuration: CORS policy, the upload
/// body limit, and whether the Prometheus metrics endpoint is mounted.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.storage.max_upload_bytes;
    let enable_metrics = state.config.enable_metrics;
    let cors_layer = create_cors_layer(&state.config)?;

    let api_routes = Router::new()
        // Upload route gets its own body limit; everything else uses the default
        .route(
            "/upload",
            post(api::handlers::files::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/files", get(api::handlers::files::list_files))
        .route("/uploads/{filename}", get(api::handlers::files::serve_upload))
        .route("/trim", post(api::handlers::clips::trim_file))
        .route("/download/{filename}", get(api::handlers::clips::download_clip))
        .with_state(state);

    let router = Router::new()
        .route("/", get(|| async { "cliphub is running" }))
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let mut router = router.layer(cors_layer);

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] prepares both storage roots
///    (idempotent directory creation) and wires handlers to the production
///    store and clipper implementations
/// 2. **Serve**: [`Application::serve`] binds the configured address and
///    handles requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with storage roots prepared.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting cliphub with configuration: {:#?}", config);

        let uploads = LocalFileStore::new(&config.storage.uploads_dir);
        let clips = LocalFileStore::new(&config.storage.clips_dir);

        // Both areas must exist before the first request
        uploads.ensure_root().await?;
        clips.ensure_root().await?;

        let clipper = FfmpegClipper::new(
            &config.clip.ffmpeg_path,
            uploads.root(),
            clips.root(),
            config.clip.max_concurrent,
        );

        let state = AppState::builder()
            .config(config.clone())
            .uploads(Arc::new(uploads) as Arc<dyn FileStore>)
            .clips(Arc::new(clips) as Arc<dyn FileStore>)
            .clipper(Arc::new(clipper) as Arc<dyn Clipper>)
            .build();

        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// The assembled router, for driving the service in-process (tests).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("cliphub listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
