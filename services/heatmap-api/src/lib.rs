//! Carbon and pollution mapping service library.
//!
//! HTTP surface for heatmap generation, carbon estimates, map marker uploads
//! and weather pass-through. The binary in `main.rs` only wires configuration
//! and the runtime; the router lives here so tests can drive it directly.

pub mod config;
pub mod handlers;
pub mod pipeline;
pub mod state;
pub mod tabular;
pub mod upload_store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::state::AppState;

/// Build the service router.
pub fn app(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        // Liveness, health and metrics
        .route("/", get(handlers::index_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // Carbon calculator
        .route("/api/estimate", post(handlers::estimate_handler))
        .route("/api/estimate/factors", get(handlers::factors_handler))
        // Map markers
        .route("/map/upload", post(handlers::upload_handler))
        .route("/map/get-data", get(handlers::get_data_handler))
        // Heatmap
        .route("/api/heatmap/generate", post(handlers::generate_handler))
        .route("/api/heatmap/regions", get(handlers::regions_handler))
        .route(
            "/api/heatmap/regions/:region/layers",
            get(handlers::region_layers_handler),
        )
        // Weather
        .route("/api/weather/realtime/:city", get(handlers::realtime_handler))
        .route("/api/weather/history/:city", get(handlers::history_handler))
        .route("/api/weather/trends/:city", get(handlers::trends_handler))
        .route("/api/weather/map_layers", get(handlers::map_layers_handler))
        .route(
            "/api/weather/map_tile/:op/:z/:x/:y",
            get(handlers::map_tile_handler),
        )
        // Middleware
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
