//! Heatmap generation and region discovery handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use heatmap_common::{HeatmapError, HeatmapResult, RenderOptions};

use super::{json_response, status_of, MultipartForm};
use crate::pipeline::{generate_heatmap, validate_options};
use crate::state::AppState;
use crate::tabular::{parse_samples, read_table};

const FILE_FIELD: &str = "excelFile";
const OPTIONS_FIELD: &str = "options";

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub status: &'static str,
    pub message: String,
    pub image_base64: String,
}

fn failure(err: &HeatmapError) -> Response {
    json_response(
        status_of(err),
        json!({ "success": false, "status": "error", "message": err.client_message() }),
    )
}

/// POST /api/heatmap/generate - Render a heatmap from an uploaded table
pub async fn generate_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, Response> {
    let form = MultipartForm::read(multipart, FILE_FIELD)
        .await
        .map_err(|e| failure(&e))?;

    let file = match form.file.clone() {
        Some(file) if file.filename.as_deref().is_some_and(|n| !n.trim().is_empty()) => file,
        _ => {
            return Err(failure(&HeatmapError::InputMalformed(format!(
                "no file uploaded in field '{}'",
                FILE_FIELD
            ))))
        }
    };

    let options = RenderOptions::from_json(form.text(OPTIONS_FIELD).unwrap_or_default()).map_err(|e| {
        warn!(error = %e, "Rejected heatmap options");
        failure(&HeatmapError::from(e))
    })?;
    validate_options(&options, state.config.max_resolution).map_err(|e| failure(&e))?;

    info!(
        region = %options.city,
        method = %options.interpolation_method,
        resolution = options.grid_resolution,
        layers = ?options.map_layers,
        "Heatmap requested"
    );

    let worker_state = state.clone();
    let result: HeatmapResult<String> = tokio::task::spawn_blocking(move || {
        let table = read_table(file.filename.as_deref(), &file.data)?;
        let samples = parse_samples(&table)?;
        generate_heatmap(&worker_state.assets, &samples, &options, &worker_state.render_style)
    })
    .await
    .unwrap_or_else(|e| {
        error!(error = %e, "Heatmap task failed");
        Err(HeatmapError::RenderError(format!("worker task failed: {}", e)))
    });

    match result {
        Ok(image_base64) => Ok(Json(GenerateResponse {
            success: true,
            status: "success",
            message: "Heatmap generated".to_string(),
            image_base64,
        })),
        Err(e) => Err(failure(&e)),
    }
}

/// GET /api/heatmap/regions - Regions that have a boundary asset
pub async fn regions_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match state.assets.list_regions() {
        Ok(regions) => json_response(StatusCode::OK, json!({ "success": true, "regions": regions })),
        Err(e) => {
            error!(error = %e, "Failed to list regions");
            super::internal_error("failed to list regions")
        }
    }
}

/// GET /api/heatmap/regions/:region/layers - Auxiliary layers of a region
pub async fn region_layers_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(region): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    let layers = state.assets.list_layers(&region).map_err(|e| failure(&e))?;
    Ok(Json(json!({ "success": true, "region": region, "layers": layers })))
}
