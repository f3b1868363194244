//! HTTP request handlers.
//!
//! - `health`: liveness, health check and Prometheus metrics
//! - `calculator`: carbon emission estimates
//! - `map_upload`: marker uploads per session
//! - `heatmap`: heatmap generation and region discovery
//! - `weather`: weather pass-through and tile proxy

pub mod calculator;
pub mod health;
pub mod heatmap;
pub mod map_upload;
pub mod weather;

use axum::extract::multipart::{Field, Multipart};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::json;

use heatmap_common::{HeatmapError, HeatmapResult};

use crate::upload_store::{DEFAULT_SESSION, SESSION_HEADER};

pub use calculator::{estimate_handler, factors_handler};
pub use health::{health_handler, index_handler, metrics_handler};
pub use heatmap::{generate_handler, region_layers_handler, regions_handler};
pub use map_upload::{get_data_handler, upload_handler};
pub use weather::{history_handler, map_layers_handler, map_tile_handler, realtime_handler, trends_handler};

/// Session id from the request headers, or the shared default session.
pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

/// An uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub data: Bytes,
}

/// Uploaded file and plain text fields of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub file: Option<UploadedFile>,
    pub text: Vec<(String, String)>,
}

impl MultipartForm {
    /// Read every part; the part named `file_field` is kept as the file.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> HeatmapResult<Self> {
        let mut form = MultipartForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| HeatmapError::InputMalformed(format!("invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                form.file = Some(read_file(field).await?);
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| HeatmapError::InputMalformed(format!("invalid form field '{}': {}", name, e)))?;
                form.text.push((name, text));
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

async fn read_file(field: Field<'_>) -> HeatmapResult<UploadedFile> {
    let filename = field.file_name().map(str::to_string);
    let data = field
        .bytes()
        .await
        .map_err(|e| HeatmapError::InputMalformed(format!("failed to read uploaded file: {}", e)))?;
    Ok(UploadedFile { filename, data })
}

/// JSON body with an explicit status.
pub fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

/// Status for a heatmap error.
pub fn status_of(err: &HeatmapError) -> StatusCode {
    StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(crate) fn internal_error(context: &str) -> Response {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"success": false, "status": "error", "message": format!("Internal server error: {}", context)}),
    )
}
