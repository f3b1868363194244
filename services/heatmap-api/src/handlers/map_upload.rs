//! Marker upload and retrieval for the map view.

use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use heatmap_common::HeatmapError;

use super::{internal_error, json_response, session_id, MultipartForm};
use crate::state::AppState;
use crate::tabular::{parse_upload_records, read_table};
use crate::upload_store::UploadRecord;

const FILE_FIELD: &str = "file";

/// A stored marker with its position in the upload.
#[derive(Debug, Serialize)]
pub struct MapPoint {
    pub id: usize,
    pub lng: f64,
    pub lat: f64,
    pub concentration: f64,
    pub name: String,
}

impl MapPoint {
    fn from_record(id: usize, record: UploadRecord) -> Self {
        Self {
            id,
            lng: record.lng,
            lat: record.lat,
            concentration: record.concentration,
            name: record.name,
        }
    }
}

fn failure(status: StatusCode, message: String) -> Response {
    json_response(status, json!({ "success": false, "message": message }))
}

/// POST /map/upload - Replace the session's markers with an uploaded table
pub async fn upload_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, Response> {
    let session = session_id(&headers);

    let form = MultipartForm::read(multipart, FILE_FIELD)
        .await
        .map_err(|e| failure(StatusCode::BAD_REQUEST, e.to_string()))?;

    let file = form
        .file
        .filter(|f| !f.data.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "No file uploaded".to_string()))?;

    let parsed = tokio::task::spawn_blocking(move || {
        let table = read_table(file.filename.as_deref(), &file.data)?;
        parse_upload_records(&table)
    })
    .await
    .map_err(|e| {
        warn!(error = %e, "Upload parse task failed");
        internal_error("upload parsing was interrupted")
    })?;

    let records = match parsed {
        Ok(records) => records,
        Err(e @ HeatmapError::MissingColumns(_)) => {
            warn!(session = %session, error = %e, "Upload rejected");
            return Err(failure(StatusCode::BAD_REQUEST, e.to_string()));
        }
        Err(e) => {
            warn!(session = %session, error = %e, "Upload could not be parsed");
            return Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process file: {}", e),
            ));
        }
    };

    let count = records.len();
    state.uploads.put(&session, records).await;
    info!(session = %session, records = count, "Map upload stored");

    Ok(Json(json!({
        "success": true,
        "message": format!("Uploaded {} records", count),
        "count": count,
    })))
}

/// GET /map/get-data - Markers of the session's latest upload
pub async fn get_data_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let session = session_id(&headers);
    let points: Vec<MapPoint> = state
        .uploads
        .get(&session)
        .await
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(id, record)| MapPoint::from_record(id, record))
        .collect();

    Json(json!({ "success": true, "points": points }))
}
