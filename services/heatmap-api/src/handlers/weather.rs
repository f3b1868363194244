//! Weather pass-through handlers.
//!
//! Data routes answer 404 for any upstream failure; the dashboard treats
//! every such failure as "no data for this city". The tile proxy keeps the
//! finer status mapping so map clients can tell timeouts from bad layers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use weather_client::{RealtimeBundle, WeatherError};

use super::json_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub date: Option<String>,
}

fn not_found(city: &str, err: &WeatherError) -> Response {
    warn!(city = %city, error = %err, kind = err.kind(), "Weather data unavailable");
    json_response(
        StatusCode::NOT_FOUND,
        json!({ "success": false, "error": format!("No weather data for '{}'", city) }),
    )
}

fn bad_request(message: String) -> Response {
    json_response(StatusCode::BAD_REQUEST, json!({ "success": false, "error": message }))
}

/// GET /api/weather/realtime/:city
pub async fn realtime_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(city): Path<String>,
) -> Result<Json<RealtimeBundle>, Response> {
    state
        .weather
        .realtime_bundle(&city)
        .await
        .map(Json)
        .map_err(|e| not_found(&city, &e))
}

/// GET /api/weather/history/:city?date=YYYY-MM-DD
pub async fn history_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(city): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, Response> {
    let date = query
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| bad_request("Missing required query parameter 'date'".to_string()))?;

    match state.weather.history(&city, &date).await {
        Ok(data) => Ok(Json(data)),
        Err(e @ WeatherError::InvalidDate(_)) => Err(bad_request(e.to_string())),
        Err(e) => Err(not_found(&city, &e)),
    }
}

/// GET /api/weather/trends/:city - 30-day forecast
pub async fn trends_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(city): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    state
        .weather
        .forecast_30d(&city)
        .await
        .map(Json)
        .map_err(|e| not_found(&city, &e))
}

/// GET /api/weather/map_layers - Tile URL templates by layer name
pub async fn map_layers_handler(Extension(state): Extension<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!(state.weather.map_layer_urls()))
}

/// GET /api/weather/map_tile/:op/:z/:x/:y - Proxied tile
pub async fn map_tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((op, z, x, y)): Path<(String, u32, u32, u32)>,
) -> Response {
    match state.weather.fetch_tile(&op, z, x, y).await {
        Ok(tile) => {
            let mut response = (
                StatusCode::OK,
                [(header::CONTENT_TYPE, tile.content_type)],
                tile.bytes,
            )
                .into_response();
            if let Some(cache_control) = tile.cache_control.and_then(|v| v.parse().ok()) {
                response.headers_mut().insert(header::CACHE_CONTROL, cache_control);
            }
            response
        }
        Err(e) => {
            let status = StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
            json_response(status, json!({ "success": false, "error": e.to_string() }))
        }
    }
}
