//! Carbon emission estimate handlers.

use axum::{http::StatusCode, response::Response, Json};
use bytes::Bytes;
use serde_json::json;
use tracing::{debug, warn};

use carbon::{factor_table, EstimateRequest, FactorTable};

use super::json_response;

/// POST /api/estimate
///
/// The body is read raw so that an empty or malformed payload gets the same
/// structured 400 as a semantically invalid one.
pub async fn estimate_handler(body: Bytes) -> Result<Json<serde_json::Value>, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(bad_request("request body is empty".to_string()));
    }

    let request: EstimateRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected estimate request");
        bad_request(format!("invalid request body: {}", e))
    })?;

    let estimate = request.estimate();
    debug!(
        total = estimate.total_emissions,
        scope1 = estimate.scope1_emissions,
        scope2 = estimate.scope2_emissions,
        "Computed emission estimate"
    );

    Ok(Json(json!({ "success": true, "data": estimate })))
}

/// GET /api/estimate/factors
pub async fn factors_handler() -> Json<FactorTable> {
    Json(factor_table())
}

fn bad_request(error: String) -> Response {
    json_response(StatusCode::BAD_REQUEST, json!({ "success": false, "error": error }))
}
