//! End-to-end tests of the HTTP surface, driven through the router.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::Engine;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

use heatmap_api::config::ServiceConfig;
use heatmap_api::state::AppState;
use heatmap_common::SamplePoint;
use test_utils::{five_samples, samples_csv_en, samples_csv_zh, TempRegionStore};
use weather_client::WeatherConfig;

const BOUNDARY: &str = "heatmap-test-boundary";
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn test_app(store: &TempRegionStore) -> Router {
    let config = ServiceConfig {
        assets_dir: store.root().to_path_buf(),
        canvas_width: 300,
        weather: WeatherConfig::with_api_key("test").with_base_url("http://127.0.0.1:9"),
        ..ServiceConfig::default()
    };
    let state = Arc::new(AppState::new(config).unwrap());
    let handle = PrometheusBuilder::new().build_recorder().handle();
    heatmap_api::app(state, handle)
}

enum Part<'a> {
    File { name: &'a str, filename: &'a str, data: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

fn multipart_request(uri: &str, parts: &[Part<'_>], session: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File { name, filename, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value).as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(session) = session {
        builder = builder.header("x-session-id", session);
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(session) = session {
        builder = builder.header("x-session-id", session);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn generate(app: &Router, csv: &str, options: Value) -> (StatusCode, Value) {
    let options = options.to_string();
    let request = multipart_request(
        "/api/heatmap/generate",
        &[
            Part::File {
                name: "excelFile",
                filename: "samples.csv",
                data: csv.as_bytes(),
            },
            Part::Text {
                name: "options",
                value: &options,
            },
        ],
        None,
    );
    send(app, request).await
}

// ============================================================================
// Heatmap generation
// ============================================================================

#[tokio::test]
async fn test_generate_heatmap_end_to_end() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);

    let csv = samples_csv_zh(&five_samples());
    let (status, body) = generate(
        &app,
        &csv,
        json!({"city": "regionA", "interpolation_method": "rbf", "grid_resolution": 50}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "success");

    let b64 = body["image_base64"].as_str().unwrap();
    assert!(!b64.is_empty());
    let png = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
    assert!(png.starts_with(PNG_SIGNATURE));
}

#[tokio::test]
async fn test_region_without_boundary() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);

    let csv = samples_csv_en(&five_samples());
    let (status, body) = generate(&app, &csv, json!({"city": "regionB", "grid_resolution": 30})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("regionB"), "{}", message);
    assert!(message.contains("Boundary"), "{}", message);
}

#[tokio::test]
async fn test_unknown_method_matches_kriging() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);
    let csv = samples_csv_en(&five_samples());

    let (_, kriging) = generate(
        &app,
        &csv,
        json!({"city": "regionA", "interpolation_method": "kriging", "grid_resolution": 30}),
    )
    .await;
    let (status, unknown) = generate(
        &app,
        &csv,
        json!({"city": "regionA", "interpolation_method": "nearest", "grid_resolution": 30}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(kriging["image_base64"], unknown["image_base64"]);
}

#[tokio::test]
async fn test_missing_layer_is_skipped() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);

    let csv = samples_csv_en(&five_samples());
    let (status, body) = generate(
        &app,
        &csv,
        json!({"city": "regionA", "grid_resolution": 30, "map_layers": ["roads", "railways"], "show_points": true}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_single_point_is_interpolation_error() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);

    let csv = samples_csv_en(&[SamplePoint::new(112.3, 37.8, 50.0)]);
    let (status, body) = generate(&app, &csv, json!({"city": "regionA", "grid_resolution": 30})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_missing_columns_rejected() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);

    let (status, body) = generate(&app, "lng,lat\n112.3,37.8\n", json!({"city": "regionA"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("concentration"));
}

#[tokio::test]
async fn test_bad_options_rejected() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);
    let csv = samples_csv_en(&five_samples());

    let request = multipart_request(
        "/api/heatmap/generate",
        &[
            Part::File {
                name: "excelFile",
                filename: "samples.csv",
                data: csv.as_bytes(),
            },
            Part::Text {
                name: "options",
                value: "{not json",
            },
        ],
        None,
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = generate(&app, &csv, json!({"city": "regionA", "grid_resolution": 100000})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_without_file() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);

    let request = multipart_request(
        "/api/heatmap/generate",
        &[Part::Text {
            name: "options",
            value: "{}",
        }],
        None,
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_region_listing() {
    let store = TempRegionStore::standard();
    let app = test_app(&store);

    let (status, body) = send(&app, get("/api/heatmap/regions", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["regions"], json!(["regionA"]));

    let (status, body) = send(&app, get("/api/heatmap/regions/regionA/layers", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["layers"], json!(["roads", "water"]));
}

// ============================================================================
// Carbon calculator
// ============================================================================

#[tokio::test]
async fn test_estimate_endpoint() {
    let store = TempRegionStore::new();
    let app = test_app(&store);

    let payload = json!({
        "fuel_data": {"gas": 1, "coal": "2"},
        "electricity_data": {"consumption_kwh": 1000, "region": "North"}
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/estimate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["scope1_emissions"], json!(25.42));
    assert_eq!(body["data"]["scope2_emissions"], json!(0.5921));
    assert_eq!(body["data"]["total_emissions"], json!(26.0121));
}

#[tokio::test]
async fn test_estimate_rejects_empty_body() {
    let store = TempRegionStore::new();
    let app = test_app(&store);

    let request = Request::builder()
        .method("POST")
        .uri("/api/estimate")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/api/estimate")
        .body(Body::from("[1, 2"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_factor_listing() {
    let store = TempRegionStore::new();
    let app = test_app(&store);

    let (status, body) = send(&app, get("/api/estimate/factors", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fuels"].as_array().unwrap().len(), 4);
    assert_eq!(body["grid_regions"].as_array().unwrap().len(), 7);
}

// ============================================================================
// Map uploads
// ============================================================================

#[tokio::test]
async fn test_map_upload_is_per_session() {
    let store = TempRegionStore::new();
    let app = test_app(&store);

    let csv = samples_csv_zh(&five_samples());
    let request = multipart_request(
        "/map/upload",
        &[Part::File {
            name: "file",
            filename: "markers.csv",
            data: csv.as_bytes(),
        }],
        Some("alice"),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);

    let (_, body) = send(&app, get("/map/get-data", Some("alice"))).await;
    let points = body["points"].as_array().unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[0]["id"], 0);
    assert_eq!(points[0]["name"], "site-1");
    assert_eq!(points[2]["concentration"], json!(55.0));

    let (status, body) = send(&app, get("/map/get-data", Some("bob"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"], json!([]));
}

#[tokio::test]
async fn test_map_upload_errors() {
    let store = TempRegionStore::new();
    let app = test_app(&store);

    let request = multipart_request("/map/upload", &[], None);
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    // Heatmap-style table without a name column
    let csv = "lng,lat,concentration\n112.3,37.8,50\n";
    let request = multipart_request(
        "/map/upload",
        &[Part::File {
            name: "file",
            filename: "markers.csv",
            data: csv.as_bytes(),
        }],
        None,
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("name"));

    let request = multipart_request(
        "/map/upload",
        &[Part::File {
            name: "file",
            filename: "markers.xlsx",
            data: b"not a workbook",
        }],
        None,
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

// ============================================================================
// Service endpoints
// ============================================================================

#[tokio::test]
async fn test_health_and_index() {
    let store = TempRegionStore::new();
    let app = test_app(&store);

    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_weather_validation_without_upstream() {
    let store = TempRegionStore::new();
    let app = test_app(&store);

    let (status, _) = send(&app, get("/api/weather/history/Taiyuan", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/weather/map_tile/XX/1/2/3", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/weather/map_layers", None)).await;
    assert_eq!(status, StatusCode::OK);
    let precipitation = body["precipitation"].as_str().unwrap();
    assert!(precipitation.contains("/maps/2.0/weather/PR0/{z}/{x}/{y}"));
    assert!(precipitation.contains("appid=test"));
}
