//! HTTP tests against the full router with an in-memory grid source.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use cloud_api::build_router;
use cloud_api::config::ServiceConfig;
use cloud_api::state::AppState;
use cloud_api::upstream::{FetchRequest, GridSource};
use cloud_common::{CloudError, CloudResult};
use rle_codec::GridBoundary;
use test_utils::{concat_messages, Grib2Builder};

// ============================================================================
// Test source
// ============================================================================

#[derive(Clone)]
enum Reply {
    Payload(Vec<u8>),
    Status(u16),
    Panic,
}

/// Serves canned replies keyed by GRIB2 variable name.
#[derive(Default)]
struct StaticSource {
    replies: HashMap<String, Reply>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StaticSource {
    fn with(mut self, variable: &str, reply: Reply) -> Self {
        self.replies.insert(variable.to_string(), reply);
        self
    }

    fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GridSource for StaticSource {
    async fn fetch(&self, request: &FetchRequest) -> CloudResult<Bytes> {
        self.requests.lock().unwrap().push(request.clone());

        match self.replies.get(&request.field.variable) {
            Some(Reply::Payload(data)) => Ok(Bytes::from(data.clone())),
            Some(Reply::Status(status)) => Err(CloudError::UpstreamStatus {
                status: *status,
                body: "error page".to_string(),
            }),
            Some(Reply::Panic) => panic!("source exploded"),
            None => Err(CloudError::UpstreamStatus {
                status: 404,
                body: "no such variable".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn layer_message(category_number: u8, level_type: u8, values: Vec<f32>) -> Vec<u8> {
    Grib2Builder::new_cloud()
        .with_grid(3, 2)
        .with_parameter(6, category_number)
        .with_cloud_layer(level_type)
        .with_values(values)
        .build()
}

fn high_cloud() -> Vec<u8> {
    layer_message(5, 234, vec![0.0, 0.0, 35.0, 35.0, 100.0, 7.0])
}

fn middle_cloud() -> Vec<u8> {
    layer_message(4, 224, vec![50.0; 6])
}

fn low_cloud() -> Vec<u8> {
    layer_message(3, 214, vec![10.0, 10.0, 10.0, 20.0, 20.0, 20.0])
}

fn isobaric(millibars: u32, values: Vec<f32>) -> Vec<u8> {
    Grib2Builder::new_isobaric(millibars)
        .with_grid(2, 2)
        .with_values(values)
        .build()
}

fn cloud_source() -> StaticSource {
    StaticSource::default()
        .with("HCDC", Reply::Payload(high_cloud()))
        .with("MCDC", Reply::Payload(middle_cloud()))
        .with("LCDC", Reply::Payload(low_cloud()))
        .with(
            "TCDC",
            Reply::Payload(concat_messages(&[
                isobaric(500, vec![1.0, 1.0, 1.0, 1.0]),
                isobaric(500, vec![1.0, 1.0, 2.0, 2.0]),
            ])),
        )
}

fn app_with(source: Arc<StaticSource>, config: ServiceConfig) -> Router {
    build_router(Arc::new(AppState::new(config, source)))
}

fn app(source: StaticSource) -> Router {
    app_with(Arc::new(source), ServiceConfig::default())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(StaticSource::default()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_ready() {
    let (status, body) = get(app(StaticSource::default()), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], json!(true));
    assert_eq!(body["source"], json!("static"));
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let response = app(StaticSource::default())
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cloud texture
// ============================================================================

#[tokio::test]
async fn test_high_cloud_pairs() {
    let (status, body) = get(
        app(cloud_source()),
        "/api/cloud-texture?level=high&date=20240501&modelrunhour=06&forecasthour=012",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([[2, 0], [2, 35], [1, 100], [1, 7]]));
}

#[tokio::test]
async fn test_request_reaches_source_with_run() {
    let source = Arc::new(cloud_source());
    let (status, _) = get(
        app_with(source.clone(), ServiceConfig::default()),
        "/api/cloud-texture?level=low&date=20240501&modelrunhour=18&forecasthour=3",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = source.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].field.variable, "LCDC");
    assert_eq!(requests[0].field.level, "low_cloud_layer");
    assert_eq!(requests[0].run.directory(), "/gfs.20240501/18/atmos");
    assert_eq!(requests[0].run.file_name(), "gfs.t18z.pgrb2.0p25.f003");
}

#[tokio::test]
async fn test_defaults_fill_missing_run() {
    let source = Arc::new(cloud_source());
    let (status, _) = get(
        app_with(source.clone(), ServiceConfig::default()),
        "/api/cloud-texture?level=middle&date=&modelrunhour=",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = &source.requests()[0];
    assert_eq!(request.run.file_name(), "gfs.t00z.pgrb2.0p25.f000");
    assert_eq!(
        request.run.date_string(),
        Utc::now().format("%Y%m%d").to_string()
    );
}

#[tokio::test]
async fn test_named_format() {
    let (status, body) = get(app(cloud_source()), "/api/cloud-texture?level=middle&format=named").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"V": 50, "C": 6}]));
}

#[tokio::test]
async fn test_flat_format() {
    let (status, body) = get(app(cloud_source()), "/api/cloud-texture?level=low&format=flat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([10, 10, 10, 20, 20, 20]));
}

#[tokio::test]
async fn test_configured_default_shape() {
    let mut config = ServiceConfig::default();
    config.encoding.default_shape = rle_codec::RunShape::Named;

    let (_, body) = get(
        app_with(Arc::new(cloud_source()), config),
        "/api/cloud-texture?level=middle",
    )
    .await;
    assert_eq!(body, json!([{"V": 50, "C": 6}]));
}

#[tokio::test]
async fn test_only_first_grid_is_encoded() {
    let source = StaticSource::default().with(
        "HCDC",
        Reply::Payload(concat_messages(&[high_cloud(), layer_message(5, 234, vec![99.0; 6])])),
    );

    let (status, body) = get(app(source), "/api/cloud-texture?level=high").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([[2, 0], [2, 35], [1, 100], [1, 7]]));
}

#[tokio::test]
async fn test_all_layers_record() {
    let source = Arc::new(cloud_source());
    let (status, body) = get(
        app_with(source.clone(), ServiceConfig::default()),
        "/api/cloud-texture?level=all",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "lowCloud": [[3, 10], [3, 20]],
            "middleCloud": [[6, 50]],
            "highCloud": [[2, 0], [2, 35], [1, 100], [1, 7]],
        })
    );

    let mut variables: Vec<String> = source
        .requests()
        .into_iter()
        .map(|r| r.field.variable)
        .collect();
    variables.sort();
    assert_eq!(variables, vec!["HCDC", "LCDC", "MCDC"]);
}

#[tokio::test]
async fn test_all_layers_fails_if_any_layer_fails() {
    let source = cloud_source().with("MCDC", Reply::Status(503));
    let (status, body) = get(app(source), "/api/cloud-texture?level=all").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Server returned non-OK status: 503"));
}

// ============================================================================
// Cloud texture errors
// ============================================================================

#[tokio::test]
async fn test_invalid_level() {
    let (status, body) = get(app(cloud_source()), "/api/cloud-texture?level=stratosphere").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid level parameter"));
    assert_eq!(body["status"], json!(400));
}

#[tokio::test]
async fn test_missing_level() {
    let (status, body) = get(app(cloud_source()), "/api/cloud-texture").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Missing required parameter: level"));
}

#[tokio::test]
async fn test_invalid_run_parameters() {
    for uri in [
        "/api/cloud-texture?level=high&modelrunhour=03",
        "/api/cloud-texture?level=high&forecasthour=999",
        "/api/cloud-texture?level=high&date=2024-05-01",
        "/api/cloud-texture?level=high&format=csv",
    ] {
        let (status, _) = get(app(cloud_source()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_invalid_parameters_never_reach_source() {
    let source = Arc::new(cloud_source());
    let (status, _) = get(
        app_with(source.clone(), ServiceConfig::default()),
        "/api/cloud-texture?level=high&date=../../etc",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_upstream_status_error() {
    let source = StaticSource::default().with("HCDC", Reply::Status(404));
    let (status, body) = get(app(source), "/api/cloud-texture?level=high").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Server returned non-OK status: 404"));
}

#[tokio::test]
async fn test_empty_payload_has_no_grids() {
    let source = StaticSource::default().with("HCDC", Reply::Payload(Vec::new()));
    let (status, body) = get(app(source), "/api/cloud-texture?level=high").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("No GRIB2 files found"));
}

#[tokio::test]
async fn test_undecodable_payload() {
    let source = StaticSource::default().with(
        "HCDC",
        Reply::Payload(b"<html>maintenance</html>".to_vec()),
    );
    let (status, body) = get(app(source), "/api/cloud-texture?level=high").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid GRIB2 data"));
}

#[tokio::test]
async fn test_panic_becomes_server_error() {
    let source = StaticSource::default().with("HCDC", Reply::Panic);
    let (status, body) = get(app(source), "/api/cloud-texture?level=high").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Server error"));
}

// ============================================================================
// Flattened cloud texture
// ============================================================================

#[tokio::test]
async fn test_flattened_defaults_to_flat() {
    let source = Arc::new(cloud_source());
    let (status, body) = get(
        app_with(source.clone(), ServiceConfig::default()),
        "/api/flattened-cloud-texture?level_mb=500_mb",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([1, 1, 1, 1, 1, 1, 2, 2]));

    let request = &source.requests()[0];
    assert_eq!(request.field.variable, "TCDC");
    assert_eq!(request.field.level, "500_mb");
}

#[tokio::test]
async fn test_flattened_bare_level() {
    let (status, _) = get(app(cloud_source()), "/api/flattened-cloud-texture?level_mb=500").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_flattened_pairs_boundary_policies() {
    let (_, split) = get(
        app(cloud_source()),
        "/api/flattened-cloud-texture?level_mb=500&format=pairs",
    )
    .await;
    assert_eq!(split, json!([[4, 1], [2, 1], [2, 2]]));

    let (_, merged) = get(
        app(cloud_source()),
        "/api/flattened-cloud-texture?level_mb=500&format=pairs&boundary=merge",
    )
    .await;
    assert_eq!(merged, json!([[6, 1], [2, 2]]));
}

#[tokio::test]
async fn test_flattened_configured_boundary() {
    let mut config = ServiceConfig::default();
    config.encoding.grid_boundary = GridBoundary::Merge;

    let (_, body) = get(
        app_with(Arc::new(cloud_source()), config),
        "/api/flattened-cloud-texture?level_mb=500&format=pairs",
    )
    .await;
    assert_eq!(body, json!([[6, 1], [2, 2]]));
}

#[tokio::test]
async fn test_flattened_invalid_parameters() {
    for uri in [
        "/api/flattened-cloud-texture",
        "/api/flattened-cloud-texture?level_mb=2000",
        "/api/flattened-cloud-texture?level_mb=high",
        "/api/flattened-cloud-texture?level_mb=500&boundary=sideways",
    ] {
        let (status, _) = get(app(cloud_source()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}
