use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::Value;
use tower::ServiceExt;

use pakscore::api::router::create_router;
use pakscore::config::AppConfig;
use pakscore::inference::{ModelPayload, ScoringService};
use pakscore::AppState;

/// Path of the sample artifact shipped under `demos/`.
#[allow(dead_code)]
pub fn demo_model_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/model.json")
}

/// Write `artifact` as `model.json` inside `dir`.
#[allow(dead_code)]
pub fn write_artifact(dir: &Path, artifact: &Value) -> PathBuf {
    let path = dir.join("model.json");
    std::fs::write(&path, serde_json::to_vec(artifact).unwrap()).expect("Failed to write artifact");
    path
}

/// Build the router around `payload` with an optional API key.
#[allow(dead_code)]
pub fn build_test_app(payload: Option<ModelPayload>, api_key: Option<&str>) -> axum::Router {
    let config = AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        model_path: demo_model_path(),
        api_key: api_key.map(str::to_string),
    };

    let state = AppState {
        config,
        service: ScoringService::new(payload),
        metrics_handle: pakscore::metrics::detached_handle(),
    };

    create_router(state)
}

#[allow(dead_code)]
pub fn predict_request(body: Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json");

    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send one request and decode the JSON body.
#[allow(dead_code)]
pub async fn send(app: axum::Router, req: Request<Body>) -> (axum::http::StatusCode, Value) {
    let resp: Response<Body> = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}
