use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::models::ServiceStatus;
use crate::AppState;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(flatten)]
    details: ServiceStatus,
}

/// GET /: liveness plus whether a model is loaded. Never fails.
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ml-service ok",
        "model_loaded": state.service.is_loaded(),
    }))
}

/// GET /health: readiness. 503 until a payload with a usable estimator is
/// loaded.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let details = state.service.status();

    let (code, status) = if details.is_ready() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (code, Json(HealthBody { status, details }))
}
