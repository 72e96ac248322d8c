use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::{FeatureRequest, ScoreResult};
use crate::AppState;

/// POST /predict: score one feature mapping.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<FeatureRequest>, JsonRejection>,
) -> Result<Json<ScoreResult>, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let result = state.service.predict(&request)?;
    Ok(Json(result))
}
