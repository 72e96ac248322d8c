use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared-secret authentication middleware.
///
/// If `API_KEY` is configured, every request must carry an `x-api-key`
/// header equal to it. If it is unset, authentication is disabled (dev mode).
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.config.api_key.as_deref() else {
        return next.run(req).await;
    };

    let supplied = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match supplied {
        Some(token) if token == expected => next.run(req).await,
        _ => {
            tracing::warn!(has_header = supplied.is_some(), "Rejected request with bad API key");
            AppError::Unauthorized.into_response()
        }
    }
}
