use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use thiserror::Error;

use super::explainer::explain;
use super::payload::ModelPayload;
use super::scorer::{score, ScoreError, ScoreSource};
use super::vectorizer::vectorize_with_report;
use crate::models::{FeatureRequest, ScoreResult, ServiceStatus};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model not available on server; run training")]
    ModelUnavailable,

    #[error(transparent)]
    Scoring(#[from] ScoreError),
}

/// Entry point for scoring: owns the payload loaded at startup.
///
/// Cheap to clone; clones share the same read-only payload.
#[derive(Debug, Clone)]
pub struct ScoringService {
    payload: Option<Arc<ModelPayload>>,
}

impl ScoringService {
    pub fn new(payload: Option<ModelPayload>) -> Self {
        Self {
            payload: payload.map(Arc::new),
        }
    }

    pub fn payload(&self) -> Option<&ModelPayload> {
        self.payload.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.payload.is_some()
    }

    pub fn status(&self) -> ServiceStatus {
        match self.payload() {
            Some(p) => ServiceStatus {
                model_loaded: true,
                estimator_ready: p.estimator().is_ok(),
                estimator_error: p.estimator().err().map(|e| e.to_string()),
                model_version: Some(p.model_version().to_string()),
                model_sha256: p.sha256().map(str::to_string),
                loaded_at: Some(p.loaded_at()),
            },
            None => ServiceStatus::unloaded(),
        }
    }

    /// Vectorize, score and explain one request.
    pub fn predict(&self, request: &FeatureRequest) -> Result<ScoreResult, PredictError> {
        let Some(payload) = self.payload() else {
            counter!("prediction_failures_total", "reason" => "model_unavailable").increment(1);
            return Err(PredictError::ModelUnavailable);
        };

        let start = Instant::now();

        let vectorized = vectorize_with_report(request, payload.feature_names());
        if !vectorized.defaulted.is_empty() {
            counter!("features_defaulted_total").increment(vectorized.defaulted.len() as u64);
        }

        let scored = match score(payload, &vectorized.vector) {
            Ok(s) => s,
            Err(e) => {
                counter!("prediction_failures_total", "reason" => "scoring").increment(1);
                return Err(e.into());
            }
        };
        if matches!(scored.source, ScoreSource::Prediction(_)) {
            counter!("probability_fallbacks_total").increment(1);
        }

        let explanation = explain(payload);

        counter!("predictions_total", "decision" => scored.decision.as_str()).increment(1);
        histogram!("predict_latency_seconds").record(start.elapsed().as_secs_f64());

        tracing::debug!(
            score = scored.value,
            decision = %scored.decision,
            defaulted = vectorized.defaulted.len(),
            model_version = %payload.model_version(),
            "Prediction served"
        );

        Ok(ScoreResult {
            score: scored.value,
            decision: scored.decision,
            explanation,
            model_version: payload.model_version().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
