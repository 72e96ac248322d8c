use thiserror::Error;

use super::estimator::{Estimator, EstimatorError};
use super::payload::ModelPayload;
use crate::models::{Decision, FeatureVector};

/// Scores at or above this value are eligible.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Column of `predict_proba` holding the positive class.
const POSITIVE_CLASS: usize = 1;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("model payload is unusable: {0}")]
    InvalidPayload(String),

    #[error("estimator failed (probability: {probability}; prediction: {prediction})")]
    Estimator {
        probability: EstimatorError,
        prediction: EstimatorError,
    },
}

/// Which estimator operation produced the score.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreSource {
    Probability,
    /// Probability was unavailable or failed; carries that failure.
    Prediction(EstimatorError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub value: f64,
    pub decision: Decision,
    pub source: ScoreSource,
}

pub fn decide(score: f64) -> Decision {
    if score >= DECISION_THRESHOLD {
        Decision::Eligible
    } else {
        Decision::Ineligible
    }
}

/// Score one vector against the payload's estimator.
pub fn score(payload: &ModelPayload, vector: &FeatureVector) -> Result<Score, ScoreError> {
    let estimator = payload
        .estimator()
        .map_err(|reason| ScoreError::InvalidPayload(reason.to_string()))?;

    score_with(estimator, vector)
}

/// Positive-class probability when available, otherwise the raw prediction.
/// The prediction is used as-is, even outside `[0, 1]`, but a NaN or
/// infinite output is never returned as a score.
pub fn score_with(estimator: &dyn Estimator, vector: &FeatureVector) -> Result<Score, ScoreError> {
    let x = vector.as_slice();

    let (value, source) = match estimator.predict_proba(x).and_then(positive_class) {
        Ok(p) => (p, ScoreSource::Probability),
        Err(probability) => {
            tracing::debug!(error = %probability, "Probability unavailable, using direct prediction");
            match estimator.predict(x).and_then(|v| finite(v, "prediction")) {
                Ok(v) => (v, ScoreSource::Prediction(probability)),
                Err(prediction) => {
                    return Err(ScoreError::Estimator {
                        probability,
                        prediction,
                    })
                }
            }
        }
    };

    Ok(Score {
        value,
        decision: decide(value),
        source,
    })
}

fn positive_class(proba: Vec<f64>) -> Result<f64, EstimatorError> {
    let p = proba.get(POSITIVE_CLASS).copied().ok_or_else(|| {
        EstimatorError::Malformed(format!(
            "probability output has {} columns, no positive class",
            proba.len()
        ))
    })?;
    finite(p, "probability")
}

fn finite(v: f64, what: &'static str) -> Result<f64, EstimatorError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EstimatorError::NonFinite(what))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
