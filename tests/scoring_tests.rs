mod common;

use std::sync::Arc;

use serde_json::json;

use pakscore::inference::estimator::{Estimator, EstimatorError};
use pakscore::inference::{self, vectorize, ModelPayload, PredictError, ScoringService};
use pakscore::models::{Decision, FeatureRequest};

fn request(value: serde_json::Value) -> FeatureRequest {
    serde_json::from_str(&value.to_string()).unwrap()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Estimator that only offers a direct prediction.
struct FixedPrediction(f64);

impl Estimator for FixedPrediction {
    fn predict(&self, _x: &[f64]) -> Result<f64, EstimatorError> {
        Ok(self.0)
    }
}

/// Echoes the sum of its input so tests can observe the vector.
struct SumEstimator;

impl Estimator for SumEstimator {
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        let s: f64 = x.iter().sum();
        Ok(vec![1.0 - s, s])
    }

    fn predict(&self, _x: &[f64]) -> Result<f64, EstimatorError> {
        Err(EstimatorError::Unsupported("predict"))
    }
}

#[test]
fn test_partial_request_vectorizes_in_feature_order() {
    let vector = vectorize(
        &request(json!({ "features": { "a": "5", "b": 2.0 } })),
        &names(&["a", "b", "c"]),
    );
    assert_eq!(vector.into_inner(), vec![5.0, 2.0, 0.0]);
}

#[test]
fn test_empty_request_scores_against_loaded_payload() {
    let service = ScoringService::new(inference::load(&common::demo_model_path()));

    let result = service.predict(&FeatureRequest::default()).unwrap();
    assert!((0.0..=1.0).contains(&result.score));
    assert_eq!(result.model_version, "v0.1");
    assert_eq!(result.explanation.len(), 7);
}

#[test]
fn test_no_payload_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let service = ScoringService::new(inference::load(&dir.path().join("model.json")));

    assert!(!service.status().model_loaded);
    assert!(matches!(
        service.predict(&request(json!({ "features": { "income": 1 } }))),
        Err(PredictError::ModelUnavailable)
    ));
}

#[test]
fn test_prediction_only_estimator_scores_raw_output() {
    let payload = ModelPayload::new(FixedPrediction(1.0), names(&["income"]), "v0.1");
    let service = ScoringService::new(Some(payload));

    let result = service.predict(&request(json!({ "features": { "income": 10 } }))).unwrap();
    assert_eq!(result.score, 1.0);
    assert_eq!(result.decision, Decision::Eligible);
    assert!(result.explanation.is_empty());

    let payload = ModelPayload::new(FixedPrediction(3.5), names(&["income"]), "v0.1");
    let result = ScoringService::new(Some(payload))
        .predict(&FeatureRequest::default())
        .unwrap();
    assert_eq!(result.score, 3.5);
}

#[test]
fn test_bad_values_reach_estimator_as_zero() {
    let payload = ModelPayload::new(SumEstimator, names(&["a", "b", "c"]), "v1");
    let service = ScoringService::new(Some(payload));

    let result = service
        .predict(&request(json!({
            "features": { "a": 0.25, "b": "n/a", "c": [1], "d": 0.5 }
        })))
        .unwrap();

    assert_eq!(result.score, 0.25);
    assert_eq!(result.decision, Decision::Ineligible);
}

#[test]
fn test_threshold_boundary_is_eligible() {
    let payload = ModelPayload::new(SumEstimator, names(&["a"]), "v1");
    let service = ScoringService::new(Some(payload));

    let at = service.predict(&request(json!({ "features": { "a": 0.5 } }))).unwrap();
    assert_eq!(at.decision, Decision::Eligible);

    let below = service.predict(&request(json!({ "features": { "a": 0.49 } }))).unwrap();
    assert_eq!(below.decision, Decision::Ineligible);
}

#[test]
fn test_logistic_artifact_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_artifact(
        dir.path(),
        &json!({
            "model": { "kind": "logistic_regression", "coefficients": [0.001, -0.002], "intercept": 0.0 },
            "feature_names": ["income", "expenses"],
            "model_version": "v0.2"
        }),
    );

    let service = ScoringService::new(inference::load(&path));
    let result = service
        .predict(&request(json!({ "features": { "income": 3000, "expenses": 500 } })))
        .unwrap();

    // z = 3 - 1 = 2
    let expected = 1.0 / (1.0 + (-2.0f64).exp());
    assert!((result.score - expected).abs() < 1e-12);
    assert_eq!(result.decision, Decision::Eligible);
    assert!(result.explanation.is_empty());
    assert_eq!(result.model_version, "v0.2");
}

#[tokio::test]
async fn test_concurrent_status_and_predict() {
    let service = Arc::new(ScoringService::new(inference::load(&common::demo_model_path())));
    let unloaded = Arc::new(ScoringService::new(None));

    let mut handles = Vec::new();
    for i in 0..32 {
        let service = service.clone();
        let unloaded = unloaded.clone();
        handles.push(tokio::spawn(async move {
            assert!(service.status().model_loaded);
            assert!(!unloaded.status().model_loaded);

            let req = request(json!({ "features": { "income": 1000 * i, "dependents": i % 4 } }));
            let first = service.predict(&req).unwrap();
            let second = service.predict(&req).unwrap();
            assert_eq!(first, second);
        }));
    }

    for h in handles {
        h.await.unwrap();
    }
}
