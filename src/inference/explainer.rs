use super::estimator::Estimator;
use super::payload::ModelPayload;
use crate::models::Explanation;

/// Global feature importances keyed by feature name.
///
/// Best-effort: an estimator without importances, one that fails, or one
/// whose vector length disagrees with the feature names gives an empty
/// explanation. The weights are a property of the trained model and do not
/// depend on the request being scored.
pub fn explain(payload: &ModelPayload) -> Explanation {
    match payload.estimator() {
        Ok(estimator) => explain_with(estimator, payload.feature_names()),
        Err(_) => Explanation::empty(),
    }
}

pub fn explain_with(estimator: &dyn Estimator, feature_names: &[String]) -> Explanation {
    let importances = match estimator.feature_importances() {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "No feature importances available");
            return Explanation::empty();
        }
    };

    if importances.len() != feature_names.len() {
        tracing::debug!(
            importances = importances.len(),
            features = feature_names.len(),
            "Feature importance length mismatch, skipping explanation"
        );
        return Explanation::empty();
    }

    feature_names.iter().cloned().zip(importances).collect()
}
