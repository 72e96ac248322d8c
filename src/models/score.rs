use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Decision;

/// Per-feature importance weights attached to a score.
///
/// Serializes as `{"feature_importances": {...}}`, or `{}` when the
/// estimator has nothing to offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_importances: BTreeMap<String, f64>,
}

impl Explanation {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_importances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.feature_importances.len()
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.feature_importances.get(feature).copied()
    }
}

impl FromIterator<(String, f64)> for Explanation {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            feature_importances: iter.into_iter().collect(),
        }
    }
}

/// Outcome of one `predict` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Positive-class probability, or the raw prediction when the estimator
    /// has no probability operation.
    pub score: f64,
    pub decision: Decision,
    pub explanation: Explanation,
    pub model_version: String,
}

/// Snapshot reported to health-check callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    /// An artifact was found at startup, usable or not.
    pub model_loaded: bool,
    /// The artifact produced an estimator that can score.
    pub estimator_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimator_error: Option<String>,
    pub model_version: Option<String>,
    pub model_sha256: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl ServiceStatus {
    pub fn unloaded() -> Self {
        Self {
            model_loaded: false,
            estimator_ready: false,
            estimator_error: None,
            model_version: None,
            model_sha256: None,
            loaded_at: None,
        }
    }

    /// Whether `predict` can succeed.
    pub fn is_ready(&self) -> bool {
        self.model_loaded && self.estimator_ready
    }
}
