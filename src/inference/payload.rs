use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::estimator::{Estimator, EstimatorSpec};

/// Version reported when an artifact does not carry one.
pub const DEFAULT_MODEL_VERSION: &str = "v0.0";

/// Reasons an artifact on disk could not produce a usable estimator.
///
/// These never abort startup. They are kept on the payload and reported
/// when scoring is attempted.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to read model artifact: {0}")]
    Read(#[from] io::Error),

    #[error("model artifact is not a valid payload: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("model artifact has no model entry")]
    MissingModel,

    #[error("model entry is not a supported estimator: {0}")]
    Estimator(#[source] serde_json::Error),

    #[error("duplicate feature name '{0}'")]
    DuplicateFeature(String),
}

/// Either a usable estimator or the reason there is none.
pub enum EstimatorSlot {
    Ready(Box<dyn Estimator>),
    Invalid(PayloadError),
}

impl fmt::Debug for EstimatorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorSlot::Ready(_) => f.write_str("Ready(..)"),
            EstimatorSlot::Invalid(e) => f.debug_tuple("Invalid").field(e).finish(),
        }
    }
}

/// Estimator bundled with the feature ordering it was trained against.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug)]
pub struct ModelPayload {
    estimator: EstimatorSlot,
    feature_names: Vec<String>,
    model_version: String,
    sha256: Option<String>,
    loaded_at: DateTime<Utc>,
}

/// On-disk shape. Every field is optional so that a structurally wrong
/// artifact still yields a payload.
#[derive(Deserialize)]
struct RawArtifact {
    #[serde(default)]
    model: Option<serde_json::Value>,
    #[serde(default)]
    feature_names: Vec<String>,
    #[serde(default)]
    model_version: Option<String>,
}

impl ModelPayload {
    pub fn new(
        estimator: impl Estimator + 'static,
        feature_names: Vec<String>,
        model_version: impl Into<String>,
    ) -> Self {
        let estimator = match first_duplicate(&feature_names) {
            Some(name) => EstimatorSlot::Invalid(PayloadError::DuplicateFeature(name)),
            None => EstimatorSlot::Ready(Box::new(estimator)),
        };

        Self {
            estimator,
            feature_names,
            model_version: model_version.into(),
            sha256: None,
            loaded_at: Utc::now(),
        }
    }

    /// Build a payload from artifact bytes. Never fails: defects are kept in
    /// the estimator slot.
    pub fn from_artifact_bytes(bytes: &[u8]) -> Self {
        let sha256 = Some(fingerprint(bytes));

        let raw = match serde_json::from_slice::<RawArtifact>(bytes) {
            Ok(raw) => raw,
            Err(e) => return Self::invalid(PayloadError::Parse(e), sha256),
        };

        let estimator = match (raw.model, first_duplicate(&raw.feature_names)) {
            (_, Some(name)) => EstimatorSlot::Invalid(PayloadError::DuplicateFeature(name)),
            (None, None) => EstimatorSlot::Invalid(PayloadError::MissingModel),
            (Some(model), None) => match serde_json::from_value::<EstimatorSpec>(model) {
                Ok(spec) => EstimatorSlot::Ready(Box::new(spec)),
                Err(e) => EstimatorSlot::Invalid(PayloadError::Estimator(e)),
            },
        };

        Self {
            estimator,
            feature_names: raw.feature_names,
            model_version: raw
                .model_version
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.into()),
            sha256,
            loaded_at: Utc::now(),
        }
    }

    fn invalid(reason: PayloadError, sha256: Option<String>) -> Self {
        Self {
            estimator: EstimatorSlot::Invalid(reason),
            feature_names: Vec::new(),
            model_version: DEFAULT_MODEL_VERSION.into(),
            sha256,
            loaded_at: Utc::now(),
        }
    }

    pub fn estimator(&self) -> Result<&dyn Estimator, &PayloadError> {
        match &self.estimator {
            EstimatorSlot::Ready(e) => Ok(e.as_ref()),
            EstimatorSlot::Invalid(reason) => Err(reason),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Hex SHA-256 of the artifact bytes, when loaded from disk.
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Load the artifact at `path`.
///
/// A missing file is the normal "no model trained yet" state and yields
/// `None`. Any other problem yields a payload that fails at scoring time.
pub fn load(path: &Path) -> Option<ModelPayload> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "No model artifact found, serving without a model");
            return None;
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Model artifact unreadable");
            return Some(ModelPayload::invalid(PayloadError::Read(e), None));
        }
    };

    let payload = ModelPayload::from_artifact_bytes(&bytes);

    match payload.estimator() {
        Ok(_) => tracing::info!(
            path = %path.display(),
            model_version = %payload.model_version(),
            features = payload.feature_names().len(),
            sha256 = payload.sha256().unwrap_or_default(),
            "Model artifact loaded"
        ),
        Err(reason) => tracing::error!(
            path = %path.display(),
            error = %reason,
            "Model artifact is malformed, predictions will fail"
        ),
    }

    Some(payload)
}

fn first_duplicate(names: &[String]) -> Option<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .cloned()
}

fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
