use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

/// A single caller-supplied feature value, as it arrived on the wire.
///
/// Nothing is rejected at this stage: anything that is not a number, a
/// string or a boolean lands in `Other` and is resolved by the vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Other(serde_json::Value),
    /// Raw JSON that could not be read as a value, e.g. `1e400`.
    #[serde(skip_deserializing)]
    Unreadable(String),
}

impl FeatureValue {
    /// Parse one raw JSON value, keeping the text when it does not fit.
    fn from_raw(raw: &RawValue) -> Self {
        serde_json::from_str(raw.get())
            .unwrap_or_else(|_| FeatureValue::Unreadable(raw.get().to_string()))
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Flag(v)
    }
}

/// Body of `POST /predict`: an unordered, possibly partial feature mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureRequest {
    #[serde(default, deserialize_with = "lenient_features")]
    pub features: HashMap<String, FeatureValue>,
}

impl FeatureRequest {
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.features.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FeatureRequest
where
    K: Into<String>,
    V: Into<FeatureValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            features: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// `null` reads as an empty mapping. Each value is captured raw first so
/// that one unreadable entry never rejects the whole body.
fn lenient_features<'de, D>(deserializer: D) -> Result<HashMap<String, FeatureValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Box<RawValue>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| {
            let value = FeatureValue::from_raw(&value);
            (name, value)
        })
        .collect())
}

/// Fixed-order numeric input for the estimator. Position `i` holds the value
/// for `feature_names[i]` of the payload it was built against.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}
