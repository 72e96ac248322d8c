use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by an estimator operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("estimator does not support {0}")]
    Unsupported(&'static str),

    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("split references feature {feature} but the vector has {len} entries")]
    FeatureOutOfRange { feature: usize, len: usize },

    #[error("malformed estimator: {0}")]
    Malformed(String),

    #[error("estimator produced a non-finite {0}")]
    NonFinite(&'static str),
}

/// A trained model as seen by the scorer and explainer.
///
/// Only `predict` is mandatory. The probability and importance operations
/// default to `Unsupported` so that callers can tell "not offered" apart
/// from a value.
pub trait Estimator: Send + Sync {
    /// Class probabilities for a single sample, ordered by class label.
    fn predict_proba(&self, _x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        Err(EstimatorError::Unsupported("predict_proba"))
    }

    /// Direct prediction for a single sample.
    fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError>;

    /// Global importance weight per input feature.
    fn feature_importances(&self) -> Result<Vec<f64>, EstimatorError> {
        Err(EstimatorError::Unsupported("feature_importances"))
    }
}

// ---------------------------------------------------------------------------
// Persisted estimator kinds
// ---------------------------------------------------------------------------

/// Estimators that can be described in a model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorSpec {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
    LinearRegression(LinearRegression),
}

impl Estimator for EstimatorSpec {
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        match self {
            EstimatorSpec::RandomForest(m) => m.predict_proba(x),
            EstimatorSpec::LogisticRegression(m) => m.predict_proba(x),
            EstimatorSpec::LinearRegression(m) => m.predict_proba(x),
        }
    }

    fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        match self {
            EstimatorSpec::RandomForest(m) => m.predict(x),
            EstimatorSpec::LogisticRegression(m) => m.predict(x),
            EstimatorSpec::LinearRegression(m) => m.predict(x),
        }
    }

    fn feature_importances(&self) -> Result<Vec<f64>, EstimatorError> {
        match self {
            EstimatorSpec::RandomForest(m) => m.feature_importances(),
            EstimatorSpec::LogisticRegression(m) => m.feature_importances(),
            EstimatorSpec::LinearRegression(m) => m.feature_importances(),
        }
    }
}

// ---------------------------------------------------------------------------
// Random forest
// ---------------------------------------------------------------------------

/// One node of a binary decision tree. Samples go `left` when
/// `x[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Per-class sample counts (or weights) that reached this leaf.
        value: Vec<f64>,
    },
}

/// Flat node list; index 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walk from the root to a leaf and return its class values.
    ///
    /// The walk is bounded by the node count, so a cyclic tree is reported
    /// as malformed instead of looping.
    fn leaf_for(&self, x: &[f64]) -> Result<&[f64], EstimatorError> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x.get(*feature).ok_or(EstimatorError::FeatureOutOfRange {
                        feature: *feature,
                        len: x.len(),
                    })?;
                    idx = if *v <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(EstimatorError::Malformed(format!(
                        "node index {idx} out of range ({} nodes)",
                        self.nodes.len()
                    )))
                }
            }
        }
        Err(EstimatorError::Malformed(
            "tree walk did not reach a leaf".into(),
        ))
    }
}

fn default_classes() -> Vec<f64> {
    vec![0.0, 1.0]
}

/// Bagged decision trees with averaged leaf class distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
    #[serde(default = "default_classes")]
    pub classes: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl Estimator for RandomForest {
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        if self.trees.is_empty() {
            return Err(EstimatorError::Malformed("forest has no trees".into()));
        }

        let n_classes = self.classes.len();
        let mut proba = vec![0.0; n_classes];

        for tree in &self.trees {
            let leaf = tree.leaf_for(x)?;
            if leaf.len() != n_classes {
                return Err(EstimatorError::Malformed(format!(
                    "leaf has {} class values, forest declares {n_classes} classes",
                    leaf.len()
                )));
            }

            let total: f64 = leaf.iter().sum();
            if total <= 0.0 {
                return Err(EstimatorError::Malformed("leaf with zero weight".into()));
            }

            for (acc, v) in proba.iter_mut().zip(leaf) {
                *acc += v / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }

        Ok(proba)
    }

    fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        let proba = self.predict_proba(x)?;

        // First maximum wins on ties.
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }

        self.classes
            .get(best)
            .copied()
            .ok_or_else(|| EstimatorError::Malformed("forest declares no classes".into()))
    }

    fn feature_importances(&self) -> Result<Vec<f64>, EstimatorError> {
        self.feature_importances
            .clone()
            .ok_or(EstimatorError::Unsupported("feature_importances"))
    }
}

// ---------------------------------------------------------------------------
// Linear models
// ---------------------------------------------------------------------------

fn linear_term(coefficients: &[f64], intercept: f64, x: &[f64]) -> Result<f64, EstimatorError> {
    if coefficients.len() != x.len() {
        return Err(EstimatorError::DimensionMismatch {
            expected: coefficients.len(),
            actual: x.len(),
        });
    }

    Ok(coefficients.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + intercept)
}

/// Binary logistic regression. Exposes probabilities but no importances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl Estimator for LogisticRegression {
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        let z = linear_term(&self.coefficients, self.intercept, x)?;
        let p = 1.0 / (1.0 + (-z).exp());
        Ok(vec![1.0 - p, p])
    }

    fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        let z = linear_term(&self.coefficients, self.intercept, x)?;
        Ok(if z > 0.0 { 1.0 } else { 0.0 })
    }
}

/// Plain linear model. Prediction only; its output is not a probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl Estimator for LinearRegression {
    fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        linear_term(&self.coefficients, self.intercept, x)
    }

    fn feature_importances(&self) -> Result<Vec<f64>, EstimatorError> {
        self.feature_importances
            .clone()
            .ok_or(EstimatorError::Unsupported("feature_importances"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
