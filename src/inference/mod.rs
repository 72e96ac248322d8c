pub mod estimator;
pub mod explainer;
pub mod payload;
pub mod scorer;
pub mod service;
pub mod vectorizer;

pub use estimator::{Estimator, EstimatorError, EstimatorSpec};
pub use explainer::explain;
pub use payload::{load, ModelPayload, PayloadError};
pub use scorer::{score, Score, ScoreError, DECISION_THRESHOLD};
pub use service::{PredictError, ScoringService};
pub use vectorizer::{coerce, vectorize, Coercion};
