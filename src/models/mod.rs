pub mod feature;
pub mod score;

pub use feature::{FeatureRequest, FeatureValue, FeatureVector};
pub use score::{Explanation, ScoreResult, ServiceStatus};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Binary outcome derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Eligible,
    Ineligible,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Eligible => "eligible",
            Decision::Ineligible => "ineligible",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
