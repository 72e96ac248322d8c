use crate::models::{FeatureRequest, FeatureValue, FeatureVector};

/// Substituted for any feature that is missing or not numeric.
pub const DEFAULT_FEATURE_VALUE: f64 = 0.0;

/// Why a feature fell back to [`DEFAULT_FEATURE_VALUE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    Missing,
    Unparseable,
}

/// Result of coercing one feature value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coercion {
    Parsed(f64),
    Defaulted(DefaultReason),
}

impl Coercion {
    pub fn value(self) -> f64 {
        match self {
            Coercion::Parsed(v) => v,
            Coercion::Defaulted(_) => DEFAULT_FEATURE_VALUE,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Coercion::Defaulted(_))
    }
}

/// Lenient float coercion for one feature value.
///
/// Numbers pass through, strings are parsed after trimming, booleans map to
/// 1.0/0.0. Everything else is defaulted, including unparseable strings and
/// strings that parse to NaN or infinity.
pub fn coerce(value: Option<&FeatureValue>) -> Coercion {
    match value {
        None => Coercion::Defaulted(DefaultReason::Missing),
        Some(FeatureValue::Number(v)) => finite(*v),
        Some(FeatureValue::Flag(b)) => Coercion::Parsed(if *b { 1.0 } else { 0.0 }),
        Some(FeatureValue::Text(s)) => match s.trim().parse::<f64>() {
            Ok(v) => finite(v),
            Err(_) => Coercion::Defaulted(DefaultReason::Unparseable),
        },
        Some(FeatureValue::Other(_)) | Some(FeatureValue::Unreadable(_)) => {
            Coercion::Defaulted(DefaultReason::Unparseable)
        }
    }
}

fn finite(v: f64) -> Coercion {
    if v.is_finite() {
        Coercion::Parsed(v)
    } else {
        Coercion::Defaulted(DefaultReason::Unparseable)
    }
}

/// Vectorized request plus the names of the features that were defaulted.
#[derive(Debug, Clone)]
pub struct Vectorized<'a> {
    pub vector: FeatureVector,
    pub defaulted: Vec<(&'a str, DefaultReason)>,
}

/// Build the estimator input in `feature_names` order.
///
/// Total: keys not in `feature_names` are ignored and the output always has
/// exactly `feature_names.len()` entries.
pub fn vectorize(request: &FeatureRequest, feature_names: &[String]) -> FeatureVector {
    vectorize_with_report(request, feature_names).vector
}

/// Same as [`vectorize`], also reporting which positions were defaulted.
pub fn vectorize_with_report<'a>(
    request: &FeatureRequest,
    feature_names: &'a [String],
) -> Vectorized<'a> {
    let mut values = Vec::with_capacity(feature_names.len());
    let mut defaulted = Vec::new();

    for name in feature_names {
        let coerced = coerce(request.get(name));
        if let Coercion::Defaulted(reason) = coerced {
            defaulted.push((name.as_str(), reason));
        }
        values.push(coerced.value());
    }

    Vectorized {
        vector: FeatureVector::new(values),
        defaulted,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
