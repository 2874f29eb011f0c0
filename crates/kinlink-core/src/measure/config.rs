use crate::error::{LinkageError, Result};
use serde::{Deserialize, Serialize};

/// What a field contributes when exactly one side is empty.
/// (Both empty always contributes 0.)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MissingFieldPolicy {
    /// The largest distance a field can take.
    Maximum,
    /// A fixed value.
    Constant(f64),
    /// Mean of the fields present on both sides of this comparison.
    RecordMean,
}

/// How per-field contributions combine into one distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Mean,
    /// One weight per selected field.
    WeightedMean(Vec<f64>),
    Max,
    /// Mean mapped into `[0, 1]`: `min(m, cutoff) / cutoff`, or `m / (m + 1)`
    /// without a cutoff. A no-op when fields are already bounded by 1.
    NormalisedMean { cutoff: Option<f64> },
}

impl Aggregation {
    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::WeightedMean(_) => "weighted mean",
            Aggregation::Max => "max",
            Aggregation::NormalisedMean { .. } => "normalised mean",
        }
    }
}

/// Configuration for a composite record measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// Per-field clamp: each field distance becomes `min(d, cut_off)`.
    /// Default: None (no clamp)
    pub cut_off: Option<f64>,

    /// Divide each clamped field distance by `cut_off`. Requires a cut-off.
    /// Default: false
    pub normalise: bool,

    /// Explicit maximum used for one-sided missing fields. When unset the
    /// maximum is derived from the base measure and cut-off.
    /// Default: None
    pub missing_cap: Option<f64>,

    /// Default: Maximum
    pub missing: MissingFieldPolicy,

    /// Default: Sum
    pub aggregation: Aggregation,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            cut_off: None,
            normalise: false,
            missing_cap: None,
            missing: MissingFieldPolicy::Maximum,
            aggregation: Aggregation::Sum,
        }
    }
}

impl MeasureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cut_off(mut self, cut_off: f64) -> Self {
        self.cut_off = Some(cut_off);
        self
    }

    pub fn with_normalise(mut self, normalise: bool) -> Self {
        self.normalise = normalise;
        self
    }

    pub fn with_missing_cap(mut self, cap: f64) -> Self {
        self.missing_cap = Some(cap);
        self
    }

    pub fn with_missing(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing = policy;
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Validate against the number of selected fields.
    pub fn validate(&self, field_count: usize) -> Result<()> {
        if field_count == 0 {
            return Err(LinkageError::Validation(
                "at least one field must be selected".into(),
            ));
        }

        if let Some(c) = self.cut_off {
            if !(c > 0.0) {
                return Err(LinkageError::Validation("cut_off must be > 0".into()));
            }
        }

        if self.normalise && self.cut_off.map_or(true, f64::is_infinite) {
            return Err(LinkageError::Validation(
                "normalise requires a finite cut_off".into(),
            ));
        }

        if let Some(cap) = self.missing_cap {
            if !(cap > 0.0) || cap.is_infinite() {
                return Err(LinkageError::Validation(
                    "missing_cap must be finite and > 0".into(),
                ));
            }
        }

        if let MissingFieldPolicy::Constant(c) = self.missing {
            if !(c >= 0.0) || c.is_infinite() {
                return Err(LinkageError::Validation(
                    "missing-field constant must be finite and >= 0".into(),
                ));
            }
        }

        match &self.aggregation {
            Aggregation::WeightedMean(weights) => {
                if weights.len() != field_count {
                    return Err(LinkageError::ShapeMismatch {
                        left: field_count,
                        right: weights.len(),
                    });
                }
                if weights.iter().any(|w| !(*w >= 0.0)) {
                    return Err(LinkageError::Validation(
                        "weights must be non-negative".into(),
                    ));
                }
                if weights.iter().sum::<f64>() <= 0.0 {
                    return Err(LinkageError::Validation(
                        "weights must not all be zero".into(),
                    ));
                }
            }
            Aggregation::NormalisedMean { cutoff: Some(c) } if !(*c > 0.0) => {
                return Err(LinkageError::Validation(
                    "normalisation cutoff must be > 0".into(),
                ));
            }
            _ => {}
        }

        Ok(())
    }
}
