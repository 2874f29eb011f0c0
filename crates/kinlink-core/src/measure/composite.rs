use super::base::StringMeasure;
use super::config::{Aggregation, MeasureConfig, MissingFieldPolicy};
use crate::error::{LinkageError, Result};
use crate::types::{Record, RecordKind};
use std::sync::Arc;

/// A distance between two whole records.
pub trait RecordMeasure: Send + Sync {
    fn distance(&self, a: &Record, b: &Record) -> f64;

    /// True only when the triangle inequality is guaranteed. Search
    /// structures rely on this to decide whether pivot pruning is safe.
    fn is_metric(&self) -> bool;

    fn max_distance_is_one(&self) -> bool;

    fn describe(&self) -> String;
}

impl<M: RecordMeasure + ?Sized> RecordMeasure for Arc<M> {
    fn distance(&self, a: &Record, b: &Record) -> f64 {
        (**self).distance(a, b)
    }

    fn is_metric(&self) -> bool {
        (**self).is_metric()
    }

    fn max_distance_is_one(&self) -> bool {
        (**self).max_distance_is_one()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Combines per-field string distances over two selector lists.
///
/// `fields1[i]` of the first record is compared with `fields2[i]` of the
/// second. Each field is evaluated on its own:
///
/// - both values empty: 0
/// - exactly one empty: per [`MissingFieldPolicy`]
/// - byte-identical: 0, without calling the base measure
/// - otherwise the base distance, clamped and normalised per the config
#[derive(Debug, Clone)]
pub struct CompositeMeasure {
    base: Arc<dyn StringMeasure>,
    fields1: Vec<usize>,
    fields2: Vec<usize>,
    config: MeasureConfig,
    field_max: f64,
}

impl CompositeMeasure {
    /// Compare the same fields on both sides.
    pub fn new(base: Arc<dyn StringMeasure>, fields: Vec<usize>, config: MeasureConfig) -> Result<Self> {
        Self::between(base, fields.clone(), fields, config)
    }

    /// Compare `fields1` of the first record with `fields2` of the second.
    pub fn between(
        base: Arc<dyn StringMeasure>,
        fields1: Vec<usize>,
        fields2: Vec<usize>,
        config: MeasureConfig,
    ) -> Result<Self> {
        if fields1.len() != fields2.len() {
            return Err(LinkageError::ShapeMismatch {
                left: fields1.len(),
                right: fields2.len(),
            });
        }
        config.validate(fields1.len())?;
        let field_max = Self::derive_field_max(base.as_ref(), &config)?;

        Ok(Self {
            base,
            fields1,
            fields2,
            config,
            field_max,
        })
    }

    /// Check both selector lists against the record kinds they will see.
    pub fn for_kinds(self, kind1: RecordKind, kind2: RecordKind) -> Result<Self> {
        kind1.check_fields(&self.fields1)?;
        kind2.check_fields(&self.fields2)?;
        Ok(self)
    }

    /// The same measure comparing `fields1` on both sides, for indexing the
    /// first collection.
    pub fn homogeneous(&self) -> Self {
        Self {
            base: self.base.clone(),
            fields1: self.fields1.clone(),
            fields2: self.fields1.clone(),
            config: self.config.clone(),
            field_max: self.field_max,
        }
    }

    pub fn fields1(&self) -> &[usize] {
        &self.fields1
    }

    pub fn fields2(&self) -> &[usize] {
        &self.fields2
    }

    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    /// What a one-sided missing field contributes under `Maximum`.
    pub fn field_max(&self) -> f64 {
        self.field_max
    }

    /// Per-field contributions after missing-value handling, before aggregation.
    pub fn field_distances(&self, a: &Record, b: &Record) -> Vec<f64> {
        let raw: Vec<Option<f64>> = self
            .fields1
            .iter()
            .zip(&self.fields2)
            .map(|(&i, &j)| self.field_distance(a.field(i), b.field(j)))
            .collect();

        let imputed = match self.config.missing {
            MissingFieldPolicy::Maximum => self.field_max,
            MissingFieldPolicy::Constant(c) => c,
            MissingFieldPolicy::RecordMean => {
                let present: Vec<f64> = raw.iter().flatten().copied().collect();
                if present.is_empty() {
                    self.field_max
                } else {
                    present.iter().sum::<f64>() / present.len() as f64
                }
            }
        };

        raw.into_iter().map(|d| d.unwrap_or(imputed)).collect()
    }

    /// `None` when exactly one side is empty.
    fn field_distance(&self, a: &str, b: &str) -> Option<f64> {
        let missing_a = a.trim().is_empty();
        let missing_b = b.trim().is_empty();
        match (missing_a, missing_b) {
            (true, true) => Some(0.0),
            (true, false) | (false, true) => None,
            _ if a == b => Some(0.0),
            _ => Some(self.clip(self.base.distance(a, b))),
        }
    }

    fn clip(&self, d: f64) -> f64 {
        match self.config.cut_off {
            Some(c) if self.config.normalise => d.min(c) / c,
            Some(c) => d.min(c),
            None => d,
        }
    }

    fn aggregate(&self, values: &[f64]) -> f64 {
        let n = values.len() as f64;
        match &self.config.aggregation {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Mean => values.iter().sum::<f64>() / n,
            Aggregation::WeightedMean(weights) => {
                let total: f64 = weights.iter().sum();
                values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
            }
            Aggregation::Max => values.iter().copied().fold(0.0, f64::max),
            Aggregation::NormalisedMean { cutoff } => {
                let mean = values.iter().sum::<f64>() / n;
                if self.fields_bounded_by_one() {
                    mean
                } else {
                    match cutoff {
                        Some(c) => mean.min(*c) / c,
                        None => mean / (mean + 1.0),
                    }
                }
            }
        }
    }

    fn derive_field_max(base: &dyn StringMeasure, config: &MeasureConfig) -> Result<f64> {
        if let Some(cap) = config.missing_cap {
            return Ok(cap);
        }
        if config.normalise {
            return Ok(1.0);
        }
        match config.cut_off {
            Some(c) if base.max_distance_is_one() => Ok(c.min(1.0)),
            Some(c) if c.is_finite() => Ok(c),
            _ if base.max_distance_is_one() => Ok(1.0),
            _ => Err(LinkageError::Validation(format!(
                "{} is unbounded: set a finite cut_off or a missing_cap",
                base.name()
            ))),
        }
    }

    /// Largest value a compared (non-missing) field can contribute.
    fn clipped_bound(&self) -> f64 {
        if self.config.normalise {
            return 1.0;
        }
        let base_bound = if self.base.max_distance_is_one() {
            1.0
        } else {
            f64::INFINITY
        };
        self.config.cut_off.map_or(base_bound, |c| c.min(base_bound))
    }

    fn fields_bounded_by_one(&self) -> bool {
        let missing_bound = match self.config.missing {
            MissingFieldPolicy::Constant(c) => c.max(self.field_max),
            _ => self.field_max,
        };
        self.clipped_bound() <= 1.0 && missing_bound <= 1.0
    }
}

impl RecordMeasure for CompositeMeasure {
    fn distance(&self, a: &Record, b: &Record) -> f64 {
        self.aggregate(&self.field_distances(a, b))
    }

    fn is_metric(&self) -> bool {
        // A one-sided missing field sits at distance field_max from every
        // value, which only respects the triangle inequality when no real
        // comparison can exceed it.
        self.base.is_metric()
            && self.config.missing == MissingFieldPolicy::Maximum
            && self.clipped_bound() <= self.field_max
    }

    fn max_distance_is_one(&self) -> bool {
        match self.config.aggregation {
            Aggregation::NormalisedMean { .. } => true,
            Aggregation::Sum => self.fields1.len() == 1 && self.fields_bounded_by_one(),
            _ => self.fields_bounded_by_one(),
        }
    }

    fn describe(&self) -> String {
        format!(
            "{} of {} over fields {:?} / {:?}",
            self.config.aggregation.name(),
            self.base.name(),
            self.fields1,
            self.fields2
        )
    }
}
