use crate::error::{LinkageError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the pivot-table search structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of reference points (pivots) whose distances to every record
    /// are precomputed. More pivots prune better but cost memory and build
    /// time. Default: 70
    pub reference_points: usize,

    /// Fewest distinct pivots expected; below this a warning is logged
    /// since pruning will be weak. Default: 20
    pub min_reference_points: usize,

    /// Seed for pivot selection, so builds are reproducible.
    /// Default: 34258723425
    pub seed: u64,

    /// Worker threads for table construction and candidate verification.
    /// 0 lets rayon pick. Default: 0
    pub threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            reference_points: 70,
            min_reference_points: 20,
            seed: 34_258_723_425,
            threads: 0,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_points(mut self, count: usize) -> Self {
        self.reference_points = count;
        self
    }

    pub fn with_min_reference_points(mut self, count: usize) -> Self {
        self.min_reference_points = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.reference_points == 0 {
            return Err(LinkageError::Validation(
                "reference_points must be > 0".into(),
            ));
        }
        if self.min_reference_points > self.reference_points {
            return Err(LinkageError::Validation(
                "min_reference_points must not exceed reference_points".into(),
            ));
        }
        Ok(())
    }
}
