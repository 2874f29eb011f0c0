use super::config::SearchConfig;
use super::index::{
    check_radius, sort_by_distance, DataDistance, SearchCounters, SearchStats, SearchStructure,
    SearchStructureFactory,
};
use crate::error::{LinkageError, Result};
use crate::measure::RecordMeasure;
use crate::types::Record;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::Arc;

/// Relative slack on the pivot bound.
const PRUNE_TOLERANCE: f64 = 1e-9;

/// Pivot-table range search.
///
/// Distances from every record to a fixed set of reference points are
/// computed once. For a query `q` and pivot `p`, a record `x` with
/// `|d(q,p) - d(x,p)| > r` cannot lie within `r` of `q` when the measure is
/// a metric, so it is skipped without evaluating `d(q,x)`. Survivors are
/// verified exactly.
///
/// Pruning is only switched on for measures that report `is_metric()`.
/// Otherwise every record is verified, which keeps results identical to a
/// linear scan.
pub struct PivotIndex {
    measure: Arc<dyn RecordMeasure>,
    records: Vec<Arc<Record>>,
    pivots: Vec<usize>,
    /// Row-major: `table[i * pivots.len() + k] = d(records[i], pivots[k])`.
    table: Vec<f64>,
    prune: bool,
    pool: Option<ThreadPool>,
    counters: SearchCounters,
}

impl PivotIndex {
    pub fn new(measure: Arc<dyn RecordMeasure>, records: Vec<Arc<Record>>) -> Result<Self> {
        Self::with_config(measure, records, SearchConfig::default())
    }

    pub fn with_config(
        measure: Arc<dyn RecordMeasure>,
        records: Vec<Arc<Record>>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("pivot-index-{}", i))
            .build()?;

        let prune = measure.is_metric();
        if !prune {
            log::warn!(
                "{} is not a metric; range queries will verify every record",
                measure.describe()
            );
        }

        let counters = SearchCounters::default();
        let pivots = if prune {
            Self::choose_pivots(measure.as_ref(), &records, &config, &counters)
        } else {
            Vec::new()
        };

        let table: Vec<f64> = pool.install(|| {
            records
                .par_iter()
                .flat_map_iter(|r| {
                    pivots
                        .iter()
                        .map(|&p| measure.distance(r, &records[p]))
                        .collect::<Vec<_>>()
                })
                .collect()
        });
        counters.add_distance_calls(records.len() * pivots.len());

        log::info!(
            "Pivot index built: {} records, {} reference points, pruning {}",
            records.len(),
            pivots.len(),
            if prune { "on" } else { "off" }
        );

        Ok(Self {
            measure,
            records,
            pivots,
            table,
            prune,
            pool: Some(pool),
            counters,
        })
    }

    /// Seeded random pivots, skipping records equal by value to one already
    /// chosen (a duplicate pivot prunes nothing extra).
    fn choose_pivots(
        measure: &dyn RecordMeasure,
        records: &[Arc<Record>],
        config: &SearchConfig,
        counters: &SearchCounters,
    ) -> Vec<usize> {
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(config.seed));

        let mut pivots: Vec<usize> = Vec::with_capacity(config.reference_points);
        let mut calls = 0;
        for i in order {
            if pivots.len() == config.reference_points {
                break;
            }
            calls += pivots.len();
            if pivots
                .iter()
                .all(|&p| measure.distance(&records[p], &records[i]) > 0.0)
            {
                pivots.push(i);
            }
        }
        counters.add_distance_calls(calls);

        if pivots.len() < config.min_reference_points && !records.is_empty() {
            log::warn!(
                "Only {} distinct reference points available (wanted at least {})",
                pivots.len(),
                config.min_reference_points
            );
        }
        pivots
    }

    pub fn reference_points(&self) -> usize {
        self.pivots.len()
    }

    pub fn is_pruning(&self) -> bool {
        self.prune
    }

    /// The bound is only trusted when it clears the radius by more than
    /// rounding error; records at exactly `radius` go on to exact checking.
    fn excluded(&self, row: usize, query_distances: &[f64], radius: f64) -> bool {
        let k = self.pivots.len();
        let limit = radius + PRUNE_TOLERANCE * radius.max(1.0);
        self.table[row * k..(row + 1) * k]
            .iter()
            .zip(query_distances)
            .any(|(dx, dq)| (dq - dx).abs() > limit)
    }
}

impl SearchStructure for PivotIndex {
    fn find_within_threshold(&self, query: &Record, radius: f64) -> Result<Vec<DataDistance>> {
        let pool = self.pool.as_ref().ok_or(LinkageError::Terminated)?;
        check_radius(radius)?;

        let query_distances: Vec<f64> = self
            .pivots
            .iter()
            .map(|&p| self.measure.distance(&self.records[p], query))
            .collect();

        let candidates: Vec<usize> = (0..self.records.len())
            .filter(|&i| !(self.prune && self.excluded(i, &query_distances, radius)))
            .collect();

        let mut results: Vec<DataDistance> = pool.install(|| {
            candidates
                .par_iter()
                .filter_map(|&i| {
                    let record = &self.records[i];
                    let distance = self.measure.distance(record, query);
                    (distance <= radius).then(|| DataDistance {
                        record: record.clone(),
                        distance,
                    })
                })
                .collect()
        });
        sort_by_distance(&mut results);

        let pruned = self.records.len() - candidates.len();
        self.counters
            .record_query(self.pivots.len() + candidates.len(), pruned);
        log::debug!(
            "Range query r={}: {} candidates, {} pruned, {} within radius",
            radius,
            candidates.len(),
            pruned,
            results.len()
        );
        Ok(results)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn terminate(&mut self) {
        if let Some(pool) = self.pool.take() {
            drop(pool);
            self.table = Vec::new();
            self.records = Vec::new();
            log::info!("{}", self.counters.snapshot().summary());
        }
    }

    fn stats(&self) -> SearchStats {
        self.counters.snapshot()
    }
}

impl Drop for PivotIndex {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Factory for [`PivotIndex`].
#[derive(Debug, Clone, Default)]
pub struct PivotIndexFactory {
    pub config: SearchConfig,
}

impl PivotIndexFactory {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

impl SearchStructureFactory for PivotIndexFactory {
    type Structure = PivotIndex;

    fn build(&self, measure: Arc<dyn RecordMeasure>, records: Vec<Arc<Record>>) -> Result<PivotIndex> {
        PivotIndex::with_config(measure, records, self.config.clone())
    }
}
