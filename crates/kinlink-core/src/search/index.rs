use crate::error::{LinkageError, Result};
use crate::measure::RecordMeasure;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A stored record and its distance to the query.
#[derive(Debug, Clone)]
pub struct DataDistance {
    pub record: Arc<Record>,
    pub distance: f64,
}

/// Range search over an indexed record collection.
pub trait SearchStructure: Send {
    /// All indexed records within `radius` of `query`, nearest first.
    /// Ties keep insertion order.
    fn find_within_threshold(&self, query: &Record, radius: f64) -> Result<Vec<DataDistance>>;

    /// Number of indexed records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release threads and tables. Later queries fail with `Terminated`.
    /// Calling it twice is harmless.
    fn terminate(&mut self);

    fn stats(&self) -> SearchStats;
}

/// Builds a search structure over one collection.
pub trait SearchStructureFactory: Send + Sync {
    type Structure: SearchStructure;

    fn build(
        &self,
        measure: Arc<dyn RecordMeasure>,
        records: Vec<Arc<Record>>,
    ) -> Result<Self::Structure>;
}

/// Query statistics, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub queries: u64,
    pub distance_calls: u64,
    /// Records excluded without an exact distance evaluation.
    pub pruned: u64,
}

impl SearchStats {
    pub fn summary(&self) -> String {
        format!(
            "Search: {} queries, {} distance calls, {} records pruned",
            self.queries, self.distance_calls, self.pruned
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct SearchCounters {
    queries: AtomicU64,
    distance_calls: AtomicU64,
    pruned: AtomicU64,
}

impl SearchCounters {
    pub(crate) fn record_query(&self, distance_calls: usize, pruned: usize) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.distance_calls
            .fetch_add(distance_calls as u64, Ordering::Relaxed);
        self.pruned.fetch_add(pruned as u64, Ordering::Relaxed);
    }

    pub(crate) fn add_distance_calls(&self, n: usize) {
        self.distance_calls.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SearchStats {
        SearchStats {
            queries: self.queries.load(Ordering::Relaxed),
            distance_calls: self.distance_calls.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
        }
    }
}

pub(crate) fn check_radius(radius: f64) -> Result<()> {
    if radius.is_nan() || radius < 0.0 {
        return Err(LinkageError::Validation(format!(
            "search radius must be >= 0, got {}",
            radius
        )));
    }
    Ok(())
}

/// Stable sort by ascending distance.
pub(crate) fn sort_by_distance(results: &mut [DataDistance]) {
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

/// Linear scan. Exact for any measure; used as the reference behaviour and
/// for small collections.
pub struct BruteForceSearch {
    measure: Arc<dyn RecordMeasure>,
    records: Vec<Arc<Record>>,
    counters: SearchCounters,
    terminated: bool,
}

impl BruteForceSearch {
    pub fn new(measure: Arc<dyn RecordMeasure>, records: Vec<Arc<Record>>) -> Self {
        Self {
            measure,
            records,
            counters: SearchCounters::default(),
            terminated: false,
        }
    }
}

impl SearchStructure for BruteForceSearch {
    fn find_within_threshold(&self, query: &Record, radius: f64) -> Result<Vec<DataDistance>> {
        if self.terminated {
            return Err(LinkageError::Terminated);
        }
        check_radius(radius)?;

        let mut results: Vec<DataDistance> = self
            .records
            .iter()
            .filter_map(|r| {
                let distance = self.measure.distance(r, query);
                (distance <= radius).then(|| DataDistance {
                    record: r.clone(),
                    distance,
                })
            })
            .collect();
        sort_by_distance(&mut results);

        self.counters.record_query(self.records.len(), 0);
        Ok(results)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn terminate(&mut self) {
        if !self.terminated {
            self.terminated = true;
            self.records.clear();
            log::debug!("{}", self.counters.snapshot().summary());
        }
    }

    fn stats(&self) -> SearchStats {
        self.counters.snapshot()
    }
}

/// Factory for [`BruteForceSearch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceSearchFactory;

impl SearchStructureFactory for BruteForceSearchFactory {
    type Structure = BruteForceSearch;

    fn build(
        &self,
        measure: Arc<dyn RecordMeasure>,
        records: Vec<Arc<Record>>,
    ) -> Result<BruteForceSearch> {
        Ok(BruteForceSearch::new(measure, records))
    }
}
