use super::pairs::PairCursor;
use super::progress::Progress;
use super::strategy::CandidateStrategy;
use crate::error::Result;
use crate::measure::RecordMeasure;
use crate::types::{RecordPair, RecordSet};
use std::sync::Arc;

/// Full cross product `set1 × set2`, evaluated one pair at a time.
pub struct BruteForceCursor {
    measure: Arc<dyn RecordMeasure>,
    set1: RecordSet,
    set2: RecordSet,
    same: bool,
    outer: usize,
    inner: usize,
    threshold: f64,
    progress: Progress,
}

impl BruteForceCursor {
    pub fn new(
        measure: Arc<dyn RecordMeasure>,
        set1: RecordSet,
        set2: RecordSet,
        threshold: f64,
        progress: Progress,
    ) -> Self {
        let same = set1.is_same_collection(&set2);
        let mut cursor = Self {
            measure,
            set1,
            set2,
            same,
            outer: 0,
            inner: 0,
            threshold,
            progress,
        };
        cursor.settle();
        cursor
    }

    fn exhausted(&self) -> bool {
        self.outer >= self.set1.len()
    }

    fn advance_inner(&mut self) {
        self.inner += 1;
    }

    fn advance_outer(&mut self) {
        self.outer += 1;
        self.inner = 0;
    }

    /// Move forward until the position names a real, non-self pair.
    fn settle(&mut self) {
        while !self.exhausted() {
            if self.inner >= self.set2.len() {
                self.advance_outer();
            } else if self.same && self.is_self_pair() {
                self.advance_inner();
            } else {
                break;
            }
        }
    }

    fn is_self_pair(&self) -> bool {
        match (self.set1.at(self.outer), self.set2.at(self.inner)) {
            (Some(a), Some(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl PairCursor for BruteForceCursor {
    fn load_next_pair(&mut self) -> Result<Option<RecordPair>> {
        let (Some(a), Some(b)) = (self.set1.at(self.outer), self.set2.at(self.inner)) else {
            return Ok(None);
        };
        let distance = self.measure.distance(a, b);
        self.progress.tick();
        Ok(Some(RecordPair::new(a.clone(), b.clone(), distance)))
    }

    fn advance_indices(&mut self) -> Result<()> {
        self.advance_inner();
        self.settle();
        Ok(())
    }

    fn matches(&self, pair: &RecordPair) -> bool {
        pair.distance <= self.threshold
    }
}

/// Candidate generation by exhaustive comparison.
pub struct BruteForceStrategy {
    measure: Arc<dyn RecordMeasure>,
}

impl BruteForceStrategy {
    /// `measure` compares a set1 record (first) with a set2 record (second).
    pub fn new(measure: Arc<dyn RecordMeasure>) -> Self {
        Self { measure }
    }
}

impl CandidateStrategy for BruteForceStrategy {
    type Cursor<'a> = BruteForceCursor;

    fn name(&self) -> &'static str {
        "brute force"
    }

    fn prepare(&mut self, _set1: &RecordSet, _set2: &RecordSet) -> Result<()> {
        Ok(())
    }

    fn cursor<'a>(
        &'a self,
        set1: &RecordSet,
        set2: &RecordSet,
        threshold: f64,
        progress_updates: usize,
    ) -> Result<Self::Cursor<'a>> {
        let total = set1.len() as u64 * set2.len() as u64;
        Ok(BruteForceCursor::new(
            self.measure.clone(),
            set1.clone(),
            set2.clone(),
            threshold,
            Progress::new("Brute-force linkage", total, progress_updates),
        ))
    }

    fn terminate(&mut self) {}
}
