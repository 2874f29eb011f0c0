use super::mapping::FieldMapping;
use super::pairs::PairCursor;
use super::progress::Progress;
use super::strategy::CandidateStrategy;
use crate::error::{LinkageError, Result};
use crate::measure::RecordMeasure;
use crate::search::{DataDistance, SearchStructure, SearchStructureFactory};
use crate::types::{Record, RecordPair, RecordSet};
use std::sync::Arc;

/// One range query per set2 record against an index over set1.
pub struct SearchCursor<'a, T: SearchStructure> {
    index: &'a T,
    mapping: Option<&'a FieldMapping>,
    queries: RecordSet,
    same: bool,
    threshold: f64,
    next_query: usize,
    current_query: Option<Arc<Record>>,
    results: Vec<DataDistance>,
    next_result: usize,
    progress: Progress,
}

impl<'a, T: SearchStructure> SearchCursor<'a, T> {
    fn load_next_query(&mut self) -> Result<bool> {
        let Some(query) = self.queries.at(self.next_query).cloned() else {
            return Ok(false);
        };
        self.next_query += 1;
        self.progress.tick();

        self.results = match self.mapping {
            Some(mapping) => {
                let converted = mapping.convert(&query)?;
                self.index.find_within_threshold(&converted, self.threshold)?
            }
            None => self.index.find_within_threshold(&query, self.threshold)?,
        };
        self.next_result = 0;
        self.current_query = Some(query);
        Ok(true)
    }
}

impl<'a, T: SearchStructure> PairCursor for SearchCursor<'a, T> {
    fn load_next_pair(&mut self) -> Result<Option<RecordPair>> {
        while self.next_result >= self.results.len() {
            if !self.load_next_query()? {
                return Ok(None);
            }
        }
        let (Some(query), Some(hit)) = (&self.current_query, self.results.get(self.next_result)) else {
            return Ok(None);
        };
        Ok(Some(RecordPair::new(
            hit.record.clone(),
            query.clone(),
            hit.distance,
        )))
    }

    fn advance_indices(&mut self) -> Result<()> {
        self.next_result += 1;
        Ok(())
    }

    fn matches(&self, pair: &RecordPair) -> bool {
        !(self.same && pair.record1.id() == pair.record2.id())
    }
}

/// Candidate generation through a search structure built over set1.
///
/// `measure` must compare two set1-shaped records. When set2 has a
/// different shape, a [`FieldMapping`] converts each query first.
pub struct SimilaritySearchStrategy<F: SearchStructureFactory> {
    factory: F,
    measure: Arc<dyn RecordMeasure>,
    mapping: Option<FieldMapping>,
    index: Option<F::Structure>,
}

impl<F: SearchStructureFactory> SimilaritySearchStrategy<F> {
    pub fn new(factory: F, measure: Arc<dyn RecordMeasure>) -> Self {
        Self {
            factory,
            measure,
            mapping: None,
            index: None,
        }
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn index(&self) -> Option<&F::Structure> {
        self.index.as_ref()
    }
}

impl<F: SearchStructureFactory> CandidateStrategy for SimilaritySearchStrategy<F> {
    type Cursor<'a> = SearchCursor<'a, F::Structure> where Self: 'a;

    fn name(&self) -> &'static str {
        "similarity search"
    }

    fn prepare(&mut self, set1: &RecordSet, _set2: &RecordSet) -> Result<()> {
        self.terminate();
        log::info!("Indexing {} records with {}", set1.len(), self.measure.describe());
        self.index = Some(self.factory.build(self.measure.clone(), set1.records().to_vec())?);
        Ok(())
    }

    fn cursor<'a>(
        &'a self,
        set1: &RecordSet,
        set2: &RecordSet,
        threshold: f64,
        progress_updates: usize,
    ) -> Result<Self::Cursor<'a>> {
        let index = self.index.as_ref().ok_or(LinkageError::Terminated)?;
        Ok(SearchCursor {
            index,
            mapping: self.mapping.as_ref(),
            queries: set2.clone(),
            same: set1.is_same_collection(set2),
            threshold,
            next_query: 0,
            current_query: None,
            results: Vec::new(),
            next_result: 0,
            progress: Progress::new("Search linkage", set2.len() as u64, progress_updates),
        })
    }

    fn terminate(&mut self) {
        if let Some(mut index) = self.index.take() {
            index.terminate();
        }
    }
}
