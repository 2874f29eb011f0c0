use super::config::{validate_threshold, LinkerConfig};
use super::metrics::LinkageMetrics;
use super::pairs::RecordPairIterator;
use super::strategy::CandidateStrategy;
use super::viability::LinkViability;
use crate::error::{LinkageError, Result};
use crate::types::{Link, RecordSet};
use std::sync::Arc;
use std::time::Instant;

/// Turns candidate pairs into links.
///
/// A pair becomes a link when its distance is at most the threshold and the
/// viability predicate, if any, accepts it. The threshold is applied by the
/// strategy's cursor; the viability veto runs here. When both collections are the
/// same, no record is linked to itself; both directions of every other pair
/// are emitted.
pub struct Linker<S: CandidateStrategy> {
    strategy: S,
    config: LinkerConfig,
    viability: Option<Arc<dyn LinkViability>>,
    records: Option<(RecordSet, RecordSet)>,
    terminated: bool,
}

impl<S: CandidateStrategy> Linker<S> {
    pub fn new(strategy: S, config: LinkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            strategy,
            config,
            viability: None,
            records: None,
            terminated: false,
        })
    }

    pub fn with_viability(mut self, viability: impl LinkViability + 'static) -> Self {
        self.viability = Some(Arc::new(viability));
        self
    }

    pub fn with_shared_viability(mut self, viability: Arc<dyn LinkViability>) -> Self {
        self.viability = Some(viability);
        self
    }

    /// Set the collections to link. Pass the same handle twice to link a
    /// collection with itself.
    pub fn add_records(&mut self, set1: RecordSet, set2: RecordSet) -> Result<()> {
        if self.terminated {
            return Err(LinkageError::Terminated);
        }
        log::info!(
            "Linking {} x {} records ({}, threshold {})",
            set1.len(),
            set2.len(),
            self.strategy.name(),
            self.config.threshold
        );
        self.strategy.prepare(&set1, &set2)?;
        self.records = Some((set1, set2));
        Ok(())
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        validate_threshold(threshold)?;
        self.config.threshold = threshold;
        Ok(())
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// A lazy stream of links over the current collections.
    pub fn get_links(&self) -> Result<Links<'_, S>> {
        if self.terminated {
            return Err(LinkageError::Terminated);
        }
        let (set1, set2) = self.records.as_ref().ok_or_else(|| {
            LinkageError::Validation("add_records must be called before get_links".into())
        })?;
        let cursor = self.strategy.cursor(
            set1,
            set2,
            self.config.threshold,
            self.config.progress_updates,
        )?;

        Ok(Links {
            pairs: RecordPairIterator::new(cursor),
            config: &self.config,
            viability: self.viability.as_deref(),
            metrics: LinkageMetrics::new(),
            peeked: None,
            started: None,
            finished: false,
        })
    }

    /// Release the strategy's resources. Idempotent; also run on drop.
    pub fn terminate(&mut self) {
        if !self.terminated {
            self.terminated = true;
            self.strategy.terminate();
            self.records = None;
        }
    }
}

impl<S: CandidateStrategy> Drop for Linker<S> {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Links pulled one at a time from a [`Linker`].
pub struct Links<'a, S: CandidateStrategy + 'a> {
    pairs: RecordPairIterator<S::Cursor<'a>>,
    config: &'a LinkerConfig,
    viability: Option<&'a dyn LinkViability>,
    metrics: LinkageMetrics,
    peeked: Option<Link>,
    started: Option<Instant>,
    finished: bool,
}

impl<'a, S: CandidateStrategy + 'a> Links<'a, S> {
    /// True when `next` will return a link. Finding out may evaluate and
    /// veto any number of candidates; a pending error is returned here
    /// instead of from `next`.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.peeked.is_none() {
            match self.pull() {
                Some(Ok(link)) => self.peeked = Some(link),
                Some(Err(e)) => return Err(e),
                None => {}
            }
        }
        Ok(self.peeked.is_some())
    }

    /// Counts so far; final once the stream is exhausted.
    pub fn metrics(&self) -> LinkageMetrics {
        let mut metrics = self.metrics.clone();
        metrics.set_pair_counts(self.pairs.loaded(), self.pairs.matched());
        if let (false, Some(started)) = (self.finished, self.started) {
            metrics.set_elapsed(started.elapsed());
        }
        metrics
    }

    fn finish(&mut self) {
        if !self.finished {
            self.metrics
                .set_pair_counts(self.pairs.loaded(), self.pairs.matched());
            if let Some(started) = self.started {
                self.metrics.set_elapsed(started.elapsed());
            }
            self.finished = true;
            log::info!("{}", self.metrics.summary());
        }
    }

    /// The next viable link, or the cursor's error.
    fn pull(&mut self) -> Option<Result<Link>> {
        self.started.get_or_insert_with(Instant::now);
        loop {
            let pair = match self.pairs.next() {
                Some(Ok(pair)) => pair,
                Some(Err(e)) => {
                    self.finish();
                    return Some(Err(e));
                }
                None => {
                    self.finish();
                    return None;
                }
            };

            if let Some(viability) = self.viability {
                if !viability.is_viable(&pair) {
                    self.metrics.add_non_viable(1);
                    continue;
                }
            }

            self.metrics.add_links_emitted(1);
            return Some(Ok(Link::new(
                &pair,
                self.config.link_type.as_str(),
                self.config.stored_role.as_str(),
                self.config.query_role.as_str(),
                &self.config.provenance,
            )));
        }
    }
}

impl<'a, S: CandidateStrategy + 'a> Iterator for Links<'a, S> {
    type Item = Result<Link>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.peeked.take() {
            Some(link) => Some(Ok(link)),
            None => self.pull(),
        }
    }
}
