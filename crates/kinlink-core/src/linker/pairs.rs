use crate::error::Result;
use crate::types::RecordPair;

/// A resumable position in a candidate-pair sequence.
///
/// The iterator drives a cursor as: load the pair at the current position,
/// advance past it, then keep it only if `matches` accepts. Nothing is
/// buffered beyond the single pair being examined.
pub trait PairCursor {
    /// The pair at the current position, or `None` when exhausted.
    fn load_next_pair(&mut self) -> Result<Option<RecordPair>>;

    /// Move past the pair just loaded.
    fn advance_indices(&mut self) -> Result<()>;

    fn matches(&self, pair: &RecordPair) -> bool;
}

/// Lazy sequence of matching pairs over any [`PairCursor`].
///
/// An error from the cursor is yielded once and ends the sequence.
pub struct RecordPairIterator<C: PairCursor> {
    cursor: C,
    peeked: Option<RecordPair>,
    finished: bool,
    loaded: u64,
    matched: u64,
}

impl<C: PairCursor> RecordPairIterator<C> {
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            peeked: None,
            finished: false,
            loaded: 0,
            matched: 0,
        }
    }

    /// True when another matching pair exists. Finding out may evaluate
    /// any number of candidates.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.peeked.is_none() && !self.finished {
            match self.next_matching_pair() {
                Ok(Some(pair)) => self.peeked = Some(pair),
                Ok(None) => self.finished = true,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }
        Ok(self.peeked.is_some())
    }

    /// Candidates loaded so far.
    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    /// Candidates accepted by the cursor so far.
    pub fn matched(&self) -> u64 {
        self.matched
    }

    fn next_matching_pair(&mut self) -> Result<Option<RecordPair>> {
        loop {
            let Some(pair) = self.cursor.load_next_pair()? else {
                return Ok(None);
            };
            self.loaded += 1;
            self.cursor.advance_indices()?;
            if self.cursor.matches(&pair) {
                self.matched += 1;
                return Ok(Some(pair));
            }
        }
    }
}

impl<C: PairCursor> Iterator for RecordPairIterator<C> {
    type Item = Result<RecordPair>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => self.peeked.take().map(Ok),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
