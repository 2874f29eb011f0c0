use super::pairs::PairCursor;
use crate::error::Result;
use crate::types::RecordSet;

/// How a linker enumerates candidate pairs.
pub trait CandidateStrategy {
    type Cursor<'a>: PairCursor
    where
        Self: 'a;

    fn name(&self) -> &'static str;

    /// Called once per `add_records`; may build indexes over `set1`.
    fn prepare(&mut self, set1: &RecordSet, set2: &RecordSet) -> Result<()>;

    /// A fresh cursor over candidates within `threshold`.
    fn cursor<'a>(
        &'a self,
        set1: &RecordSet,
        set2: &RecordSet,
        threshold: f64,
        progress_updates: usize,
    ) -> Result<Self::Cursor<'a>>;

    /// Release whatever `prepare` acquired.
    fn terminate(&mut self);
}
