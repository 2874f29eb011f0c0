use crate::kinds::birth;
use crate::types::{RecordId, RecordKind, RecordSet};

/// A domain check on the three records of an open triangle.
pub trait TriplePlausibility: Send + Sync {
    fn is_plausible(&self, x: RecordId, y: RecordId, z: RecordId) -> bool;
}

impl<F> TriplePlausibility for F
where
    F: Fn(RecordId, RecordId, RecordId) -> bool + Send + Sync,
{
    fn is_plausible(&self, x: RecordId, y: RecordId, z: RecordId) -> bool {
        self(x, y, z)
    }
}

/// Siblings are born within `max_spread` years of each other.
///
/// Only birth records with a parseable year count; anything else is
/// treated as unknown and cannot make the triple implausible.
pub struct BirthYearSpread {
    records: RecordSet,
    max_spread: i32,
}

impl BirthYearSpread {
    pub fn new(records: RecordSet, max_spread: i32) -> Self {
        Self { records, max_spread }
    }

    fn year(&self, id: RecordId) -> Option<i32> {
        let record = self.records.get(id)?;
        match record.kind() {
            RecordKind::Birth => record.number(birth::BIRTH_YEAR),
            _ => None,
        }
    }
}

impl TriplePlausibility for BirthYearSpread {
    fn is_plausible(&self, x: RecordId, y: RecordId, z: RecordId) -> bool {
        let years: Vec<i32> = [x, y, z].into_iter().filter_map(|id| self.year(id)).collect();
        match (years.iter().min(), years.iter().max()) {
            (Some(lo), Some(hi)) => hi - lo <= self.max_spread,
            _ => true,
        }
    }
}
