use crate::error::{LinkageError, Result};
use crate::kinds::{birth, death};
use crate::types::{Record, RecordKind, RecordPair};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A domain veto applied after the distance threshold.
///
/// Implementations must treat unparseable or missing values as viable: a
/// malformed year is not evidence against a link.
pub trait LinkViability: Send + Sync {
    fn is_viable(&self, pair: &RecordPair) -> bool;
}

impl<F> LinkViability for F
where
    F: Fn(&RecordPair) -> bool + Send + Sync,
{
    fn is_viable(&self, pair: &RecordPair) -> bool {
        self(pair)
    }
}

/// Plausibility limits for family relationships, in years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkageConstraints {
    /// Largest birth-year gap between siblings. Default: 40
    pub max_sibling_age_diff: i32,

    /// Default: 120
    pub max_age_at_death: i32,

    /// Tolerated disagreement between a recorded age or date of birth and
    /// the one implied by a linked birth. Default: 4
    pub max_allowable_age_discrepancy: i32,

    /// Default: 15
    pub min_parent_age_at_birth: i32,

    /// Default: 50
    pub max_parent_age_at_birth: i32,
}

impl Default for LinkageConstraints {
    fn default() -> Self {
        Self {
            max_sibling_age_diff: 40,
            max_age_at_death: 120,
            max_allowable_age_discrepancy: 4,
            min_parent_age_at_birth: 15,
            max_parent_age_at_birth: 50,
        }
    }
}

impl LinkageConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sibling_age_diff(mut self, years: i32) -> Self {
        self.max_sibling_age_diff = years;
        self
    }

    pub fn with_max_age_at_death(mut self, years: i32) -> Self {
        self.max_age_at_death = years;
        self
    }

    pub fn with_max_allowable_age_discrepancy(mut self, years: i32) -> Self {
        self.max_allowable_age_discrepancy = years;
        self
    }

    pub fn with_parent_age_at_birth(mut self, min: i32, max: i32) -> Self {
        self.min_parent_age_at_birth = min;
        self.max_parent_age_at_birth = max;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_sibling_age_diff < 0
            || self.max_age_at_death < 0
            || self.max_allowable_age_discrepancy < 0
        {
            return Err(LinkageError::Validation(
                "age limits must be non-negative".into(),
            ));
        }
        if self.min_parent_age_at_birth > self.max_parent_age_at_birth {
            return Err(LinkageError::Validation(
                "min_parent_age_at_birth must not exceed max_parent_age_at_birth".into(),
            ));
        }
        Ok(())
    }
}

/// Two births whose years are too far apart cannot be siblings.
#[derive(Debug, Clone)]
pub struct SiblingAgeGap {
    pub max_age_diff: i32,
}

impl SiblingAgeGap {
    pub fn new(constraints: &LinkageConstraints) -> Self {
        Self {
            max_age_diff: constraints.max_sibling_age_diff,
        }
    }
}

impl LinkViability for SiblingAgeGap {
    fn is_viable(&self, pair: &RecordPair) -> bool {
        match (birth_year(&pair.record1), birth_year(&pair.record2)) {
            (Some(a), Some(b)) => (a - b).abs() <= self.max_age_diff,
            _ => true,
        }
    }
}

/// A birth and a death of the same person: the implied age at death must
/// be plausible and agree with whatever the death record states.
#[derive(Debug, Clone)]
pub struct BirthDeathIdentity {
    pub max_age_at_death: i32,
    pub max_discrepancy: i32,
}

impl BirthDeathIdentity {
    pub fn new(constraints: &LinkageConstraints) -> Self {
        Self {
            max_age_at_death: constraints.max_age_at_death,
            max_discrepancy: constraints.max_allowable_age_discrepancy,
        }
    }

    fn check(&self, birth_record: &Record, death_record: &Record) -> bool {
        let born = birth_date(birth_record);
        let died = event_date(
            death_record,
            death::DEATH_DAY,
            death::DEATH_MONTH,
            death::DEATH_YEAR,
        );

        if let Some(age) = years_between(born, died) {
            if age < 0 || age > self.max_age_at_death {
                return false;
            }
            if let Some(stated) = death_record.number(death::AGE_AT_DEATH) {
                if (stated - age).abs() > self.max_discrepancy {
                    return false;
                }
            }
        }

        if let (Some(year), Some(stated)) = (born.year(), stated_date_of_birth(death_record)) {
            if (stated.year() - year).abs() > self.max_discrepancy {
                return false;
            }
        }
        true
    }
}

impl LinkViability for BirthDeathIdentity {
    fn is_viable(&self, pair: &RecordPair) -> bool {
        match (pair.record1.kind(), pair.record2.kind()) {
            (RecordKind::Birth, RecordKind::Death) => self.check(&pair.record1, &pair.record2),
            (RecordKind::Death, RecordKind::Birth) => self.check(&pair.record2, &pair.record1),
            _ => true,
        }
    }
}

/// `record1` is the parent's own birth, `record2` the child's birth.
#[derive(Debug, Clone)]
pub struct ParentAgeAtBirth {
    pub min_age: i32,
    pub max_age: i32,
}

impl ParentAgeAtBirth {
    pub fn new(constraints: &LinkageConstraints) -> Self {
        Self {
            min_age: constraints.min_parent_age_at_birth,
            max_age: constraints.max_parent_age_at_birth,
        }
    }
}

impl LinkViability for ParentAgeAtBirth {
    fn is_viable(&self, pair: &RecordPair) -> bool {
        match years_between(birth_date(&pair.record1), birth_date(&pair.record2)) {
            Some(age) => (self.min_age..=self.max_age).contains(&age),
            None => true,
        }
    }
}

/// A date known to at least year precision.
#[derive(Debug, Clone, Copy)]
enum PartialDate {
    Full(NaiveDate),
    Year(i32),
    Unknown,
}

impl PartialDate {
    fn year(self) -> Option<i32> {
        match self {
            PartialDate::Full(d) => Some(d.year()),
            PartialDate::Year(y) => Some(y),
            PartialDate::Unknown => None,
        }
    }
}

fn event_date(record: &Record, day: usize, month: usize, year: usize) -> PartialDate {
    let Some(y) = record.number(year) else {
        return PartialDate::Unknown;
    };
    let full = match (record.number(month), record.number(day)) {
        (Some(m), Some(d)) if m > 0 && d > 0 => NaiveDate::from_ymd_opt(y, m as u32, d as u32),
        _ => None,
    };
    full.map_or(PartialDate::Year(y), PartialDate::Full)
}

fn birth_date(record: &Record) -> PartialDate {
    match record.kind() {
        RecordKind::Birth => event_date(record, birth::BIRTH_DAY, birth::BIRTH_MONTH, birth::BIRTH_YEAR),
        _ => PartialDate::Unknown,
    }
}

fn birth_year(record: &Record) -> Option<i32> {
    birth_date(record).year()
}

fn stated_date_of_birth(death_record: &Record) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(death_record.field(death::DATE_OF_BIRTH).trim(), "%d/%m/%Y").ok()
}

/// Completed years from `from` to `to`; year arithmetic when either side
/// lacks a day and month.
fn years_between(from: PartialDate, to: PartialDate) -> Option<i32> {
    match (from, to) {
        (PartialDate::Full(a), PartialDate::Full(b)) => {
            let mut years = b.year() - a.year();
            if (b.month(), b.day()) < (a.month(), a.day()) {
                years -= 1;
            }
            Some(years)
        }
        _ => Some(to.year()? - from.year()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn birth(id: u64, day: &str, month: &str, year: &str) -> Arc<Record> {
        Arc::new(
            Record::with_fields(
                id,
                RecordKind::Birth,
                &[(birth::BIRTH_DAY, day), (birth::BIRTH_MONTH, month), (birth::BIRTH_YEAR, year)],
            )
            .unwrap(),
        )
    }

    fn death(id: u64, year: &str, age: &str, dob: &str) -> Arc<Record> {
        Arc::new(
            Record::with_fields(
                id,
                RecordKind::Death,
                &[
                    (death::DEATH_DAY, "1"),
                    (death::DEATH_MONTH, "6"),
                    (death::DEATH_YEAR, year),
                    (death::AGE_AT_DEATH, age),
                    (death::DATE_OF_BIRTH, dob),
                ],
            )
            .unwrap(),
        )
    }

    fn pair(a: Arc<Record>, b: Arc<Record>) -> RecordPair {
        RecordPair::new(a, b, 0.0)
    }

    #[test]
    fn test_default_constraints() {
        let c = LinkageConstraints::default();
        assert_eq!(c.max_sibling_age_diff, 40);
        assert_eq!(c.max_age_at_death, 120);
        assert_eq!(c.max_allowable_age_discrepancy, 4);
        assert_eq!((c.min_parent_age_at_birth, c.max_parent_age_at_birth), (15, 50));
        assert!(c.validate().is_ok());
        assert!(c.with_parent_age_at_birth(50, 15).validate().is_err());
    }

    #[test]
    fn test_sibling_age_gap() {
        let v = SiblingAgeGap::new(&LinkageConstraints::default());
        assert!(v.is_viable(&pair(birth(1, "1", "1", "1850"), birth(2, "1", "1", "1890"))));
        assert!(!v.is_viable(&pair(birth(1, "1", "1", "1850"), birth(2, "1", "1", "1891"))));
    }

    #[test]
    fn test_malformed_years_are_viable() {
        let v = SiblingAgeGap::new(&LinkageConstraints::default());
        assert!(v.is_viable(&pair(birth(1, "", "", "18x0"), birth(2, "", "", "1990"))));
        assert!(v.is_viable(&pair(birth(1, "", "", ""), birth(2, "", "", "1990"))));
    }

    #[test]
    fn test_birth_death_identity() {
        let v = BirthDeathIdentity::new(&LinkageConstraints::default());
        let b = birth(1, "10", "3", "1850");

        assert!(v.is_viable(&pair(b.clone(), death(2, "1900", "50", ""))));
        // either order
        assert!(v.is_viable(&pair(death(2, "1900", "50", ""), b.clone())));
        // died before born
        assert!(!v.is_viable(&pair(b.clone(), death(3, "1840", "", ""))));
        // too old
        assert!(!v.is_viable(&pair(b.clone(), death(4, "1980", "", ""))));
        // stated age disagrees by more than 4
        assert!(!v.is_viable(&pair(b.clone(), death(5, "1900", "40", ""))));
        // stated date of birth disagrees
        assert!(!v.is_viable(&pair(b.clone(), death(6, "1900", "", "10/03/1860"))));
        assert!(v.is_viable(&pair(b.clone(), death(7, "1900", "", "10/03/1852"))));
        // unparseable values do not veto
        assert!(v.is_viable(&pair(b, death(8, "unknown", "fifty", "--/--/----"))));
    }

    #[test]
    fn test_full_dates_count_completed_years() {
        let born = PartialDate::Full(NaiveDate::from_ymd_opt(1850, 6, 2).unwrap());
        let died = PartialDate::Full(NaiveDate::from_ymd_opt(1900, 6, 1).unwrap());
        assert_eq!(years_between(born, died), Some(49));
        assert_eq!(years_between(PartialDate::Year(1850), died), Some(50));
        assert_eq!(years_between(PartialDate::Unknown, died), None);
    }

    #[test]
    fn test_parent_age_at_birth() {
        let v = ParentAgeAtBirth::new(&LinkageConstraints::default());
        assert!(v.is_viable(&pair(birth(1, "", "", "1820"), birth(2, "", "", "1850"))));
        assert!(!v.is_viable(&pair(birth(1, "", "", "1840"), birth(2, "", "", "1850"))));
        assert!(!v.is_viable(&pair(birth(1, "", "", "1790"), birth(2, "", "", "1850"))));
        assert!(v.is_viable(&pair(birth(1, "", "", ""), birth(2, "", "", "1850"))));
    }

    #[test]
    fn test_closures_are_predicates() {
        let v = |p: &RecordPair| p.distance < 1.0;
        assert!(v.is_viable(&pair(birth(1, "", "", ""), birth(2, "", "", ""))));
    }
}
