use crate::error::{LinkageError, Result};
use crate::kinds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier assigned by the record store.
pub type RecordId = u64;

/// Type alias for link identifiers
pub type LinkId = Uuid;

/// The closed set of record shapes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Birth,
    Death,
    Marriage,
}

impl RecordKind {
    /// Field names, in index order.
    pub fn schema(self) -> &'static [&'static str] {
        match self {
            RecordKind::Birth => kinds::birth::FIELDS,
            RecordKind::Death => kinds::death::FIELDS,
            RecordKind::Marriage => kinds::marriage::FIELDS,
        }
    }

    /// Number of fields every record of this kind carries.
    pub fn width(self) -> usize {
        self.schema().len()
    }

    pub fn field_index(self, name: &str) -> Option<usize> {
        self.schema().iter().position(|f| *f == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Birth => "birth",
            RecordKind::Death => "death",
            RecordKind::Marriage => "marriage",
        }
    }

    /// Reject selector indices outside this kind's schema.
    pub fn check_fields(self, fields: &[usize]) -> Result<()> {
        let width = self.width();
        match fields.iter().find(|&&i| i >= width) {
            Some(&index) => Err(LinkageError::FieldOutOfRange {
                kind: self.as_str().to_string(),
                index,
                width,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable registration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    kind: RecordKind,
    fields: Vec<String>,
}

impl Record {
    /// Build a record, checking the value count against the kind's schema.
    pub fn new(id: RecordId, kind: RecordKind, fields: Vec<String>) -> Result<Self> {
        if fields.len() != kind.width() {
            return Err(LinkageError::Validation(format!(
                "{} record {} has {} fields, expected {}",
                kind,
                id,
                fields.len(),
                kind.width()
            )));
        }
        Ok(Self { id, kind, fields })
    }

    /// A record with every field empty.
    pub fn blank(id: RecordId, kind: RecordKind) -> Self {
        Self {
            id,
            kind,
            fields: vec![String::new(); kind.width()],
        }
    }

    /// A record with only the given fields filled in.
    pub fn with_fields(id: RecordId, kind: RecordKind, values: &[(usize, &str)]) -> Result<Self> {
        let mut record = Self::blank(id, kind);
        for &(index, value) in values {
            let width = kind.width();
            let slot = record.fields.get_mut(index).ok_or_else(|| {
                LinkageError::FieldOutOfRange {
                    kind: kind.as_str().to_string(),
                    index,
                    width,
                }
            })?;
            *slot = value.to_string();
        }
        Ok(record)
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The raw value at `index`; empty when absent.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.field(index).trim().is_empty()
    }

    /// Parse a numeric field (years, ages, days). `None` when empty or malformed.
    pub fn number(&self, index: usize) -> Option<i32> {
        self.field(index).trim().parse().ok()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// A shared, ordered collection of records with an id index.
///
/// Cloning is cheap and preserves identity: two handles refer to the
/// same collection iff they were cloned from one another.
#[derive(Debug, Clone)]
pub struct RecordSet {
    inner: Arc<RecordSetInner>,
}

#[derive(Debug)]
struct RecordSetInner {
    records: Vec<Arc<Record>>,
    by_id: HashMap<RecordId, usize>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self::from_shared(records.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(records: Vec<Arc<Record>>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            by_id.entry(r.id()).or_insert(i);
        }
        Self {
            inner: Arc::new(RecordSetInner { records, by_id }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Arc<Record>> {
        self.inner.by_id.get(&id).map(|&i| &self.inner.records[i])
    }

    pub fn at(&self, index: usize) -> Option<&Arc<Record>> {
        self.inner.records.get(index)
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.inner.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Record>> {
        self.inner.records.iter()
    }

    /// True when both handles point at the same underlying collection.
    pub fn is_same_collection(&self, other: &RecordSet) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A candidate pair with its distance. Never persisted.
#[derive(Debug, Clone)]
pub struct RecordPair {
    /// Record from the first (stored) collection.
    pub record1: Arc<Record>,
    /// Record from the second (query) collection.
    pub record2: Arc<Record>,
    pub distance: f64,
}

impl RecordPair {
    pub fn new(record1: Arc<Record>, record2: Arc<Record>, distance: f64) -> Self {
        Self {
            record1,
            record2,
            distance,
        }
    }

    pub fn ids(&self) -> (RecordId, RecordId) {
        (self.record1.id(), self.record2.id())
    }
}

/// An accepted pair, ready to be handed to a graph store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// Unique identifier. UUIDv7.
    pub id: LinkId,

    pub record1: RecordId,

    /// Role of `record1` in the relationship, e.g. "baby".
    pub role1: String,

    pub record2: RecordId,

    /// Role of `record2`, e.g. "father".
    pub role2: String,

    /// Relationship tag, e.g. "SIBLING".
    pub link_type: String,

    /// Distance at acceptance time.
    pub distance: f64,

    /// 1.0 for links accepted under a threshold.
    pub confidence: f32,

    /// Who proposed the link, with the distance appended.
    pub provenance: String,

    pub created_at: DateTime<Utc>,
}

impl Link {
    pub fn new(
        pair: &RecordPair,
        link_type: impl Into<String>,
        role1: impl Into<String>,
        role2: impl Into<String>,
        provenance: &str,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            record1: pair.record1.id(),
            role1: role1.into(),
            record2: pair.record2.id(),
            role2: role2.into(),
            link_type: link_type.into(),
            distance: pair.distance,
            confidence: 1.0,
            provenance: format!("{}, distance: {}", provenance, pair.distance),
            created_at: Utc::now(),
        }
    }

    /// `(record1, record2)` in emission order.
    pub fn key(&self) -> (RecordId, RecordId) {
        (self.record1, self.record2)
    }

    /// Endpoint pair with the smaller id first.
    pub fn unordered_key(&self) -> (RecordId, RecordId) {
        if self.record1 <= self.record2 {
            (self.record1, self.record2)
        } else {
            (self.record2, self.record1)
        }
    }
}
