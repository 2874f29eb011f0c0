use crate::error::{LinkageError, Result};
use crate::measure::CompositeMeasure;
use crate::types::{Record, RecordKind};

/// Rewrites a record of one kind into the field layout of another.
///
/// `from_fields[i]` of the source is copied to `to_fields[i]` of the result;
/// every other target field is left empty. The id is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    from_kind: RecordKind,
    from_fields: Vec<usize>,
    to_kind: RecordKind,
    to_fields: Vec<usize>,
}

impl FieldMapping {
    pub fn new(
        from_kind: RecordKind,
        from_fields: Vec<usize>,
        to_kind: RecordKind,
        to_fields: Vec<usize>,
    ) -> Result<Self> {
        if from_fields.len() != to_fields.len() {
            return Err(LinkageError::ShapeMismatch {
                left: from_fields.len(),
                right: to_fields.len(),
            });
        }
        from_kind.check_fields(&from_fields)?;
        to_kind.check_fields(&to_fields)?;
        Ok(Self {
            from_kind,
            from_fields,
            to_kind,
            to_fields,
        })
    }

    /// Map query records (the measure's second selector) onto stored
    /// records (its first selector).
    pub fn from_measure(measure: &CompositeMeasure, stored: RecordKind, query: RecordKind) -> Result<Self> {
        Self::new(
            query,
            measure.fields2().to_vec(),
            stored,
            measure.fields1().to_vec(),
        )
    }

    pub fn from_kind(&self) -> RecordKind {
        self.from_kind
    }

    pub fn to_kind(&self) -> RecordKind {
        self.to_kind
    }

    pub fn convert(&self, record: &Record) -> Result<Record> {
        if record.kind() != self.from_kind {
            return Err(LinkageError::Validation(format!(
                "mapping expects {} records, got {} record {}",
                self.from_kind,
                record.kind(),
                record.id()
            )));
        }
        let values: Vec<(usize, &str)> = self
            .to_fields
            .iter()
            .zip(&self.from_fields)
            .map(|(&to, &from)| (to, record.field(from)))
            .collect();
        Record::with_fields(record.id(), self.to_kind, &values)
    }
}
