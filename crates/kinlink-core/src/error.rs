use crate::types::RecordId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkageError>;

#[derive(Debug, Error)]
pub enum LinkageError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Field selector lists differ in length: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Field index {index} out of range for {kind} records ({width} fields)")]
    FieldOutOfRange {
        kind: String,
        index: usize,
        width: usize,
    },

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Search structure has been terminated")]
    Terminated,

    #[error("Graph store error during {operation}: {reason}")]
    Store { operation: String, reason: String },
}

impl LinkageError {
    pub fn store(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        LinkageError::Store {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}
