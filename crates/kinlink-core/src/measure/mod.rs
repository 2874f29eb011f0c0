//! Record measures: per-field string distances combined into one number.
//!
//! - [`StringMeasure`] primitives (edit distance, bigram overlap, equality)
//! - [`CompositeMeasure`] over one or two field selector lists
//! - [`MeasureConfig`] for cut-offs, missing-field policy and aggregation

mod base;
mod composite;
mod config;


pub use base::{Exact, Jaccard, Levenshtein, SorensenDice, StringMeasure};
pub use composite::{CompositeMeasure, RecordMeasure};
pub use config::{Aggregation, MeasureConfig, MissingFieldPolicy};
