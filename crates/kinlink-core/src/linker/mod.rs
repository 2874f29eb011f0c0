//! Linker: candidate pairs in, links out.
//!
//! The linker:
//! - Enumerates candidate pairs lazily through a [`PairCursor`]
//! - Uses either the full cross product or range queries against a search
//!   structure built over the first collection
//! - Keeps pairs within the distance threshold that pass a viability veto
//! - Never links a record to itself when both sides are the same collection

mod brute_force;
mod config;
mod engine;
mod mapping;
mod metrics;
mod pairs;
mod progress;
mod similarity;
mod strategy;
mod viability;


pub use brute_force::{BruteForceCursor, BruteForceStrategy};
pub use config::LinkerConfig;
pub use engine::{Linker, Links};
pub use mapping::FieldMapping;
pub use metrics::LinkageMetrics;
pub use pairs::{PairCursor, RecordPairIterator};
pub use progress::Progress;
pub use similarity::{SearchCursor, SimilaritySearchStrategy};
pub use strategy::CandidateStrategy;
pub use viability::{
    BirthDeathIdentity, LinkViability, LinkageConstraints, ParentAgeAtBirth, SiblingAgeGap,
};
