//! Range search over record collections.
//!
//! - [`SearchStructure`]: "all records within r of q", nearest first
//! - [`PivotIndex`]: precomputed reference-point distances with
//!   triangle-inequality pruning for metric measures
//! - [`BruteForceSearch`]: linear scan with the same contract

mod config;
mod index;
mod pivot;


pub use config::SearchConfig;
pub use index::{
    BruteForceSearch, BruteForceSearchFactory, DataDistance, SearchStats, SearchStructure,
    SearchStructureFactory,
};
pub use pivot::{PivotIndex, PivotIndexFactory};
