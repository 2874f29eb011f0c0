//! Open-triangle repair of a link graph.

mod cluster;
mod clustering;
mod config;
mod plausibility;
mod tally;
mod triangle;

pub use cluster::{ClusterRepair, Neighbourhood};
pub use clustering::{ClusterIx, ClusterNode, Dendrogram};
pub use config::{ClusterRepairConfig, CutPolicy, TriangleResolverConfig};
pub use plausibility::{BirthYearSpread, TriplePlausibility};
pub use tally::ResolutionTally;
pub use triangle::{Establishment, Resolution, TriangleResolver};

#[cfg(test)]
mod tests;
