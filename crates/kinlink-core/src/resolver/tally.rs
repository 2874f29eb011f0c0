use serde::{Deserialize, Serialize};

/// Outcome counts for one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTally {
    pub triangles_examined: u64,
    /// Two corners were the same record.
    pub degenerate: u64,
    /// The closing edge already existed.
    pub already_consistent: u64,
    /// An edge of the triangle had been cut earlier in the pass.
    pub stale: u64,
    pub implausible: u64,
    pub established_low_distance: u64,
    pub established_shared_support: u64,
    pub edges_cut: u64,
    pub left_as_is: u64,
    pub clusters_examined: u64,
    pub clusters_split: u64,
    pub cluster_edges_cut: u64,
}

impl ResolutionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn established(&self) -> u64 {
        self.established_low_distance + self.established_shared_support
    }

    pub fn merge(&mut self, other: &ResolutionTally) {
        self.triangles_examined += other.triangles_examined;
        self.degenerate += other.degenerate;
        self.already_consistent += other.already_consistent;
        self.stale += other.stale;
        self.implausible += other.implausible;
        self.established_low_distance += other.established_low_distance;
        self.established_shared_support += other.established_shared_support;
        self.edges_cut += other.edges_cut;
        self.left_as_is += other.left_as_is;
        self.clusters_examined += other.clusters_examined;
        self.clusters_split += other.clusters_split;
        self.cluster_edges_cut += other.cluster_edges_cut;
    }

    /// Get a summary string for logging
    pub fn summary(&self) -> String {
        format!(
            "Resolution: examined {} triangles ({} degenerate, {} consistent, {} stale, {} implausible), \
             established {} (low distance {}, support {}), cut {}, left {} | clusters: {} examined, {} split, {} edges cut",
            self.triangles_examined,
            self.degenerate,
            self.already_consistent,
            self.stale,
            self.implausible,
            self.established(),
            self.established_low_distance,
            self.established_shared_support,
            self.edges_cut,
            self.left_as_is,
            self.clusters_examined,
            self.clusters_split,
            self.cluster_edges_cut
        )
    }
}
