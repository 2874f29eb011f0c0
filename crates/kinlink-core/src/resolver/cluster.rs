use super::clustering::{ClusterIx, Dendrogram};
use super::config::ClusterRepairConfig;
use super::tally::ResolutionTally;
use crate::error::{LinkageError, Result};
use crate::graph::{GraphEdge, LinkGraph, OpenTriangle, TRIANGLE_PROVENANCE};
use crate::measure::RecordMeasure;
use crate::types::{RecordId, RecordSet};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Neighbourhood of an open triangle: every edge on a short walk between
/// its ends, and the records those edges touch.
#[derive(Debug, Clone)]
pub struct Neighbourhood {
    pub records: Vec<RecordId>,
    pub edges: Vec<GraphEdge>,
}

/// Repairs a dense neighbourhood by clustering its records on their true
/// pairwise distances and cutting edges that bridge a loose split.
pub struct ClusterRepair {
    config: ClusterRepairConfig,
    measure: Arc<dyn RecordMeasure>,
    records: RecordSet,
}

impl ClusterRepair {
    pub fn new(
        config: ClusterRepairConfig,
        measure: Arc<dyn RecordMeasure>,
        records: RecordSet,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            measure,
            records,
        })
    }

    pub fn config(&self) -> &ClusterRepairConfig {
        &self.config
    }

    pub fn neighbourhood<G: LinkGraph + ?Sized>(
        &self,
        graph: &G,
        triangle: &OpenTriangle,
        link_type: &str,
    ) -> Result<Neighbourhood> {
        let edges = graph.edges_within_hops(triangle.x, triangle.z, self.config.max_hops, link_type)?;
        let records: BTreeSet<RecordId> = edges.iter().flat_map(|e| [e.a, e.b]).collect();
        Ok(Neighbourhood {
            records: records.into_iter().collect(),
            edges,
        })
    }

    /// Whether `neighbourhood` is large enough for clustering.
    pub fn applies(&self, neighbourhood: &Neighbourhood) -> bool {
        neighbourhood.records.len() >= self.config.neighbourhood_size
    }

    /// Cluster the neighbourhood and cut cross-split edges. Returns the
    /// number of edges removed.
    pub fn repair<G: LinkGraph + ?Sized>(
        &self,
        graph: &mut G,
        neighbourhood: &Neighbourhood,
        link_type: &str,
        tally: &mut ResolutionTally,
    ) -> Result<usize> {
        tally.clusters_examined += 1;

        let ids = &neighbourhood.records;
        let records = ids
            .iter()
            .map(|&id| self.records.get(id).ok_or(LinkageError::RecordNotFound(id)))
            .collect::<Result<Vec<_>>>()?;

        let n = records.len();
        let mut distances = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i + 1..n {
                let d = self.measure.distance(&records[i], &records[j]);
                distances[i][j] = d;
                distances[j][i] = d;
            }
        }
        let dendrogram = Dendrogram::average_linkage(&distances);
        let position: HashMap<RecordId, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut cut = 0;
        let mut stack: Vec<ClusterIx> = dendrogram.root().into_iter().collect();
        while let Some(ix) = stack.pop() {
            let Some(node) = dendrogram.node(ix) else {
                continue;
            };
            let Some((left, right)) = node.children else {
                continue;
            };
            if node.size <= self.config.min_split_size {
                continue;
            }

            if node.distance > self.config.high_threshold
                && (self.is_tight(&dendrogram, left) || self.is_tight(&dendrogram, right))
            {
                let left_side: BTreeSet<usize> = dendrogram.members(left).into_iter().collect();
                let right_side: BTreeSet<usize> = dendrogram.members(right).into_iter().collect();
                let mut split_cuts = 0;
                for edge in &neighbourhood.edges {
                    let (Some(a), Some(b)) = (position.get(&edge.a), position.get(&edge.b)) else {
                        continue;
                    };
                    let crosses = (left_side.contains(a) && right_side.contains(b))
                        || (left_side.contains(b) && right_side.contains(a));
                    if crosses && graph.cut_edge(edge.a, edge.b, link_type, TRIANGLE_PROVENANCE)? {
                        split_cuts += 1;
                    }
                }
                if split_cuts > 0 {
                    log::debug!(
                        "Split cluster of {} at {:.3}: cut {} edges",
                        node.size,
                        node.distance,
                        split_cuts
                    );
                    tally.clusters_split += 1;
                    tally.cluster_edges_cut += split_cuts as u64;
                    cut += split_cuts;
                }
            }

            stack.push(right);
            stack.push(left);
        }
        Ok(cut)
    }

    fn is_tight(&self, dendrogram: &Dendrogram, ix: ClusterIx) -> bool {
        dendrogram
            .node(ix)
            .is_some_and(|n| n.size >= 2 && n.distance < self.config.low_threshold)
    }
}
