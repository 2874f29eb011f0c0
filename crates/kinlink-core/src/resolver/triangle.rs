use super::cluster::ClusterRepair;
use super::config::{CutPolicy, TriangleResolverConfig};
use super::plausibility::TriplePlausibility;
use super::tally::ResolutionTally;
use crate::error::Result;
use crate::graph::{GraphEdge, LinkGraph, OpenTriangle, TRIANGLE_PROVENANCE};
use crate::types::RecordId;
use std::sync::Arc;

/// Why a triangle was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Establishment {
    LowDistance,
    SharedNeighbours(usize),
}

/// What happened to one open triangle
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Two corners were the same record.
    Degenerate,
    /// `x - z` was already present.
    AlreadyConsistent,
    /// `x - y` or `y - z` no longer exists.
    Stale,
    /// `x - z` was added.
    Established(Establishment),
    /// These edges were removed.
    Cut(Vec<(RecordId, RecordId)>),
    /// The neighbourhood was clustered; this many edges were removed.
    ClusterRepaired(usize),
    LeftAsIs,
}

/// Repairs open triangles `x - y - z` in a link graph.
///
/// Each triangle is either closed (low combined distance, or `x` and `z`
/// share enough neighbours), cut (high combined distance with no support)
/// or left alone. With cluster repair attached, dense neighbourhoods are
/// handled by clustering instead of the pairwise rules.
pub struct TriangleResolver {
    config: TriangleResolverConfig,
    plausibility: Option<Arc<dyn TriplePlausibility>>,
    cluster: Option<ClusterRepair>,
}

impl TriangleResolver {
    pub fn new(config: TriangleResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            plausibility: None,
            cluster: None,
        })
    }

    pub fn with_plausibility(mut self, plausibility: impl TriplePlausibility + 'static) -> Self {
        self.plausibility = Some(Arc::new(plausibility));
        self
    }

    pub fn with_cluster_repair(mut self, cluster: ClusterRepair) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn config(&self) -> &TriangleResolverConfig {
        &self.config
    }

    /// One pass over the open triangles present when the pass starts.
    pub fn resolve<G: LinkGraph + ?Sized>(&self, graph: &mut G) -> Result<ResolutionTally> {
        let triangles = graph.open_triangles(&self.config.link_type)?;
        log::info!(
            "Resolving {} open {} triangles",
            triangles.len(),
            self.config.link_type
        );

        let mut tally = ResolutionTally::new();
        for triangle in &triangles {
            self.resolve_triangle(graph, triangle, &mut tally)?;
        }
        log::info!("{}", tally.summary());
        Ok(tally)
    }

    pub fn resolve_triangle<G: LinkGraph + ?Sized>(
        &self,
        graph: &mut G,
        triangle: &OpenTriangle,
        tally: &mut ResolutionTally,
    ) -> Result<Resolution> {
        tally.triangles_examined += 1;
        let link_type = self.config.link_type.as_str();
        let OpenTriangle { x, y, z, .. } = *triangle;

        if triangle.is_degenerate() {
            log::debug!("Degenerate triangle ({}, {}, {})", x, y, z);
            tally.degenerate += 1;
            return Ok(Resolution::Degenerate);
        }
        if graph.has_edge(x, z, link_type)? {
            tally.already_consistent += 1;
            return Ok(Resolution::AlreadyConsistent);
        }
        if !graph.has_edge(x, y, link_type)? || !graph.has_edge(y, z, link_type)? {
            tally.stale += 1;
            return Ok(Resolution::Stale);
        }

        let plausible = self
            .plausibility
            .as_ref()
            .map_or(true, |p| p.is_plausible(x, y, z));

        if plausible {
            if let Some(cluster) = &self.cluster {
                let neighbourhood = cluster.neighbourhood(graph, triangle, link_type)?;
                if cluster.applies(&neighbourhood) {
                    let cut = cluster.repair(graph, &neighbourhood, link_type, tally)?;
                    if cut == 0 {
                        tally.left_as_is += 1;
                        return Ok(Resolution::LeftAsIs);
                    }
                    return Ok(Resolution::ClusterRepaired(cut));
                }
            }

            let sum = triangle.distance_sum();
            if sum < self.config.low_threshold {
                self.establish(graph, triangle)?;
                tally.established_low_distance += 1;
                return Ok(Resolution::Established(Establishment::LowDistance));
            }

            let shared = graph
                .neighbours(x, link_type)?
                .intersection(&graph.neighbours(z, link_type)?)
                .count();
            if shared >= self.config.support_threshold {
                self.establish(graph, triangle)?;
                tally.established_shared_support += 1;
                return Ok(Resolution::Established(Establishment::SharedNeighbours(shared)));
            }
        } else {
            tally.implausible += 1;
        }

        if triangle.distance_sum() > self.config.high_threshold {
            let targets = match self.config.cut_policy {
                CutPolicy::Larger if triangle.xy >= triangle.yz => vec![(x, y)],
                CutPolicy::Larger => vec![(y, z)],
                CutPolicy::Both => vec![(x, y), (y, z)],
            };
            let mut removed = Vec::with_capacity(targets.len());
            for (a, b) in targets {
                if graph.cut_edge(a, b, link_type, TRIANGLE_PROVENANCE)? {
                    removed.push((a, b));
                }
            }
            tally.edges_cut += removed.len() as u64;
            log::debug!("Cut {:?} from triangle ({}, {}, {})", removed, x, y, z);
            return Ok(Resolution::Cut(removed));
        }

        tally.left_as_is += 1;
        Ok(Resolution::LeftAsIs)
    }

    fn establish<G: LinkGraph + ?Sized>(&self, graph: &mut G, triangle: &OpenTriangle) -> Result<bool> {
        graph.add_edge(GraphEdge::new(
            triangle.x,
            triangle.z,
            self.config.link_type.as_str(),
            triangle.distance_sum(),
            TRIANGLE_PROVENANCE,
        ))
    }
}
