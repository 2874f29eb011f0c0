use crate::error::{LinkageError, Result};
use crate::graph::LinkGraph;
use crate::linker::{CandidateStrategy, LinkageMetrics, Linker};
use crate::resolver::{ResolutionTally, TriangleResolver};
use crate::types::RecordSet;
use serde::{Deserialize, Serialize};

/// What one pipeline run did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineReport {
    pub linkage: LinkageMetrics,
    /// Links that became new graph edges.
    pub edges_inserted: u64,
    /// Links whose edge was already present, including the reverse
    /// direction of a symmetric pair.
    pub edges_existing: u64,
    /// Links whose pair was cut by an earlier resolution.
    pub edges_refused: u64,
    pub resolution: Option<ResolutionTally>,
}

impl PipelineReport {
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} | graph: {} inserted, {} already present, {} refused as cut",
            self.linkage.summary(),
            self.edges_inserted,
            self.edges_existing,
            self.edges_refused
        );
        if let Some(resolution) = &self.resolution {
            out.push_str(" | ");
            out.push_str(&resolution.summary());
        }
        out
    }
}

/// Links two collections into a graph, then optionally repairs the graph.
///
/// Distinct collections must not share record ids, since the graph keys
/// nodes by id; a clash is rejected before any linking starts.
///
/// # Example
/// ```rust,no_run
/// use kinlink_core::{LinkagePipeline, Linker, LinkerConfig, MemoryLinkGraph, RecordSet};
/// use kinlink_core::linker::BruteForceStrategy;
/// # fn run(strategy: BruteForceStrategy, births: RecordSet) -> kinlink_core::Result<()> {
/// let linker = Linker::new(strategy, LinkerConfig::default())?;
/// let mut graph = MemoryLinkGraph::new();
/// let report = LinkagePipeline::new(linker).run(births.clone(), births, &mut graph)?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct LinkagePipeline<S: CandidateStrategy> {
    linker: Linker<S>,
    resolver: Option<TriangleResolver>,
}

impl<S: CandidateStrategy> LinkagePipeline<S> {
    pub fn new(linker: Linker<S>) -> Self {
        Self {
            linker,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: TriangleResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run to completion. The linker is terminated whether or not the run
    /// succeeds.
    pub fn run<G: LinkGraph + ?Sized>(
        mut self,
        set1: RecordSet,
        set2: RecordSet,
        graph: &mut G,
    ) -> Result<PipelineReport> {
        let outcome = self.execute(set1, set2, graph);
        self.linker.terminate();
        let report = outcome?;
        log::info!("{}", report.summary());
        Ok(report)
    }

    fn execute<G: LinkGraph + ?Sized>(
        &mut self,
        set1: RecordSet,
        set2: RecordSet,
        graph: &mut G,
    ) -> Result<PipelineReport> {
        check_distinct_ids(&set1, &set2)?;
        self.linker.add_records(set1, set2)?;

        let mut report = PipelineReport::default();
        let mut links = self.linker.get_links()?;
        for link in links.by_ref() {
            let link = link?;
            if graph.add_link(&link)? {
                report.edges_inserted += 1;
            } else if graph.is_deleted(link.record1, link.record2, &link.link_type)? {
                report.edges_refused += 1;
            } else {
                report.edges_existing += 1;
            }
        }
        report.linkage = links.metrics();
        drop(links);

        if let Some(resolver) = &self.resolver {
            report.resolution = Some(resolver.resolve(graph)?);
        }
        Ok(report)
    }
}

/// Graph nodes are keyed by record id alone, so two different collections
/// must not reuse an id.
fn check_distinct_ids(set1: &RecordSet, set2: &RecordSet) -> Result<()> {
    if set1.is_same_collection(set2) {
        return Ok(());
    }
    match set2.iter().find(|r| set1.get(r.id()).is_some()) {
        Some(clash) => Err(LinkageError::Validation(format!(
            "record id {} appears in both collections; ids must be unique across linked collections",
            clash.id()
        ))),
        None => Ok(()),
    }
}
