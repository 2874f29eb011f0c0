//! Approximate linkage of historical birth, marriage and death records.

pub mod types;
pub mod error;
pub mod kinds;
pub mod relations;
pub mod measure;
pub mod search;
pub mod linker;
pub mod graph;
pub mod resolver;
pub mod recipe;
pub mod pipeline;

pub use error::{LinkageError, Result};
pub use types::*;
pub use measure::{
    Aggregation, CompositeMeasure, Exact, Jaccard, Levenshtein, MeasureConfig,
    MissingFieldPolicy, RecordMeasure, SorensenDice, StringMeasure,
};
pub use search::{
    BruteForceSearch, DataDistance, PivotIndex, PivotIndexFactory, SearchConfig,
    SearchStructure, SearchStructureFactory,
};
pub use linker::{
    BruteForceStrategy, CandidateStrategy, FieldMapping, LinkViability, LinkageConstraints,
    LinkageMetrics, Linker, LinkerConfig, Links, SimilaritySearchStrategy,
};
pub use graph::{GraphEdge, LinkGraph, MemoryLinkGraph, OpenTriangle, TRIANGLE_PROVENANCE};
pub use resolver::{
    BirthYearSpread, ClusterRepair, ClusterRepairConfig, CutPolicy, Resolution,
    ResolutionTally, TriangleResolver, TriangleResolverConfig, TriplePlausibility,
};
pub use recipe::LinkageRecipe;
pub use pipeline::{LinkagePipeline, PipelineReport};
