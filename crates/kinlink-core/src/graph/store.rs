use super::types::{GraphEdge, OpenTriangle};
use crate::error::Result;
use crate::types::{Link, RecordId};
use std::collections::BTreeSet;

/// A link graph the resolver can read and repair.
///
/// Edges are undirected and partitioned by link type. Record ids name graph
/// nodes directly, so they must be unique across every collection linked
/// into the same graph. Implementations backed
/// by an external database should surface connection failures as
/// `LinkageError::Store`; the resolver does not retry.
pub trait LinkGraph {
    /// Every open triangle of `link_type`, each reported once per centre `y`.
    /// Triangles whose closing pair `x - z` was cut earlier are not open.
    fn open_triangles(&self, link_type: &str) -> Result<Vec<OpenTriangle>>;

    /// Direct neighbours of `id`. Unknown ids have none.
    fn neighbours(&self, id: RecordId, link_type: &str) -> Result<BTreeSet<RecordId>>;

    /// Edges lying on some walk of at most `max_hops` edges from `from` to `to`.
    fn edges_within_hops(
        &self,
        from: RecordId,
        to: RecordId,
        max_hops: usize,
        link_type: &str,
    ) -> Result<Vec<GraphEdge>>;

    fn has_edge(&self, a: RecordId, b: RecordId, link_type: &str) -> Result<bool>;

    /// Insert unless an edge of the same type already joins the endpoints
    /// or the pair was cut. Returns whether anything was inserted.
    fn add_edge(&mut self, edge: GraphEdge) -> Result<bool>;

    /// Removes the edge without a trace. Returns whether an edge was removed.
    fn remove_edge(&mut self, a: RecordId, b: RecordId, link_type: &str) -> Result<bool>;

    /// Removes the edge and leaves a tombstone carrying `provenance`, so the
    /// pair cannot be linked again. Returns whether an edge was removed; no
    /// tombstone is left when there was nothing to remove.
    fn cut_edge(&mut self, a: RecordId, b: RecordId, link_type: &str, provenance: &str) -> Result<bool>;

    /// Whether the pair carries a tombstone for `link_type`.
    fn is_deleted(&self, a: RecordId, b: RecordId, link_type: &str) -> Result<bool>;

    /// Store a linker result. Symmetric duplicates collapse to one edge.
    fn add_link(&mut self, link: &Link) -> Result<bool> {
        self.add_edge(GraphEdge::from(link))
    }
}
