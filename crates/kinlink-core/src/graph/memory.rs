use super::store::LinkGraph;
use super::types::{GraphEdge, OpenTriangle};
use crate::error::{LinkageError, Result};
use crate::types::RecordId;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Arena slot of a record id.
type NodeIx = usize;

#[derive(Debug, Clone)]
struct EdgeData {
    distance: f64,
    provenance: String,
}

/// Adjacency for one link type: `adjacency[u][v]` holds the edge `u - v`
/// (stored in both directions).
#[derive(Debug, Default)]
struct Layer {
    adjacency: Vec<BTreeMap<NodeIx, EdgeData>>,
    edges: usize,
    /// Cut pairs, smaller slot first, with the removed edge's distance and
    /// the provenance of the cut.
    tombstones: BTreeMap<(NodeIx, NodeIx), EdgeData>,
}

impl Layer {
    fn row(&self, u: NodeIx) -> Option<&BTreeMap<NodeIx, EdgeData>> {
        self.adjacency.get(u)
    }

    fn row_mut(&mut self, u: NodeIx) -> &mut BTreeMap<NodeIx, EdgeData> {
        if self.adjacency.len() <= u {
            self.adjacency.resize_with(u + 1, BTreeMap::new);
        }
        &mut self.adjacency[u]
    }

    fn contains(&self, u: NodeIx, v: NodeIx) -> bool {
        self.row(u).is_some_and(|r| r.contains_key(&v))
    }

    fn is_tombstoned(&self, u: NodeIx, v: NodeIx) -> bool {
        self.tombstones.contains_key(&(u.min(v), u.max(v)))
    }

    fn remove(&mut self, u: NodeIx, v: NodeIx) -> Option<EdgeData> {
        let removed = self.row_mut(u).remove(&v)?;
        self.row_mut(v).remove(&u);
        self.edges -= 1;
        Some(removed)
    }

    /// Hop counts from `start`, up to `limit`.
    fn hops_from(&self, start: NodeIx, limit: usize) -> HashMap<NodeIx, usize> {
        let mut dist = HashMap::from([(start, 0)]);
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            let d = dist[&u];
            if d == limit {
                continue;
            }
            for &v in self.row(u).into_iter().flat_map(|r| r.keys()) {
                if !dist.contains_key(&v) {
                    dist.insert(v, d + 1);
                    queue.push_back(v);
                }
            }
        }
        dist
    }
}

/// In-memory link graph: an arena of record ids plus per-type adjacency.
///
/// Iteration follows insertion order of records, so results are
/// reproducible for a given sequence of writes.
#[derive(Debug, Default)]
pub struct MemoryLinkGraph {
    nodes: Vec<RecordId>,
    index: HashMap<RecordId, NodeIx>,
    layers: HashMap<String, Layer>,
}

impl MemoryLinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self, link_type: &str) -> usize {
        self.layers.get(link_type).map_or(0, |l| l.edges)
    }

    /// All edges of `link_type`, each once.
    pub fn edges(&self, link_type: &str) -> Vec<GraphEdge> {
        let Some(layer) = self.layers.get(link_type) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(layer.edges);
        for (u, row) in layer.adjacency.iter().enumerate() {
            for (&v, data) in row.range(u + 1..) {
                out.push(self.edge(u, v, link_type, data));
            }
        }
        out
    }

    /// Tombstones of `link_type`: the cut pair, the distance it had and
    /// the provenance of the cut.
    pub fn deleted_edges(&self, link_type: &str) -> Vec<GraphEdge> {
        let Some(layer) = self.layers.get(link_type) else {
            return Vec::new();
        };
        layer
            .tombstones
            .iter()
            .map(|(&(u, v), data)| self.edge(u, v, link_type, data))
            .collect()
    }

    pub fn edge_distance(&self, a: RecordId, b: RecordId, link_type: &str) -> Option<f64> {
        let (u, v) = (*self.index.get(&a)?, *self.index.get(&b)?);
        self.layers
            .get(link_type)?
            .row(u)?
            .get(&v)
            .map(|e| e.distance)
    }

    fn intern(&mut self, id: RecordId) -> NodeIx {
        if let Some(&ix) = self.index.get(&id) {
            return ix;
        }
        let ix = self.nodes.len();
        self.nodes.push(id);
        self.index.insert(id, ix);
        ix
    }

    fn edge(&self, u: NodeIx, v: NodeIx, link_type: &str, data: &EdgeData) -> GraphEdge {
        GraphEdge::new(
            self.nodes[u],
            self.nodes[v],
            link_type,
            data.distance,
            data.provenance.clone(),
        )
    }
}

impl LinkGraph for MemoryLinkGraph {
    fn open_triangles(&self, link_type: &str) -> Result<Vec<OpenTriangle>> {
        let Some(layer) = self.layers.get(link_type) else {
            return Ok(Vec::new());
        };

        let mut triangles = Vec::new();
        for (y, row) in layer.adjacency.iter().enumerate() {
            let around: Vec<(&NodeIx, &EdgeData)> = row.iter().collect();
            for (i, &(&x, xy)) in around.iter().enumerate() {
                for &(&z, yz) in &around[i + 1..] {
                    if !layer.contains(x, z) && !layer.is_tombstoned(x, z) {
                        triangles.push(OpenTriangle::new(
                            self.nodes[x],
                            self.nodes[y],
                            self.nodes[z],
                            xy.distance,
                            yz.distance,
                        ));
                    }
                }
            }
        }
        Ok(triangles)
    }

    fn neighbours(&self, id: RecordId, link_type: &str) -> Result<BTreeSet<RecordId>> {
        let row = self
            .index
            .get(&id)
            .and_then(|&u| self.layers.get(link_type)?.row(u));
        Ok(row
            .into_iter()
            .flat_map(|r| r.keys())
            .map(|&v| self.nodes[v])
            .collect())
    }

    fn edges_within_hops(
        &self,
        from: RecordId,
        to: RecordId,
        max_hops: usize,
        link_type: &str,
    ) -> Result<Vec<GraphEdge>> {
        let (Some(&s), Some(&t), Some(layer)) = (
            self.index.get(&from),
            self.index.get(&to),
            self.layers.get(link_type),
        ) else {
            return Ok(Vec::new());
        };

        let from_s = layer.hops_from(s, max_hops);
        let from_t = layer.hops_from(t, max_hops);
        let on_path = |u: NodeIx, v: NodeIx| match (from_s.get(&u), from_t.get(&v)) {
            (Some(du), Some(dv)) => du + 1 + dv <= max_hops,
            _ => false,
        };

        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let mut reached: Vec<NodeIx> = from_s.keys().copied().collect();
        reached.sort_unstable();
        for u in reached {
            for (&v, data) in layer.row(u).into_iter().flatten() {
                let key = (u.min(v), u.max(v));
                if (on_path(u, v) || on_path(v, u)) && seen.insert(key) {
                    out.push(self.edge(key.0, key.1, link_type, data));
                }
            }
        }
        Ok(out)
    }

    fn has_edge(&self, a: RecordId, b: RecordId, link_type: &str) -> Result<bool> {
        Ok(self.edge_distance(a, b, link_type).is_some())
    }

    fn add_edge(&mut self, edge: GraphEdge) -> Result<bool> {
        if edge.a == edge.b {
            return Err(LinkageError::Validation(format!(
                "cannot link record {} to itself",
                edge.a
            )));
        }
        if self.has_edge(edge.a, edge.b, &edge.link_type)?
            || self.is_deleted(edge.a, edge.b, &edge.link_type)?
        {
            return Ok(false);
        }

        let u = self.intern(edge.a);
        let v = self.intern(edge.b);
        let data = EdgeData {
            distance: edge.distance,
            provenance: edge.provenance,
        };
        let layer = self.layers.entry(edge.link_type).or_default();
        layer.row_mut(u).insert(v, data.clone());
        layer.row_mut(v).insert(u, data);
        layer.edges += 1;
        Ok(true)
    }

    fn remove_edge(&mut self, a: RecordId, b: RecordId, link_type: &str) -> Result<bool> {
        let (Some(&u), Some(&v)) = (self.index.get(&a), self.index.get(&b)) else {
            return Ok(false);
        };
        let Some(layer) = self.layers.get_mut(link_type) else {
            return Ok(false);
        };
        Ok(layer.remove(u, v).is_some())
    }

    fn cut_edge(&mut self, a: RecordId, b: RecordId, link_type: &str, provenance: &str) -> Result<bool> {
        let (Some(&u), Some(&v)) = (self.index.get(&a), self.index.get(&b)) else {
            return Ok(false);
        };
        let Some(layer) = self.layers.get_mut(link_type) else {
            return Ok(false);
        };
        let Some(removed) = layer.remove(u, v) else {
            return Ok(false);
        };
        layer.tombstones.insert(
            (u.min(v), u.max(v)),
            EdgeData {
                distance: removed.distance,
                provenance: provenance.to_string(),
            },
        );
        Ok(true)
    }

    fn is_deleted(&self, a: RecordId, b: RecordId, link_type: &str) -> Result<bool> {
        let (Some(&u), Some(&v)) = (self.index.get(&a), self.index.get(&b)) else {
            return Ok(false);
        };
        Ok(self
            .layers
            .get(link_type)
            .is_some_and(|layer| layer.is_tombstoned(u, v)))
    }
}
