use crate::types::{Link, RecordId};
use serde::{Deserialize, Serialize};

/// Provenance stamped on edges the resolver adds.
pub const TRIANGLE_PROVENANCE: &str = "open-triangle-processing";

/// An undirected edge of one link type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub a: RecordId,
    pub b: RecordId,
    pub link_type: String,
    pub distance: f64,
    pub provenance: String,
}

impl GraphEdge {
    pub fn new(
        a: RecordId,
        b: RecordId,
        link_type: impl Into<String>,
        distance: f64,
        provenance: impl Into<String>,
    ) -> Self {
        Self {
            a,
            b,
            link_type: link_type.into(),
            distance,
            provenance: provenance.into(),
        }
    }

    /// Endpoints with the smaller id first.
    pub fn key(&self) -> (RecordId, RecordId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }

    pub fn connects(&self, x: RecordId, y: RecordId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

impl From<&Link> for GraphEdge {
    fn from(link: &Link) -> Self {
        GraphEdge::new(
            link.record1,
            link.record2,
            link.link_type.clone(),
            link.distance,
            link.provenance.clone(),
        )
    }
}

/// `x - y - z` linked, `x - z` not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenTriangle {
    pub x: RecordId,
    pub y: RecordId,
    pub z: RecordId,
    /// d(x, y)
    pub xy: f64,
    /// d(y, z)
    pub yz: f64,
}

impl OpenTriangle {
    pub fn new(x: RecordId, y: RecordId, z: RecordId, xy: f64, yz: f64) -> Self {
        Self { x, y, z, xy, yz }
    }

    pub fn distance_sum(&self) -> f64 {
        self.xy + self.yz
    }

    /// Any two corners are the same record.
    pub fn is_degenerate(&self) -> bool {
        self.x == self.y || self.y == self.z || self.x == self.z
    }
}
