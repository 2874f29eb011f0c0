use crate::error::{LinkageError, Result};
use serde::{Deserialize, Serialize};

/// Which edge(s) the high-distance rule removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutPolicy {
    /// The edge with the larger distance; `x - y` on a tie.
    Larger,
    /// Both observed edges.
    Both,
}

/// Thresholds for pairwise open-triangle repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleResolverConfig {
    /// Edge type whose triangles are examined. Default: "SIBLING"
    pub link_type: String,

    /// Close the triangle when d(x,y) + d(y,z) is below this.
    /// Default: 0.2
    pub low_threshold: f64,

    /// Cut when d(x,y) + d(y,z) exceeds this and nothing supports the
    /// triangle. Default: 0.5
    pub high_threshold: f64,

    /// Close the triangle when x and z share at least this many
    /// neighbours (y included). Default: 2
    pub support_threshold: usize,

    /// Default: Larger
    pub cut_policy: CutPolicy,
}

impl Default for TriangleResolverConfig {
    fn default() -> Self {
        Self {
            link_type: crate::relations::link_types::SIBLING.into(),
            low_threshold: 0.2,
            high_threshold: 0.5,
            support_threshold: 2,
            cut_policy: CutPolicy::Larger,
        }
    }
}

impl TriangleResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link_type(mut self, link_type: impl Into<String>) -> Self {
        self.link_type = link_type.into();
        self
    }

    pub fn with_thresholds(mut self, low: f64, high: f64) -> Self {
        self.low_threshold = low;
        self.high_threshold = high;
        self
    }

    pub fn with_support_threshold(mut self, support: usize) -> Self {
        self.support_threshold = support;
        self
    }

    pub fn with_cut_policy(mut self, policy: CutPolicy) -> Self {
        self.cut_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.link_type.trim().is_empty() {
            return Err(LinkageError::Validation("link_type must not be empty".into()));
        }
        check_bounds(self.low_threshold, self.high_threshold)?;
        if self.support_threshold == 0 {
            return Err(LinkageError::Validation(
                "support_threshold must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for cluster-based repair of large neighbourhoods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRepairConfig {
    /// Longest walk between x and z whose edges join the neighbourhood.
    /// Default: 5
    pub max_hops: usize,

    /// Clusters of this size or smaller are not split further. Default: 7
    pub min_split_size: usize,

    /// A child cluster merged below this is tight. Default: 0.1
    pub low_threshold: f64,

    /// A split merged above this is suspect. Default: 0.6
    pub high_threshold: f64,

    /// Use clustering instead of the pairwise rules once the neighbourhood
    /// has at least this many records. Default: 8
    pub neighbourhood_size: usize,
}

impl Default for ClusterRepairConfig {
    fn default() -> Self {
        Self {
            max_hops: 5,
            min_split_size: 7,
            low_threshold: 0.1,
            high_threshold: 0.6,
            neighbourhood_size: 8,
        }
    }
}

impl ClusterRepairConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_hops(mut self, hops: usize) -> Self {
        self.max_hops = hops;
        self
    }

    pub fn with_min_split_size(mut self, size: usize) -> Self {
        self.min_split_size = size;
        self
    }

    pub fn with_thresholds(mut self, low: f64, high: f64) -> Self {
        self.low_threshold = low;
        self.high_threshold = high;
        self
    }

    pub fn with_neighbourhood_size(mut self, size: usize) -> Self {
        self.neighbourhood_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_hops < 2 {
            return Err(LinkageError::Validation("max_hops must be >= 2".into()));
        }
        if self.min_split_size < 2 {
            return Err(LinkageError::Validation(
                "min_split_size must be >= 2".into(),
            ));
        }
        if self.neighbourhood_size < 3 {
            return Err(LinkageError::Validation(
                "neighbourhood_size must be >= 3".into(),
            ));
        }
        check_bounds(self.low_threshold, self.high_threshold)
    }
}

fn check_bounds(low: f64, high: f64) -> Result<()> {
    if !(low >= 0.0) || !(high >= 0.0) {
        return Err(LinkageError::Validation(
            "thresholds must be non-negative".into(),
        ));
    }
    if low > high {
        return Err(LinkageError::Validation(
            "low threshold must not exceed high threshold".into(),
        ));
    }
    Ok(())
}
