/// Index of a node in a [`Dendrogram`].
pub type ClusterIx = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterNode {
    /// Merge distance; 0 for leaves.
    pub distance: f64,
    /// Number of leaves below this node.
    pub size: usize,
    pub children: Option<(ClusterIx, ClusterIx)>,
    /// Input position, for leaves.
    pub item: Option<usize>,
}

impl ClusterNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Binary merge tree from agglomerative average-linkage clustering.
///
/// Nodes `0..n` are the leaves in input order; every merge appends one node,
/// so the root is the last node. Ties between equally distant cluster pairs
/// go to the pair that comes first in the current active ordering.
#[derive(Debug, Clone, Default)]
pub struct Dendrogram {
    nodes: Vec<ClusterNode>,
}

impl Dendrogram {
    /// Cluster `n` items from a symmetric `n x n` distance matrix.
    pub fn average_linkage(distances: &[Vec<f64>]) -> Self {
        let n = distances.len();
        let mut nodes: Vec<ClusterNode> = (0..n)
            .map(|i| ClusterNode {
                distance: 0.0,
                size: 1,
                children: None,
                item: Some(i),
            })
            .collect();

        // Distances between the currently active clusters, aligned with `active`.
        let mut active: Vec<ClusterIx> = (0..n).collect();
        let mut matrix: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| cell(distances, i, j)).collect())
            .collect();

        while active.len() > 1 {
            let (i, j) = closest_pair(&matrix);
            let (left, right) = (active[i], active[j]);
            let (size_l, size_r) = (nodes[left].size as f64, nodes[right].size as f64);

            // Lance-Williams update for average linkage
            let merged: Vec<f64> = (0..active.len())
                .filter(|&k| k != i && k != j)
                .map(|k| (size_l * matrix[i][k] + size_r * matrix[j][k]) / (size_l + size_r))
                .collect();

            let distance = matrix[i][j];
            for &pos in &[j, i] {
                active.remove(pos);
                matrix.remove(pos);
                for row in matrix.iter_mut() {
                    row.remove(pos);
                }
            }
            for (row, d) in matrix.iter_mut().zip(&merged) {
                row.push(*d);
            }
            let mut own = merged;
            own.push(0.0);
            matrix.push(own);

            active.push(nodes.len());
            nodes.push(ClusterNode {
                distance,
                size: nodes[left].size + nodes[right].size,
                children: Some((left, right)),
                item: None,
            });
        }

        Self { nodes }
    }

    pub fn root(&self) -> Option<ClusterIx> {
        self.nodes.len().checked_sub(1)
    }

    pub fn node(&self, ix: ClusterIx) -> Option<&ClusterNode> {
        self.nodes.get(ix)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Input positions of the leaves under `ix`, ascending.
    pub fn members(&self, ix: ClusterIx) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![ix];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            match (node.children, node.item) {
                (Some((l, r)), _) => {
                    stack.push(l);
                    stack.push(r);
                }
                (None, Some(item)) => out.push(item),
                (None, None) => {}
            }
        }
        out.sort_unstable();
        out
    }
}

fn cell(distances: &[Vec<f64>], i: usize, j: usize) -> f64 {
    if i == j {
        return 0.0;
    }
    distances
        .get(i)
        .and_then(|row| row.get(j))
        .copied()
        .unwrap_or(f64::INFINITY)
}

fn closest_pair(matrix: &[Vec<f64>]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut best_d = f64::INFINITY;
    for i in 0..matrix.len() {
        for j in i + 1..matrix.len() {
            if matrix[i][j] < best_d {
                best_d = matrix[i][j];
                best = (i, j);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(points: &[f64]) -> Vec<Vec<f64>> {
        points
            .iter()
            .map(|a| points.iter().map(|b| (a - b).abs()).collect())
            .collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert!(Dendrogram::average_linkage(&[]).root().is_none());
        let one = Dendrogram::average_linkage(&matrix(&[1.0]));
        assert_eq!(one.root(), Some(0));
        assert!(one.node(0).unwrap().is_leaf());
    }

    #[test]
    fn test_two_groups() {
        let d = Dendrogram::average_linkage(&matrix(&[0.0, 0.1, 0.2, 10.0, 10.1]));
        let root = d.root().unwrap();
        let node = d.node(root).unwrap();
        assert_eq!(node.size, 5);
        assert_eq!(d.len(), 9);

        let (l, r) = node.children.unwrap();
        let mut groups = vec![d.members(l), d.members(r)];
        groups.sort();
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4]]);
        // mean of all cross distances
        let expected = (10.0 + 10.1 + 9.9 + 10.0 + 9.8 + 9.9) / 6.0;
        assert!((node.distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ties_merge_first_pair() {
        let d = Dendrogram::average_linkage(&matrix(&[0.0, 1.0, 2.0]));
        let first = d.node(3).unwrap();
        assert_eq!(first.children, Some((0, 1)));
        assert_eq!(first.distance, 1.0);
        // (0,1) vs 2 averages 2.0 and 1.0
        assert_eq!(d.node(4).unwrap().distance, 1.5);
    }
}
