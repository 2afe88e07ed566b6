// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node/branch graph of one skeleton object.
//!
//! - **Nodes** = endpoints, merged junction clusters, and synthesized ring anchors
//! - **Edges** = branches (runs of chain pixels) weighted by their pixel count
//!
//! Nodes and edges live in dense vectors and are addressed by their index.
//! Parallel edges and self-loops are kept as individual edges, so every branch
//! of the skeleton stays addressable.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use toska_core::Voxel;

/// Dense node index.
pub type NodeId = usize;

/// Dense edge index.
pub type EdgeId = usize;

/// What a node stands for in the skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A single endpoint pixel.
    Endpoint,
    /// A cluster of linked branch-point pixels.
    BranchPoint,
    /// Anchor synthesized on a closed ring that touches no other node.
    Ring,
}

/// A node of the skeleton graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Pixels of the node in scan order. Never empty.
    pub voxels: Vec<Voxel>,
}

impl SkeletonNode {
    /// First pixel of the node in scan order.
    pub fn anchor(&self) -> Voxel {
        self.voxels[0]
    }
}

/// A branch between two nodes (or a node and itself).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Number of chain pixels on the branch; 0 for nodes touching directly.
    pub weight: usize,
    /// Branch label the edge was built from, `None` for direct node contacts.
    pub branch: Option<u32>,
}

impl SkeletonEdge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// The end opposite to `node`.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

/// Undirected multigraph of one skeleton object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkeletonGraph {
    ndim: usize,
    pub nodes: Vec<SkeletonNode>,
    pub edges: Vec<SkeletonEdge>,
    /// Adjacency list: node index → list of (neighbor index, edge index).
    /// Self-loops appear twice.
    adjacency: Vec<Vec<(NodeId, EdgeId)>>,
}

impl SkeletonGraph {
    /// Creates an empty graph for a raster of rank `ndim`.
    pub fn new(ndim: usize) -> Self {
        Self {
            ndim,
            ..Self::default()
        }
    }

    // =========================================================================
    // Graph mutation
    // =========================================================================

    /// Adds a node. Returns its index.
    pub fn add_node(&mut self, kind: NodeKind, voxels: Vec<Voxel>) -> NodeId {
        debug_assert!(!voxels.is_empty());
        let id = self.nodes.len();
        self.nodes.push(SkeletonNode { id, kind, voxels });
        self.adjacency.push(Vec::new());
        id
    }

    /// Adds an undirected edge between two nodes. Returns its index.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: usize,
        branch: Option<u32>,
    ) -> EdgeId {
        let id = self.edges.len();
        self.edges.push(SkeletonEdge {
            id,
            source,
            target,
            weight,
            branch,
        });
        self.adjacency[source].push((target, id));
        self.adjacency[target].push((source, id));
        id
    }

    /// Moves every node pixel from window coordinates into image coordinates.
    ///
    /// The window's first pixel sits at `origin - padding` on the raster's own
    /// axes.
    pub fn relocate(&mut self, origin: Voxel, padding: usize) {
        let first_axis = 3 - self.ndim.min(3);
        for node in &mut self.nodes {
            for voxel in &mut node.voxels {
                for axis in first_axis..3 {
                    voxel[axis] = voxel[axis] + origin[axis] - padding;
                }
            }
        }
    }

    // =========================================================================
    // Graph accessors
    // =========================================================================

    /// Rank of the raster the graph was built from.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// (neighbor, edge) pairs incident to `node`.
    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, EdgeId)] {
        &self.adjacency[node]
    }

    /// Number of edge ends at `node`; a self-loop counts twice.
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency[node].len()
    }

    /// Number of nodes of the given kind.
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn self_loop_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_self_loop()).count()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> usize {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Coordinates of `voxel` with only the raster's own axes.
    pub fn coords(&self, voxel: Voxel) -> SmallVec<[usize; 3]> {
        voxel[3 - self.ndim.min(3)..].iter().copied().collect()
    }

    // =========================================================================
    // Connected components
    // =========================================================================

    /// Returns connected components as ascending lists of node indices,
    /// ordered by their smallest node.
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let n = self.node_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            visited[start] = true;
            queue.push_back(start);

            while let Some(node) = queue.pop_front() {
                component.push(node);
                for &(neighbor, _) in &self.adjacency[node] {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        self.connected_components().len()
    }

    // =========================================================================
    // Maximum spanning forest
    // =========================================================================

    /// Computes a maximum-weight spanning forest using Kruskal's algorithm.
    ///
    /// Edges are taken by descending weight, ties by ascending edge id.
    /// Self-loops never enter the forest. Returns the chosen edge indices in
    /// the order they were accepted.
    pub fn maximum_spanning_forest(&self) -> Vec<EdgeId> {
        let n = self.node_count();
        let mut parent: Vec<usize> = (0..n).collect();
        let mut rank = vec![0usize; n];

        fn find(parent: &mut [usize], x: usize) -> usize {
            let mut root = x;
            while parent[root] != root {
                root = parent[root];
            }
            let mut current = x;
            while parent[current] != root {
                let next = parent[current];
                parent[current] = root;
                current = next;
            }
            root
        }

        fn union(parent: &mut [usize], rank: &mut [usize], x: usize, y: usize) -> bool {
            let rx = find(parent, x);
            let ry = find(parent, y);
            if rx == ry {
                return false;
            }
            if rank[rx] < rank[ry] {
                parent[rx] = ry;
            } else if rank[rx] > rank[ry] {
                parent[ry] = rx;
            } else {
                parent[ry] = rx;
                rank[rx] += 1;
            }
            true
        }

        let mut edge_indices: Vec<EdgeId> = (0..self.edges.len()).collect();
        edge_indices.sort_by(|&a, &b| {
            self.edges[b]
                .weight
                .cmp(&self.edges[a].weight)
                .then(a.cmp(&b))
        });

        let mut forest = Vec::new();
        for &ei in &edge_indices {
            let e = &self.edges[ei];
            if e.is_self_loop() {
                continue;
            }
            if union(&mut parent, &mut rank, e.source, e.target) {
                forest.push(ei);
                if forest.len() + 1 == n {
                    break;
                }
            }
        }

        forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_path_graph() -> SkeletonGraph {
        // 0 --1-- 1 --2-- 2 --3-- 3
        let mut g = SkeletonGraph::new(2);
        for x in 0..4 {
            g.add_node(NodeKind::Endpoint, vec![[0, 0, x]]);
        }
        g.add_edge(0, 1, 1, Some(1));
        g.add_edge(1, 2, 2, Some(2));
        g.add_edge(2, 3, 3, Some(3));
        g
    }

    fn make_triangle_graph() -> SkeletonGraph {
        let mut g = SkeletonGraph::new(2);
        for x in 0..3 {
            g.add_node(NodeKind::BranchPoint, vec![[0, x, x]]);
        }
        g.add_edge(0, 1, 1, Some(1));
        g.add_edge(1, 2, 1, Some(2));
        g.add_edge(0, 2, 2, Some(3));
        g
    }

    #[test]
    fn graph_basic_properties() {
        let g = make_path_graph();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.degree(3), 1);
        assert_eq!(g.total_weight(), 6);
        assert_eq!(g.count_kind(NodeKind::Endpoint), 4);
    }

    #[test]
    fn self_loop_counts_twice_toward_degree() {
        let mut g = SkeletonGraph::new(2);
        let ring = g.add_node(NodeKind::Ring, vec![[0, 1, 1]]);
        let e = g.add_edge(ring, ring, 8, Some(1));
        assert_eq!(g.degree(ring), 2);
        assert!(g.edges[e].is_self_loop());
        assert_eq!(g.edges[e].other(ring), ring);
        assert_eq!(g.self_loop_count(), 1);
    }

    #[test]
    fn connected_components_multiple() {
        let mut g = SkeletonGraph::new(2);
        for x in 0..5 {
            g.add_node(NodeKind::Endpoint, vec![[0, 0, x]]);
        }
        g.add_edge(3, 0, 1, None);
        g.add_edge(2, 4, 1, None);

        assert_eq!(
            g.connected_components(),
            vec![vec![0, 3], vec![1], vec![2, 4]]
        );
        assert_eq!(g.component_count(), 3);
    }

    #[test]
    fn maximum_spanning_forest_keeps_heavy_edges() {
        let g = make_triangle_graph();
        let forest = g.maximum_spanning_forest();
        assert_eq!(forest.len(), 2);
        // Heaviest first, then the lower id of the two weight-1 edges.
        assert_eq!(forest, vec![2, 0]);
    }

    #[test]
    fn spanning_forest_skips_loops_and_parallels() {
        let mut g = SkeletonGraph::new(2);
        let a = g.add_node(NodeKind::BranchPoint, vec![[0, 0, 0]]);
        let b = g.add_node(NodeKind::BranchPoint, vec![[0, 0, 9]]);
        g.add_edge(a, a, 50, Some(1));
        g.add_edge(a, b, 4, Some(2));
        g.add_edge(a, b, 7, Some(3));
        assert_eq!(g.maximum_spanning_forest(), vec![2]);
    }

    #[test]
    fn relocate_into_image_coordinates() {
        let mut g = SkeletonGraph::new(2);
        g.add_node(NodeKind::Endpoint, vec![[0, 1, 1], [0, 1, 2]]);
        g.relocate([0, 10, 20], 1);
        assert_eq!(g.nodes[0].voxels, vec![[0, 10, 20], [0, 10, 21]]);
        assert_eq!(g.coords(g.nodes[0].anchor()).as_slice(), &[10, 20]);
    }

    #[test]
    fn relocate_3d() {
        let mut g = SkeletonGraph::new(3);
        g.add_node(NodeKind::Endpoint, vec![[1, 1, 1]]);
        g.relocate([4, 5, 6], 1);
        assert_eq!(g.nodes[0].anchor(), [4, 5, 6]);
        assert_eq!(g.coords([4, 5, 6]).as_slice(), &[4, 5, 6]);
    }
}
