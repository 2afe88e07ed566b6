// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spine search: the heaviest simple path of every connected component.
//!
//! Longest simple paths are intractable on general graphs, so the search runs
//! on the maximum-weight spanning forest, where every pair of nodes has a
//! unique path. Within each component every node is tried as a root in
//! ascending id order and the first strictly longer path wins.

use serde::{Deserialize, Serialize};

use crate::graph::{EdgeId, NodeId, SkeletonGraph};

/// Spine of one connected component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinePath {
    /// Nodes from the root to the far end.
    pub nodes: Vec<NodeId>,
    /// Edges between consecutive `nodes`.
    pub edges: Vec<EdgeId>,
    pub length: usize,
}

/// Spines of all components of a graph, in component order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spine {
    pub components: Vec<SpinePath>,
}

impl Spine {
    /// Total spine length summed over all components.
    pub fn length(&self) -> usize {
        self.components.iter().map(|p| p.length).sum()
    }
}

/// Finds the spine of every connected component of `graph`.
pub fn find_spine(graph: &SkeletonGraph) -> Spine {
    let n = graph.node_count();
    let mut forest: Vec<Vec<(NodeId, EdgeId)>> = vec![Vec::new(); n];
    for ei in graph.maximum_spanning_forest() {
        let e = &graph.edges[ei];
        forest[e.source].push((e.target, ei));
        forest[e.target].push((e.source, ei));
    }
    // Incidence in edge-id order keeps the traversal independent of Kruskal's
    // acceptance order.
    for incident in &mut forest {
        incident.sort_unstable_by_key(|&(_, ei)| ei);
    }

    let components = graph
        .connected_components()
        .into_iter()
        .map(|component| {
            let mut best: Option<SpinePath> = None;
            for &root in &component {
                let candidate = farthest_from(graph, &forest, root);
                if best.as_ref().map_or(true, |b| candidate.length > b.length) {
                    best = Some(candidate);
                }
            }
            best.unwrap_or_default()
        })
        .collect();

    Spine { components }
}

/// Depth-first walk of the forest tree containing `root`; returns the first
/// discovered path of maximum weight.
fn farthest_from(graph: &SkeletonGraph, forest: &[Vec<(NodeId, EdgeId)>], root: NodeId) -> SpinePath {
    let mut best = SpinePath {
        nodes: vec![root],
        edges: Vec::new(),
        length: 0,
    };
    // (node, parent, edge into node, distance, next incidence to try)
    let mut stack: Vec<(NodeId, Option<NodeId>, Option<EdgeId>, usize, usize)> =
        vec![(root, None, None, 0, 0)];

    while let Some(top) = stack.last_mut() {
        let (node, parent, _, distance, cursor) = *top;
        if cursor == forest[node].len() {
            stack.pop();
            continue;
        }
        top.4 += 1;

        let (next, ei) = forest[node][cursor];
        if Some(next) == parent {
            continue;
        }
        let reached = distance + graph.edges[ei].weight;
        stack.push((next, Some(node), Some(ei), reached, 0));

        if reached > best.length {
            best = SpinePath {
                nodes: stack.iter().map(|frame| frame.0).collect(),
                edges: stack.iter().filter_map(|frame| frame.2).collect(),
                length: reached,
            };
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    fn star(arms: &[usize]) -> SkeletonGraph {
        let mut g = SkeletonGraph::new(2);
        let hub = g.add_node(NodeKind::BranchPoint, vec![[0, 0, 0]]);
        for (i, &w) in arms.iter().enumerate() {
            let tip = g.add_node(NodeKind::Endpoint, vec![[0, 1, i]]);
            g.add_edge(hub, tip, w, Some(i as u32 + 1));
        }
        g
    }

    #[test]
    fn single_edge() {
        let mut g = SkeletonGraph::new(2);
        g.add_node(NodeKind::Endpoint, vec![[0, 0, 0]]);
        g.add_node(NodeKind::Endpoint, vec![[0, 0, 5]]);
        g.add_edge(0, 1, 4, Some(1));
        let spine = find_spine(&g);
        assert_eq!(spine.length(), 4);
        assert_eq!(spine.components[0].nodes, vec![0, 1]);
        assert_eq!(spine.components[0].edges, vec![0]);
    }

    #[test]
    fn star_takes_two_longest_arms() {
        let spine = find_spine(&star(&[3, 7, 5]));
        assert_eq!(spine.length(), 12);
        let path = &spine.components[0];
        // Root 2 (the 7-arm tip) is the first root reaching 12.
        assert_eq!(path.nodes, vec![2, 0, 3]);
        assert_eq!(path.edges, vec![1, 2]);
    }

    #[test]
    fn ties_keep_first_path() {
        let spine = find_spine(&star(&[4, 4, 4]));
        assert_eq!(spine.length(), 8);
        assert_eq!(spine.components[0].nodes, vec![1, 0, 2]);
    }

    #[test]
    fn cycle_is_cut_at_its_lightest_edge() {
        let mut g = SkeletonGraph::new(2);
        for x in 0..3 {
            g.add_node(NodeKind::BranchPoint, vec![[0, 0, x]]);
        }
        g.add_edge(0, 1, 5, Some(1));
        g.add_edge(1, 2, 6, Some(2));
        g.add_edge(2, 0, 1, Some(3));
        assert_eq!(find_spine(&g).length(), 11);
    }

    #[test]
    fn ring_spine_is_zero() {
        let mut g = SkeletonGraph::new(2);
        let ring = g.add_node(NodeKind::Ring, vec![[0, 0, 0]]);
        g.add_edge(ring, ring, 12, Some(1));
        let spine = find_spine(&g);
        assert_eq!(spine.length(), 0);
        assert_eq!(spine.components[0].nodes, vec![0]);
    }

    #[test]
    fn components_are_summed() {
        let mut g = SkeletonGraph::new(2);
        for x in 0..5 {
            g.add_node(NodeKind::Endpoint, vec![[0, 0, x]]);
        }
        g.add_edge(0, 1, 2, Some(1));
        g.add_edge(2, 3, 3, Some(2));
        let spine = find_spine(&g);
        assert_eq!(spine.components.len(), 3);
        assert_eq!(spine.components[2].length, 0);
        assert_eq!(spine.length(), 5);
    }

    #[test]
    fn empty_graph_has_no_spine() {
        assert_eq!(find_spine(&SkeletonGraph::new(3)), Spine::default());
    }
}
