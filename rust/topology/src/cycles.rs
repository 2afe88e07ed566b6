// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cycle measures of a skeleton graph.
//!
//! The cycle basis size is exact. The count of possible undirected cycles is
//! an approximation for multigraphs: simple cycles of three or more nodes are
//! enumerated on the underlying simple graph and weighted by the number of
//! ways to pick one parallel edge per step; every pair of parallel edges adds
//! one two-node loop and every self-loop adds one loop.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, SkeletonGraph};

/// Cycle measures of one graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// `edges - nodes + components`.
    pub basis_size: usize,
    pub possible_undirected_cycles: u64,
    /// The enumeration hit its limit; `possible_undirected_cycles` is a lower bound.
    pub saturated: bool,
}

/// Number of independent cycles: `edges - nodes + components`.
pub fn cycle_basis_size(graph: &SkeletonGraph) -> usize {
    (graph.edge_count() + graph.component_count()).saturating_sub(graph.node_count())
}

/// Counts undirected cycles, enumerating at most `limit` directed cycles.
///
/// Returns the count and whether the limit was reached.
pub fn count_undirected_cycles(graph: &SkeletonGraph, limit: Option<u64>) -> (u64, bool) {
    let mut multiplicity: FxHashMap<(NodeId, NodeId), u64> = FxHashMap::default();
    let mut loops = 0u64;
    for e in &graph.edges {
        if e.is_self_loop() {
            loops += 1;
        } else {
            let key = (e.source.min(e.target), e.source.max(e.target));
            *multiplicity.entry(key).or_insert(0) += 1;
        }
    }

    let parallel_pairs: u64 = multiplicity.values().map(|&m| m * (m - 1) / 2).sum();

    let mut simple: Vec<Vec<NodeId>> = vec![Vec::new(); graph.node_count()];
    for &(a, b) in multiplicity.keys() {
        simple[a].push(b);
        simple[b].push(a);
    }
    for neighbors in &mut simple {
        neighbors.sort_unstable();
    }

    let (directed, saturated) = enumerate_directed_cycles(&simple, &multiplicity, limit);
    let count = loops
        .saturating_add(parallel_pairs)
        .saturating_add(directed / 2);
    (count, saturated)
}

/// Enumerates simple cycles of three or more nodes, each once per direction.
///
/// A cycle is found from its smallest node, visiting larger nodes only.
fn enumerate_directed_cycles(
    simple: &[Vec<NodeId>],
    multiplicity: &FxHashMap<(NodeId, NodeId), u64>,
    limit: Option<u64>,
) -> (u64, bool) {
    let n = simple.len();
    let weight = |a: NodeId, b: NodeId| -> u64 {
        multiplicity
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or(0)
    };

    let mut total = 0u64;
    let mut found = 0u64;
    let mut on_path = vec![false; n];

    for start in 0..n {
        // (node, product of multiplicities so far, next neighbor to try)
        let mut stack: Vec<(NodeId, u64, usize)> = vec![(start, 1, 0)];
        on_path[start] = true;

        while let Some(top) = stack.last_mut() {
            let (node, product, cursor) = *top;
            if cursor == simple[node].len() {
                on_path[node] = false;
                stack.pop();
                continue;
            }
            top.2 += 1;

            let next = simple[node][cursor];
            if next < start {
                continue;
            }
            let step = product.saturating_mul(weight(node, next));
            if next == start {
                if stack.len() >= 3 {
                    total = total.saturating_add(step);
                    found += 1;
                    if limit.is_some_and(|cap| found >= cap) {
                        // Cycles come in pairs; round to a whole undirected count.
                        return (total - total % 2, true);
                    }
                }
            } else if !on_path[next] {
                on_path[next] = true;
                stack.push((next, step, 0));
            }
        }
    }

    (total, false)
}

/// Computes all cycle measures of `graph`.
pub fn analyze_cycles(graph: &SkeletonGraph, limit: Option<u64>) -> CycleSummary {
    let (possible_undirected_cycles, saturated) = count_undirected_cycles(graph, limit);
    CycleSummary {
        basis_size: cycle_basis_size(graph),
        possible_undirected_cycles,
        saturated,
    }
}
