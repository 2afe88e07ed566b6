// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-node and per-edge feature rows of a skeleton graph.

use serde::{Deserialize, Serialize};

use crate::graph::SkeletonGraph;

/// Kind of graph element a feature row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Node,
    Edge,
}

/// One row of the network feature table.
///
/// Node rows carry `degree` and `coordinates`; edge rows carry `weight`,
/// `node_1`, `node_2` and `branch_label`. Node references are 1-based row
/// labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub label: usize,
    pub component_type: ComponentType,
    pub degree: Option<usize>,
    pub weight: Option<usize>,
    pub node_1: Option<usize>,
    pub node_2: Option<usize>,
    pub branch_label: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coordinates: Vec<Vec<usize>>,
}

/// Lists the nodes (labels `1..=N`) followed by the edges (labels `N+1..`).
pub fn network_features(graph: &SkeletonGraph) -> Vec<FeatureRow> {
    let n = graph.node_count();
    let nodes = graph.nodes.iter().map(|node| FeatureRow {
        label: node.id + 1,
        component_type: ComponentType::Node,
        degree: Some(graph.degree(node.id)),
        weight: None,
        node_1: None,
        node_2: None,
        branch_label: None,
        coordinates: node
            .voxels
            .iter()
            .map(|&v| graph.coords(v).to_vec())
            .collect(),
    });
    let edges = graph.edges.iter().map(|edge| FeatureRow {
        label: n + edge.id + 1,
        component_type: ComponentType::Edge,
        degree: None,
        weight: Some(edge.weight),
        node_1: Some(edge.source + 1),
        node_2: Some(edge.target + 1),
        branch_label: edge.branch,
        coordinates: Vec::new(),
    });
    nodes.chain(edges).collect()
}
