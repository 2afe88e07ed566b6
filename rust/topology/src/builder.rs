// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builds the node/branch graph of one classified object.
//!
//! Nodes are assigned in scan order of their first pixel: every endpoint pixel
//! is its own node, and branch-point pixels adjacent under the kernel merge
//! into one node, whether or not the classifier linked them. A chain pixel
//! whose both links land on the same junction is enclosed by it and becomes
//! part of that node. Each remaining labeled branch then becomes one edge
//! between the nodes its two ends link to. A branch whose ends link to nothing is a closed ring; it gets a `Ring`
//! node (appended after all pixel nodes) and a self-loop. Finally, nodes whose
//! pixels link directly, with no chain pixel in between, are joined by a
//! weight-0 edge without a branch label.

use std::collections::VecDeque;

use smallvec::SmallVec;
use toska_core::{BranchLabels, ClassifiedSkeleton, PointKind};

use crate::error::{Error, Result};
use crate::graph::{NodeId, NodeKind, SkeletonGraph};

/// Builds the graph of one object.
///
/// Node pixels keep the coordinates of the classified window; use
/// [`SkeletonGraph::relocate`] to move them into image coordinates.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] if `branches` was labeled on another window,
/// [`Error::MalformedBranch`] if a branch does not link to nodes exactly zero
/// or two times.
pub fn build_graph(classified: &ClassifiedSkeleton, branches: &BranchLabels) -> Result<SkeletonGraph> {
    let kinds = classified.kinds();
    if !kinds.same_shape(&branches.labels) {
        return Err(Error::ShapeMismatch {
            classified: kinds.shape().to_vec(),
            branches: branches.labels.shape().to_vec(),
        });
    }

    let mut graph = SkeletonGraph::new(kinds.ndim());
    let mut node_of: Vec<Option<NodeId>> = vec![None; kinds.len()];

    // Pixel nodes.
    let mut queue = VecDeque::new();
    for index in 0..kinds.len() {
        if node_of[index].is_some() {
            continue;
        }
        match classified.kind(index) {
            Some(PointKind::Endpoint) => {
                let id = graph.add_node(NodeKind::Endpoint, vec![kinds.voxel_of(index)]);
                node_of[index] = Some(id);
            }
            Some(PointKind::Branch) => {
                let id = graph.node_count();
                let mut members = vec![index];
                node_of[index] = Some(id);
                queue.push_back(index);
                while let Some(current) = queue.pop_front() {
                    for next in classified.adjacent(current) {
                        if node_of[next].is_none() && classified.kind(next) == Some(PointKind::Branch) {
                            node_of[next] = Some(id);
                            members.push(next);
                            queue.push_back(next);
                        }
                    }
                }
                let mut enclosed = Vec::new();
                for &member in &members {
                    for next in classified.linked(member) {
                        if node_of[next].is_none()
                            && classified.kind(next) == Some(PointKind::Chain)
                            && classified.linked(next).iter().all(|&n| node_of[n] == Some(id))
                        {
                            node_of[next] = Some(id);
                            enclosed.push(next);
                        }
                    }
                }
                members.extend(enclosed);
                members.sort_unstable();
                let voxels = members.into_iter().map(|i| kinds.voxel_of(i)).collect();
                graph.add_node(NodeKind::BranchPoint, voxels);
            }
            _ => {}
        }
    }

    // Branch pixels grouped by label, each group in scan order. Pixels enclosed
    // by a junction belong to its node, so their branch yields no edge.
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); branches.count as usize];
    for (index, &label) in branches.labels.data().iter().enumerate() {
        if label != 0 && node_of[index].is_none() {
            members[label as usize - 1].push(index);
        }
    }

    for (offset, pixels) in members.iter().enumerate() {
        if pixels.is_empty() {
            continue;
        }
        let branch = offset as u32 + 1;
        let weight = pixels.len();
        let touches: SmallVec<[NodeId; 2]> = pixels
            .iter()
            .flat_map(|&pixel| classified.linked(pixel))
            .filter_map(|next| node_of[next])
            .collect();

        match touches.as_slice() {
            [] => {
                let ring = graph.add_node(NodeKind::Ring, vec![kinds.voxel_of(pixels[0])]);
                graph.add_edge(ring, ring, weight, Some(branch));
            }
            &[a, b] => {
                graph.add_edge(a, b, weight, Some(branch));
            }
            other => {
                return Err(Error::MalformedBranch {
                    branch,
                    touches: other.len(),
                });
            }
        }
    }

    // Direct node-to-node links, each pair once.
    for index in 0..kinds.len() {
        let Some(node) = node_of[index] else {
            continue;
        };
        for next in classified.linked(index) {
            if next <= index {
                continue;
            }
            if let Some(other) = node_of[next] {
                if other != node {
                    graph.add_edge(node, other, 0, None);
                }
            }
        }
    }

    Ok(graph)
}
