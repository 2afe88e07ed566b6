// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Toska Topology
//!
//! Graph view of classified skeletons.
//!
//! A classified object (see `toska-core`) becomes a [`SkeletonGraph`] whose
//! nodes are endpoints and junction clusters and whose edges are branches
//! weighted by their pixel count. On top of the graph this crate computes the
//! spine (heaviest simple path per component), the cycle basis size, an
//! estimate of the number of undirected cycles, and a flat feature table.
//!
//! Graphs use dense integer ids: nodes and edges are plain vectors and
//! adjacency lists refer to them by index.

pub mod builder;
pub mod cycles;
pub mod error;
pub mod features;
pub mod graph;
pub mod spine;

pub use builder::build_graph;
pub use cycles::{analyze_cycles, count_undirected_cycles, cycle_basis_size, CycleSummary};
pub use error::{Error, Result};
pub use features::{network_features, ComponentType, FeatureRow};
pub use graph::{EdgeId, NodeId, NodeKind, SkeletonEdge, SkeletonGraph, SkeletonNode};
pub use spine::{find_spine, Spine, SpinePath};
