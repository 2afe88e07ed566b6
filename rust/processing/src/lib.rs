// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared skeleton analysis pipeline.
//!
//! Ties `toska-core` (classification, branch labels) and `toska-topology`
//! (graphs, spines, cycles) together into per-object summaries, and runs them
//! over every object of a labeled raster.

pub mod analysis;
pub mod config;
pub mod types;

pub use analysis::{
    analyze_object, analyze_single_skeleton, analyze_skeleton_network, analyze_skeletons,
    ObjectAnalysis,
};
pub use config::AnalysisConfig;
pub use types::{ObjectFailure, SkeletonReport, SkeletonSummary};
