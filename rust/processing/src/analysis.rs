// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-object skeleton analysis.
//!
//! Every object is cropped to its bounding box, padded by one background
//! pixel, classified, split into branches and turned into a graph. The graph
//! gives the summary measures. Objects are independent and run in parallel;
//! a failing object is reported without affecting its siblings.

use std::time::Instant;

use rayon::prelude::*;
use toska_core::{classify, label_object_branches, regions, Raster, Region};
use toska_topology::{
    analyze_cycles, build_graph, find_spine, network_features, CycleSummary, FeatureRow, NodeKind,
    Result, SkeletonGraph, Spine,
};

use crate::config::AnalysisConfig;
use crate::types::{ObjectFailure, SkeletonReport, SkeletonSummary};

/// Padding added around each object window before classification.
const WINDOW_PADDING: usize = 1;

/// Full analysis of one object.
#[derive(Debug, Clone)]
pub struct ObjectAnalysis {
    pub summary: SkeletonSummary,
    /// Graph in image coordinates.
    pub graph: SkeletonGraph,
    pub spine: Spine,
    pub cycles: CycleSummary,
}

/// Analyzes the object described by `region`.
///
/// # Errors
///
/// `EmptyObject` (wrapped in the topology error) when the mask has no
/// foreground, plus any classification or graph construction error.
pub fn analyze_object(region: &Region, config: &AnalysisConfig) -> Result<ObjectAnalysis> {
    let connectivity = config.connectivity_for(region.mask.ndim())?;
    if region.area == 0 {
        return Err(toska_core::Error::EmptyObject.into());
    }

    let classified = classify(&region.mask.padded(WINDOW_PADDING), connectivity)?;
    let branches = label_object_branches(&classified);
    let mut graph = build_graph(&classified, &branches)?;
    graph.relocate(region.bbox.min, WINDOW_PADDING);

    let spine = find_spine(&graph);
    let cycles = analyze_cycles(&graph, config.cycle_limit);

    let n_endpoints = graph.count_kind(NodeKind::Endpoint);
    let summary = SkeletonSummary {
        skeleton_id: region.label,
        label: region.label,
        n_endpoints,
        n_branch_points: graph.node_count() - n_endpoints,
        n_nodes: graph.node_count(),
        n_branches: graph.edge_count(),
        spine_length: spine.length(),
        n_cycle_basis: cycles.basis_size,
        n_possible_undirected_cycles: cycles.possible_undirected_cycles,
        n_components: spine.components.len(),
        cycles_saturated: cycles.saturated,
    };

    tracing::debug!(
        label = region.label,
        nodes = summary.n_nodes,
        branches = summary.n_branches,
        spine = summary.spine_length,
        "Object analyzed"
    );

    Ok(ObjectAnalysis {
        summary,
        graph,
        spine,
        cycles,
    })
}

/// Summary of object `label` in a labeled skeleton raster.
///
/// A label with no pixels yields an all-zero summary.
pub fn analyze_single_skeleton(
    skeleton: &Raster<u32>,
    label: u32,
    config: &AnalysisConfig,
) -> Result<SkeletonSummary> {
    match single_region(skeleton, label) {
        Some(region) => summarize(&region, config),
        None => {
            config.connectivity_for(skeleton.ndim())?;
            Ok(SkeletonSummary::empty(label))
        }
    }
}

/// Analyzes every object of a labeled skeleton raster in parallel.
///
/// Summaries and failures are sorted by object label.
pub fn analyze_skeletons(labeled: &Raster<u32>, config: &AnalysisConfig) -> SkeletonReport {
    let start = Instant::now();
    let objects = regions(labeled);
    tracing::info!(
        objects = objects.len(),
        shape = ?labeled.shape(),
        connectivity = ?config.connectivity,
        "Starting skeleton analysis"
    );

    let results: Vec<(u32, Result<SkeletonSummary>)> = objects
        .par_iter()
        .map(|region| {
            let _span = tracing::debug_span!("object", label = region.label).entered();
            (region.label, summarize(region, config))
        })
        .collect();

    let mut report = SkeletonReport::default();
    for (label, result) in results {
        match result {
            Ok(summary) => report.summaries.push(summary),
            Err(error) => {
                tracing::warn!(label, %error, "Object analysis failed");
                report.failures.push(ObjectFailure {
                    label,
                    error: error.to_string(),
                });
            }
        }
    }
    report.summaries.sort_unstable_by_key(|s| s.label);
    report.failures.sort_unstable_by_key(|f| f.label);

    tracing::info!(
        analyzed = report.summaries.len(),
        failed = report.failures.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Skeleton analysis complete"
    );
    report
}

/// Feature rows of the graph of object `label`.
///
/// Node coordinates are in image coordinates. A label with no pixels yields
/// no rows.
pub fn analyze_skeleton_network(
    skeleton: &Raster<u32>,
    label: u32,
    config: &AnalysisConfig,
) -> Result<Vec<FeatureRow>> {
    let Some(region) = single_region(skeleton, label) else {
        config.connectivity_for(skeleton.ndim())?;
        return Ok(Vec::new());
    };
    let analysis = analyze_object(&region, config)?;
    Ok(network_features(&analysis.graph))
}

/// Runs [`analyze_object`], mapping an empty object to a zero summary.
fn summarize(region: &Region, config: &AnalysisConfig) -> Result<SkeletonSummary> {
    match analyze_object(region, config) {
        Ok(analysis) => Ok(analysis.summary),
        Err(toska_topology::Error::Core(toska_core::Error::EmptyObject)) => {
            Ok(SkeletonSummary::empty(region.label))
        }
        Err(error) => Err(error),
    }
}

fn single_region(skeleton: &Raster<u32>, label: u32) -> Option<Region> {
    if label == 0 {
        return None;
    }
    let only = skeleton.map(|&v| if v == label { label } else { 0 });
    regions(&only).into_iter().next()
}
