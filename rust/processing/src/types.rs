// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Result records of skeleton analysis.

use serde::{Deserialize, Serialize};

/// Summary measures of one skeleton object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonSummary {
    pub skeleton_id: u32,
    /// Same as `skeleton_id`; kept so tables can be joined on `label`.
    pub label: u32,
    /// Endpoint nodes.
    pub n_endpoints: usize,
    /// Junction nodes, including synthesized ring anchors.
    pub n_branch_points: usize,
    pub n_nodes: usize,
    pub n_branches: usize,
    pub spine_length: usize,
    pub n_cycle_basis: usize,
    pub n_possible_undirected_cycles: u64,
    pub n_components: usize,
    pub cycles_saturated: bool,
}

impl SkeletonSummary {
    /// All-zero summary for an object without skeleton pixels.
    pub fn empty(label: u32) -> Self {
        Self {
            skeleton_id: label,
            label,
            ..Self::default()
        }
    }
}

/// An object whose analysis failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectFailure {
    pub label: u32,
    pub error: String,
}

/// Analysis of every object of a labeled raster, sorted by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonReport {
    pub summaries: Vec<SkeletonSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ObjectFailure>,
}

impl SkeletonReport {
    /// Summary of one object label.
    pub fn summary(&self, label: u32) -> Option<&SkeletonSummary> {
        self.summaries
            .binary_search_by_key(&label, |s| s.label)
            .ok()
            .map(|i| &self.summaries[i])
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Pretty JSON of the whole report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_keeps_ids() {
        let s = SkeletonSummary::empty(9);
        assert_eq!((s.skeleton_id, s.label), (9, 9));
        assert_eq!(s.n_nodes, 0);
        assert!(!s.cycles_saturated);
    }

    #[test]
    fn report_lookup_and_json() {
        let report = SkeletonReport {
            summaries: vec![SkeletonSummary::empty(2), SkeletonSummary::empty(5)],
            failures: Vec::new(),
        };
        assert_eq!(report.summary(5).map(|s| s.label), Some(5));
        assert!(report.summary(3).is_none());
        assert!(report.is_complete());

        let json = report.to_json().unwrap();
        assert!(json.contains("\"n_possible_undirected_cycles\""));
        assert!(!json.contains("failures"));
        let back: SkeletonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
