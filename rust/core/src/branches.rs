// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Branch labeling: connected runs of chain pixels.
//!
//! Chain pixels are flooded through the classifier's links, so a bend shortcut
//! never merges two arms that only touch diagonally around a corner. Branch
//! labels run `1..=count` in scan order of each branch's first pixel.

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::classify::{classify, ClassifiedSkeleton, PointKind};
use crate::error::{Error, Result};
use crate::kernel::Connectivity;
use crate::raster::Raster;
use crate::region::regions;

/// Branch label map of one object.
#[derive(Debug, Clone)]
pub struct BranchLabels {
    /// Same shape as the classification; 0 off-branch.
    pub labels: Raster<u32>,
    pub count: u32,
    /// Pixel count of branch `b` at `lengths[b - 1]`.
    pub lengths: Vec<usize>,
}

impl BranchLabels {
    /// Pixel count of a branch label.
    pub fn length(&self, branch: u32) -> Option<usize> {
        branch
            .checked_sub(1)
            .and_then(|b| self.lengths.get(b as usize).copied())
    }
}

/// Labels the chain pixels of one classified object.
///
/// Unlike plain component labeling with the kernel's structuring element
/// (see [`crate::label_components`]), the flood only follows links, so two
/// arms whose chain pixels touch across a bridged bend keep separate labels.
/// This keeps one label per arm, and each arm becomes one graph edge.
pub fn label_object_branches(classified: &ClassifiedSkeleton) -> BranchLabels {
    let chain = PointKind::Chain.code();
    let is_chain: Vec<bool> = classified.kinds().data().iter().map(|&c| c == chain).collect();
    flood_chains(classified, &is_chain)
}

fn flood_chains(classified: &ClassifiedSkeleton, is_chain: &[bool]) -> BranchLabels {
    let mut labels = classified.kinds().map(|_| 0u32);
    let mut lengths = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..is_chain.len() {
        if !is_chain[start] || labels.data()[start] != 0 {
            continue;
        }
        let label = lengths.len() as u32 + 1;
        let mut length = 1;
        labels.data_mut()[start] = label;
        queue.push_back(start);

        while let Some(index) = queue.pop_front() {
            for next in classified.linked(index) {
                if is_chain[next] && labels.data()[next] == 0 {
                    labels.data_mut()[next] = label;
                    length += 1;
                    queue.push_back(next);
                }
            }
        }
        lengths.push(length);
    }

    BranchLabels {
        count: lengths.len() as u32,
        labels,
        lengths,
    }
}

/// Labels the branches of every object of a labeled skeleton raster.
///
/// `parsed` holds the classification codes of the whole raster (see
/// [`crate::parse_all_skeletons`]); its chain pixels are grouped per object
/// label, with branch labels restarting at 1 for every object.
pub fn label_branches(
    parsed: &Raster<u8>,
    labeled: &Raster<u32>,
    connectivity: Connectivity,
) -> Result<Raster<u32>> {
    if !parsed.same_shape(labeled) {
        return Err(Error::ShapeMismatch {
            shape: labeled.shape().to_vec(),
            expected: labeled.len(),
            actual: parsed.len(),
        });
    }
    let connectivity = connectivity.check_ndim(labeled.ndim())?;
    let chain = PointKind::Chain.code();

    let objects: Vec<Result<_>> = regions(labeled)
        .into_par_iter()
        .map(|region| {
            let classified = classify(&region.mask.padded(1), connectivity)?;
            let codes = parsed.crop(&region.bbox).padded(1);
            let mask = region.mask.padded(1);
            let is_chain: Vec<bool> = codes
                .data()
                .iter()
                .zip(mask.data())
                .map(|(&code, &inside)| inside && code == chain)
                .collect();
            let branches = flood_chains(&classified, &is_chain);
            Ok((region.bbox.min, branches.labels.unpadded(1)))
        })
        .collect();

    let mut out = labeled.map(|_| 0u32);
    for object in objects {
        let (origin, labels) = object?;
        out.paste_where(&labels, origin, |&l| l != 0);
    }
    Ok(out)
}
