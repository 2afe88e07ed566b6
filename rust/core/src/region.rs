// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region properties of labeled rasters.
//!
//! [`regions`] plays the role of a classic `regionprops` call: for every
//! positive label it reports the bounding box and the binary mask of that
//! box. The analysis never derives bounding boxes itself; it only consumes
//! these records.

use rustc_hash::FxHashMap;

use crate::raster::{Raster, Voxel};

/// Axis-aligned box with inclusive `min` and exclusive `max`, in `[z, y, x]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: Voxel,
    pub max: Voxel,
}

impl BoundingBox {
    /// A box holding exactly one voxel.
    pub fn around(voxel: Voxel) -> Self {
        Self {
            min: voxel,
            max: [voxel[0] + 1, voxel[1] + 1, voxel[2] + 1],
        }
    }

    /// Grows the box to include `voxel`.
    pub fn include(&mut self, voxel: Voxel) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(voxel[axis]);
            self.max[axis] = self.max[axis].max(voxel[axis] + 1);
        }
    }

    /// Size along each axis.
    pub fn extents(&self) -> [usize; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn contains(&self, voxel: Voxel) -> bool {
        (0..3).all(|axis| voxel[axis] >= self.min[axis] && voxel[axis] < self.max[axis])
    }
}

/// One labeled object of a raster.
#[derive(Debug, Clone)]
pub struct Region {
    pub label: u32,
    pub bbox: BoundingBox,
    /// Mask of `bbox`: `true` where the raster holds `label`.
    pub mask: Raster<bool>,
    /// Number of voxels carrying `label`.
    pub area: usize,
}

/// Collects the regions of every positive label, sorted by label.
pub fn regions(labels: &Raster<u32>) -> Vec<Region> {
    let mut boxes: FxHashMap<u32, (BoundingBox, usize)> = FxHashMap::default();
    for (voxel, &label) in labels.iter_voxels() {
        if label == 0 {
            continue;
        }
        boxes
            .entry(label)
            .and_modify(|(bbox, area)| {
                bbox.include(voxel);
                *area += 1;
            })
            .or_insert((BoundingBox::around(voxel), 1));
    }

    let mut found: Vec<(u32, BoundingBox, usize)> = boxes
        .into_iter()
        .map(|(label, (bbox, area))| (label, bbox, area))
        .collect();
    found.sort_unstable_by_key(|&(label, _, _)| label);

    found
        .into_iter()
        .map(|(label, bbox, area)| Region {
            label,
            bbox,
            mask: labels.crop(&bbox).map(|&v| v == label),
            area,
        })
        .collect()
}
