// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connected-component labeling under a structuring element.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::raster::{Offset, Raster};

/// Labels the foreground of `mask` into connected components.
///
/// `structure` is a 3×3 (2D) or 3×3×3 (3D) window whose `true` cells, center
/// excluded, are the neighbor offsets that connect two pixels. Labels run
/// `1..=count` in scan order of each component's first pixel; background is 0.
///
/// Returns the label raster and the number of components.
pub fn label_components(mask: &Raster<bool>, structure: &Raster<bool>) -> Result<(Raster<u32>, u32)> {
    let offsets = structure_offsets(structure, mask.ndim())?;

    let mut labels = mask.map(|_| 0u32);
    let mut count = 0u32;
    let mut queue = VecDeque::new();

    for start in 0..mask.len() {
        if !mask.data()[start] || labels.data()[start] != 0 {
            continue;
        }
        count += 1;
        labels.data_mut()[start] = count;
        queue.push_back(start);

        while let Some(index) = queue.pop_front() {
            let voxel = mask.voxel_of(index);
            for &offset in &offsets {
                let Some(next) = mask.neighbor(voxel, offset) else {
                    continue;
                };
                let at = mask.index_of(next);
                if mask.data()[at] && labels.data()[at] == 0 {
                    labels.data_mut()[at] = count;
                    queue.push_back(at);
                }
            }
        }
    }

    Ok((labels, count))
}

fn structure_offsets(structure: &Raster<bool>, ndim: usize) -> Result<SmallVec<[Offset; 26]>> {
    if structure.ndim() != ndim || structure.shape().iter().any(|&extent| extent != 3) {
        return Err(Error::InvalidStructure {
            shape: structure.shape().to_vec(),
            ndim,
        });
    }
    // 2D structures live in the single plane z = 0, so dz stays 0.
    let center = structure.len() / 2;
    Ok(structure
        .iter_voxels()
        .enumerate()
        .filter(|&(index, (_, &on))| on && index != center)
        .map(|(_, (voxel, _))| {
            let mut offset = [0isize; 3];
            for axis in 3 - ndim..3 {
                offset[axis] = voxel[axis] as isize - 1;
            }
            offset
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Connectivity;

    fn mask(rows: &[&str]) -> Raster<bool> {
        let data = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        Raster::from_vec(&[rows.len(), rows[0].len()], data).unwrap()
    }

    #[test]
    fn diagonal_contact_depends_on_structure() {
        let m = mask(&["#...", ".#..", "...#"]);

        let (labels, n) = label_components(&m, &Connectivity::N4.kernel().structuring_element()).unwrap();
        assert_eq!(n, 3);
        assert_eq!(labels.data()[0], 1);
        assert_eq!(labels.data()[5], 2);
        assert_eq!(labels.data()[11], 3);

        let (labels, n) = label_components(&m, &Connectivity::N8.kernel().structuring_element()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(labels.data()[5], 1);
    }

    #[test]
    fn labels_follow_first_pixel_scan_order() {
        let m = mask(&["..#", "#.#", "#.."]);
        let (labels, n) = label_components(&m, &Connectivity::N4.kernel().structuring_element()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(labels.data(), &[0, 0, 1, 2, 0, 1, 2, 0, 0]);
    }

    #[test]
    fn three_dimensional_components() {
        let mut m = Raster::<bool>::new(&[2, 2, 2]).unwrap();
        m.data_mut()[0] = true;
        m.data_mut()[7] = true;
        let (_, n) = label_components(&m, &Connectivity::N6.kernel().structuring_element()).unwrap();
        assert_eq!(n, 2);
        let (_, n) = label_components(&m, &Connectivity::N26.kernel().structuring_element()).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn rejects_mismatched_structure() {
        let m = mask(&["#"]);
        let err = label_components(&m, &Connectivity::N6.kernel().structuring_element()).unwrap_err();
        assert_eq!(err, Error::InvalidStructure { shape: vec![3, 3, 3], ndim: 2 });
    }
}
