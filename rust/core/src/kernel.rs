// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connectivity kernels and their neighborhood-pattern tables.
//!
//! Every kernel is defined over the full 3×3 (2D) or 3×3×3 (3D) window
//! around a pixel. Window offsets are numbered in scan order with the center
//! left out, so a window state is a bit set: 8 bits in 2D, 26 bits in 3D.
//!
//! ## Links and bridges
//!
//! A kernel neighbor `q` of `p` only counts as an arm of `p` when no
//! foreground pixel lies strictly between them. For a diagonal neighbor in 2D
//! the two orthogonal pixels shared by `p` and `q` are its *bridges*; in 3D an
//! edge neighbor has two face bridges and a vertex neighbor has three face and
//! three edge bridges. A foreground bridge turns the `p`–`q` contact into a
//! bend of one arm instead of a second arm. Face neighbors have no bridges, so
//! `n4` and `n6` degenerate to a plain neighbor count.
//!
//! ## Thick blocks
//!
//! A fully set 2×2 square (2D) or 2×2×2 cube (3D) around a pixel cannot occur
//! in a one-pixel-wide skeleton. Those states are not part of the tables and
//! are reported as malformed.
//!
//! All masks are generated at compile time. For 2D kernels the whole 256-entry
//! state space is tabulated. A 2^26-entry table is out of reach in 3D, so there
//! the exhaustive tables are per window bit: the bridge mask of each of the 26
//! offsets and the eight corner-cube masks. Classifying a 3D state is a fixed
//! scan over those masks. Every state containing a full 2×2×2 cube therefore
//! matches one of the eight cube masks and is reported as `MalformedSkeleton`,
//! the same as a lookup table would.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::classify::PointKind;
use crate::error::{Error, Result};
use crate::raster::{Offset, Raster, Voxel};

/// Table code for states outside the thin-skeleton patterns.
pub(crate) const MALFORMED: u8 = u8::MAX;

/// Neighborhood connectivity of a skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Connectivity {
    /// 2D, edge-sharing neighbors.
    N4 = 0,
    /// 2D, edge- and corner-sharing neighbors.
    N8 = 1,
    /// 3D, face-sharing neighbors.
    N6 = 2,
    /// 3D, face- and edge-sharing neighbors.
    N18 = 3,
    /// 3D, all neighbors of the 3×3×3 cube.
    N26 = 4,
}

impl Connectivity {
    pub const ALL: [Connectivity; 5] = [
        Connectivity::N4,
        Connectivity::N8,
        Connectivity::N6,
        Connectivity::N18,
        Connectivity::N26,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Connectivity::N4 => "n4",
            Connectivity::N8 => "n8",
            Connectivity::N6 => "n6",
            Connectivity::N18 => "n18",
            Connectivity::N26 => "n26",
        }
    }

    /// Raster rank this connectivity applies to.
    pub const fn ndim(&self) -> usize {
        match self {
            Connectivity::N4 | Connectivity::N8 => 2,
            Connectivity::N6 | Connectivity::N18 | Connectivity::N26 => 3,
        }
    }

    /// Largest L1 norm of an offset in this kernel.
    const fn reach(&self) -> isize {
        match self {
            Connectivity::N4 | Connectivity::N6 => 1,
            Connectivity::N8 | Connectivity::N18 => 2,
            Connectivity::N26 => 3,
        }
    }

    /// Checks that this connectivity fits a raster of rank `ndim`.
    pub fn check_ndim(self, ndim: usize) -> Result<Self> {
        if ndim != 2 && ndim != 3 {
            return Err(Error::UnsupportedDimensions(ndim));
        }
        if self.ndim() != ndim {
            return Err(Error::InvalidConnectivity {
                connectivity: self,
                expected: self.ndim(),
                actual: ndim,
            });
        }
        Ok(self)
    }

    /// The static kernel of this connectivity.
    pub fn kernel(self) -> &'static Kernel {
        &KERNELS[self as usize]
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connectivity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n4" => Ok(Connectivity::N4),
            "n8" => Ok(Connectivity::N8),
            "n6" => Ok(Connectivity::N6),
            "n18" => Ok(Connectivity::N18),
            "n26" => Ok(Connectivity::N26),
            _ => Err(Error::UnknownConnectivity(s.to_string())),
        }
    }
}

/// A connectivity kernel with its precomputed pattern tables.
#[derive(Debug)]
pub struct Kernel {
    connectivity: Connectivity,
    ndim: usize,
    window: [Offset; 26],
    window_len: usize,
    /// Window bits belonging to the kernel.
    members: u32,
    /// Per window bit, the kernel bits strictly between the center and it.
    bridges: [u32; 26],
    /// Thick-block masks, one per window corner.
    blocks: [u32; 8],
    block_count: usize,
    /// Classification of every 8-bit state (2D kernels only).
    table: [u8; 256],
    tabulated: bool,
}

static KERNELS: [Kernel; 5] = [
    Kernel::build(Connectivity::N4),
    Kernel::build(Connectivity::N8),
    Kernel::build(Connectivity::N6),
    Kernel::build(Connectivity::N18),
    Kernel::build(Connectivity::N26),
];

impl Kernel {
    const fn build(connectivity: Connectivity) -> Self {
        let ndim = connectivity.ndim();
        let reach = connectivity.reach();
        let (window, window_len) = window_offsets(ndim);

        let mut members = 0u32;
        let mut i = 0;
        while i < window_len {
            if l1(window[i]) <= reach {
                members |= 1 << i;
            }
            i += 1;
        }

        let mut bridges = [0u32; 26];
        let mut blocks = [0u32; 8];
        let mut block_count = 0;
        let mut i = 0;
        while i < window_len {
            let mut between = 0u32;
            let mut j = 0;
            while j < window_len {
                if strictly_between(window[j], window[i]) {
                    between |= 1 << j;
                }
                j += 1;
            }
            bridges[i] = between & members;
            if l1(window[i]) == ndim as isize {
                blocks[block_count] = between | (1 << i);
                block_count += 1;
            }
            i += 1;
        }

        let mut kernel = Kernel {
            connectivity,
            ndim,
            window,
            window_len,
            members,
            bridges,
            blocks,
            block_count,
            table: [0; 256],
            tabulated: false,
        };

        if ndim == 2 {
            let mut state = 0;
            while state < 256 {
                kernel.table[state] = kernel.evaluate(state as u32);
                state += 1;
            }
            kernel.tabulated = true;
        }

        kernel
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// All offsets of the surrounding window, in bit order.
    pub fn window(&self) -> &[Offset] {
        &self.window[..self.window_len]
    }

    /// Bit set of the window offsets that belong to this kernel.
    pub fn members(&self) -> u32 {
        self.members
    }

    /// The kernel's neighbor offsets in scan order.
    pub fn offsets(&self) -> SmallVec<[Offset; 26]> {
        self.window()
            .iter()
            .enumerate()
            .filter(|&(bit, _)| self.members & (1 << bit) != 0)
            .map(|(_, &offset)| offset)
            .collect()
    }

    /// Boolean 3×3 / 3×3×3 structuring element: the center plus every kernel offset.
    pub fn structuring_element(&self) -> Raster<bool> {
        let extents = if self.ndim == 2 { [1, 3, 3] } else { [3, 3, 3] };
        let center: Voxel = if self.ndim == 2 { [0, 1, 1] } else { [1, 1, 1] };
        let mut element = Raster::from_parts(self.ndim, extents, vec![false; extents.iter().product()]);
        let at = element.index_of(center);
        element.data_mut()[at] = true;
        for offset in self.offsets() {
            if let Some(voxel) = element.neighbor(center, offset) {
                let at = element.index_of(voxel);
                element.data_mut()[at] = true;
            }
        }
        element
    }

    /// Reads the window state of `voxel`. Pixels outside the raster are background.
    pub fn window_state(&self, mask: &Raster<bool>, voxel: Voxel) -> u32 {
        let mut state = 0u32;
        for (bit, &offset) in self.window().iter().enumerate() {
            if let Some(n) = mask.neighbor(voxel, offset) {
                if mask.data()[mask.index_of(n)] {
                    state |= 1 << bit;
                }
            }
        }
        state
    }

    /// Kernel neighbors in `state` that are arms rather than bridged bends.
    pub const fn link_mask(&self, state: u32) -> u32 {
        let candidates = state & self.members;
        let mut links = 0u32;
        let mut i = 0;
        while i < self.window_len {
            let bit = 1u32 << i;
            if candidates & bit != 0 && state & self.bridges[i] == 0 {
                links |= bit;
            }
            i += 1;
        }
        links
    }

    /// Offsets of the bits set in a link mask.
    pub fn linked_offsets(&self, links: u32) -> impl Iterator<Item = Offset> + '_ {
        self.window()
            .iter()
            .enumerate()
            .filter(move |&(bit, _)| links & (1 << bit) != 0)
            .map(|(_, &offset)| offset)
    }

    /// Looks up the classification code of a window state.
    ///
    /// Returns a [`PointKind`] code, or [`MALFORMED`] for thick blocks.
    pub(crate) fn classify_state(&self, state: u32) -> u8 {
        if self.tabulated {
            self.table[(state & 0xff) as usize]
        } else {
            self.evaluate(state)
        }
    }

    /// Returns `true` if `state` contains a thick block around the center.
    pub const fn is_thick(&self, state: u32) -> bool {
        let mut b = 0;
        while b < self.block_count {
            if state & self.blocks[b] == self.blocks[b] {
                return true;
            }
            b += 1;
        }
        false
    }

    const fn evaluate(&self, state: u32) -> u8 {
        if self.is_thick(state) {
            return MALFORMED;
        }
        match self.link_mask(state).count_ones() {
            0 | 1 => PointKind::Endpoint as u8,
            2 => PointKind::Chain as u8,
            _ => PointKind::Branch as u8,
        }
    }
}

/// Window offsets around the center in scan order.
const fn window_offsets(ndim: usize) -> ([Offset; 26], usize) {
    let mut out = [[0isize; 3]; 26];
    let mut len = 0;
    let z_reach: isize = if ndim == 3 { 1 } else { 0 };
    let mut dz = -z_reach;
    while dz <= z_reach {
        let mut dy = -1;
        while dy <= 1 {
            let mut dx = -1;
            while dx <= 1 {
                if dz != 0 || dy != 0 || dx != 0 {
                    out[len] = [dz, dy, dx];
                    len += 1;
                }
                dx += 1;
            }
            dy += 1;
        }
        dz += 1;
    }
    (out, len)
}

const fn l1(offset: Offset) -> isize {
    offset[0].abs() + offset[1].abs() + offset[2].abs()
}

/// `inner` lies strictly between the origin and `outer` on the unit lattice.
const fn strictly_between(inner: Offset, outer: Offset) -> bool {
    if inner[0] == outer[0] && inner[1] == outer[1] && inner[2] == outer[2] {
        return false;
    }
    if inner[0] == 0 && inner[1] == 0 && inner[2] == 0 {
        return false;
    }
    let mut axis = 0;
    while axis < 3 {
        if inner[axis] != 0 && inner[axis] != outer[axis] {
            return false;
        }
        axis += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit_of(kernel: &Kernel, offset: Offset) -> u32 {
        let bit = kernel
            .window()
            .iter()
            .position(|&o| o == offset)
            .expect("offset in window");
        1 << bit
    }

    fn state_of(kernel: &Kernel, offsets: &[Offset]) -> u32 {
        offsets.iter().map(|&o| bit_of(kernel, o)).fold(0, |a, b| a | b)
    }

    #[test]
    fn kernel_sizes() {
        let sizes: Vec<usize> = Connectivity::ALL
            .iter()
            .map(|c| c.kernel().offsets().len())
            .collect();
        assert_eq!(sizes, vec![4, 8, 6, 18, 26]);
    }

    #[test]
    fn structuring_elements() {
        let n8 = Connectivity::N8.kernel().structuring_element();
        assert_eq!(n8.shape(), &[3, 3]);
        assert!(n8.data().iter().all(|&v| v));

        let n4 = Connectivity::N4.kernel().structuring_element();
        assert_eq!(n4.data(), &[false, true, false, true, true, true, false, true, false]);

        let n18 = Connectivity::N18.kernel().structuring_element();
        assert_eq!(n18.shape(), &[3, 3, 3]);
        assert_eq!(n18.data().iter().filter(|&&v| v).count(), 19);
        assert_eq!(n18.get([0, 0, 0]), Some(&false));
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("N18".parse::<Connectivity>().unwrap(), Connectivity::N18);
        assert_eq!(" n4 ".parse::<Connectivity>().unwrap(), Connectivity::N4);
        assert_eq!(Connectivity::N26.to_string(), "n26");
        assert_eq!(
            "n5".parse::<Connectivity>().unwrap_err(),
            Error::UnknownConnectivity("n5".into())
        );
    }

    #[test]
    fn dimensionality_must_match() {
        assert_eq!(Connectivity::N8.check_ndim(2), Ok(Connectivity::N8));
        assert_eq!(
            Connectivity::N6.check_ndim(2),
            Err(Error::InvalidConnectivity {
                connectivity: Connectivity::N6,
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            Connectivity::N4.check_ndim(4),
            Err(Error::UnsupportedDimensions(4))
        );
    }

    #[test]
    fn face_kernels_have_no_bridges() {
        for c in [Connectivity::N4, Connectivity::N6] {
            let k = c.kernel();
            let all = k.members();
            assert_eq!(k.link_mask(all), all, "{c}");
        }
    }

    #[test]
    fn diagonal_bridged_by_orthogonal_neighbor() {
        let k = Connectivity::N8.kernel();
        // West, east and south-east: the south-east contact bends through east.
        let state = state_of(k, &[[0, 0, -1], [0, 0, 1], [0, 1, 1]]);
        assert_eq!(k.link_mask(state).count_ones(), 2);
        assert_eq!(k.classify_state(state), PointKind::Chain as u8);
    }

    #[test]
    fn three_separate_arms_form_a_junction() {
        let k = Connectivity::N8.kernel();
        let state = state_of(k, &[[0, 0, -1], [0, 0, 1], [0, 1, 0]]);
        assert_eq!(k.classify_state(state), PointKind::Branch as u8);
    }

    #[test]
    fn vertex_neighbor_has_six_bridges() {
        let k = Connectivity::N26.kernel();
        let corner = bit_of(k, [1, 1, 1]);
        let bit = corner.trailing_zeros() as usize;
        assert_eq!(k.bridges[bit].count_ones(), 6);

        let n18 = Connectivity::N18.kernel();
        assert_eq!(n18.members() & corner, 0);
        let edge = bit_of(n18, [0, 1, 1]).trailing_zeros() as usize;
        assert_eq!(n18.bridges[edge].count_ones(), 2);
    }

    #[test]
    fn thick_blocks_are_malformed() {
        let k = Connectivity::N8.kernel();
        let state = state_of(k, &[[0, 0, 1], [0, 1, 0], [0, 1, 1]]);
        assert_eq!(k.classify_state(state), MALFORMED);

        let k3 = Connectivity::N26.kernel();
        let cube = state_of(
            k3,
            &[
                [0, 0, 1],
                [0, 1, 0],
                [0, 1, 1],
                [1, 0, 0],
                [1, 0, 1],
                [1, 1, 0],
                [1, 1, 1],
            ],
        );
        assert!(k3.is_thick(cube));
        assert_eq!(k3.classify_state(cube), MALFORMED);
        // A flat 2×2 plate is not a solid cube.
        let plate = state_of(k3, &[[0, 0, 1], [0, 1, 0], [0, 1, 1]]);
        assert!(!k3.is_thick(plate));
    }

    #[test]
    fn every_corner_cube_is_malformed_in_3d() {
        for c in [Connectivity::N6, Connectivity::N18, Connectivity::N26] {
            let k = c.kernel();
            assert_eq!(k.block_count, 8, "{c}");
            for corner in k.window().iter().filter(|&&o| l1(o) == 3) {
                let cube: Vec<Offset> = k
                    .window()
                    .iter()
                    .copied()
                    .filter(|&o| (0..3).all(|a| o[a] == 0 || o[a] == corner[a]))
                    .collect();
                assert_eq!(cube.len(), 7, "{c}");
                let state = state_of(k, &cube);
                assert_eq!(k.classify_state(state), MALFORMED, "{c} {corner:?}");
                // Dropping the far corner leaves a thin pattern.
                let open = state & !bit_of(k, *corner);
                assert_ne!(k.classify_state(open), MALFORMED, "{c} {corner:?}");
            }
        }
    }

    #[test]
    fn tables_match_evaluation() {
        for c in [Connectivity::N4, Connectivity::N8] {
            let k = c.kernel();
            assert!(k.tabulated);
            for state in 0..256u32 {
                assert_eq!(k.table[state as usize], k.evaluate(state));
            }
        }
        assert!(!Connectivity::N26.kernel().tabulated);
    }

    #[test]
    fn n8_links_superset_of_n4_links() {
        let n4 = Connectivity::N4.kernel();
        let n8 = Connectivity::N8.kernel();
        for state in 0..256u32 {
            if n8.is_thick(state) {
                continue;
            }
            let l4 = n4.link_mask(state);
            let l8 = n8.link_mask(state);
            assert_eq!(l4 & l8, l4, "state {state:#x}");
        }
    }
}
