// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pixel-topology classification of a single-object skeleton.
//!
//! Every foreground pixel is tagged from its own window state only (see
//! [`crate::kernel`]), so pixels are classified independently and in
//! parallel. Besides the tags, the result keeps the raw kernel neighbor count
//! and the link mask of every pixel; the branch labeler and the graph builder
//! walk the skeleton through those links.

use rayon::prelude::*;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::kernel::{Connectivity, Kernel, MALFORMED};
use crate::raster::{Raster, Voxel};

/// Topology tag of a skeleton pixel. The discriminants are the codes used in
/// parsed skeleton rasters (background is 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PointKind {
    /// Terminal tip (or an isolated pixel).
    Endpoint = 1,
    /// Pixel inside a branch.
    Chain = 2,
    /// Junction pixel where three or more arms meet.
    Branch = 3,
}

impl PointKind {
    /// Decodes a parsed-skeleton code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PointKind::Endpoint),
            2 => Some(PointKind::Chain),
            3 => Some(PointKind::Branch),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A skeleton pixel and its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedPoint {
    pub voxel: Voxel,
    pub kind: PointKind,
}

/// Classification of one object's skeleton window.
#[derive(Debug, Clone)]
pub struct ClassifiedSkeleton {
    connectivity: Connectivity,
    kinds: Raster<u8>,
    neighbor_counts: Raster<u8>,
    links: Raster<u32>,
}

/// Per-pixel result of the parallel pass.
#[derive(Clone, Copy, Default)]
struct PixelClass {
    code: u8,
    count: u8,
    links: u32,
    state: u32,
}

/// Classifies every foreground pixel of `skeleton`.
///
/// `skeleton` is normally a cropped object window padded by one background
/// pixel; pixels outside the raster are treated as background either way.
/// An all-background raster yields an empty classification.
///
/// # Errors
///
/// [`Error::InvalidConnectivity`] if `connectivity` does not fit the raster
/// rank, [`Error::MalformedSkeleton`] for the first (in scan order) pixel
/// sitting in a thick block.
pub fn classify(skeleton: &Raster<bool>, connectivity: Connectivity) -> Result<ClassifiedSkeleton> {
    let connectivity = connectivity.check_ndim(skeleton.ndim())?;
    let kernel = connectivity.kernel();

    let pixels: Vec<PixelClass> = (0..skeleton.len())
        .into_par_iter()
        .with_min_len(1024)
        .map(|index| classify_pixel(kernel, skeleton, index))
        .collect();

    if let Some(index) = pixels.iter().position(|p| p.code == MALFORMED) {
        return Err(Error::MalformedSkeleton {
            voxel: skeleton.coords(skeleton.voxel_of(index)),
            window: pixels[index].state,
        });
    }

    Ok(ClassifiedSkeleton {
        connectivity,
        kinds: skeleton.map_indexed(|index| pixels[index].code),
        neighbor_counts: skeleton.map_indexed(|index| pixels[index].count),
        links: skeleton.map_indexed(|index| pixels[index].links),
    })
}

fn classify_pixel(kernel: &Kernel, skeleton: &Raster<bool>, index: usize) -> PixelClass {
    if !skeleton.data()[index] {
        return PixelClass::default();
    }
    let state = kernel.window_state(skeleton, skeleton.voxel_of(index));
    PixelClass {
        code: kernel.classify_state(state),
        count: (state & kernel.members()).count_ones() as u8,
        links: kernel.link_mask(state),
        state,
    }
}

impl ClassifiedSkeleton {
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn kernel(&self) -> &'static Kernel {
        self.connectivity.kernel()
    }

    /// Tag codes per pixel (0 = background, else a [`PointKind`] code).
    pub fn kinds(&self) -> &Raster<u8> {
        &self.kinds
    }

    pub fn into_kinds(self) -> Raster<u8> {
        self.kinds
    }

    /// Raw number of foreground kernel neighbors per pixel.
    pub fn neighbor_counts(&self) -> &Raster<u8> {
        &self.neighbor_counts
    }

    /// Link masks per pixel, over the kernel's window bits.
    pub fn links(&self) -> &Raster<u32> {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foreground_count() == 0
    }

    /// Tag of the pixel at a linear index.
    pub fn kind(&self, index: usize) -> Option<PointKind> {
        PointKind::from_code(self.kinds.data()[index])
    }

    /// Linear indices of the pixels linked to `index`.
    pub fn linked(&self, index: usize) -> SmallVec<[usize; 8]> {
        let voxel = self.kinds.voxel_of(index);
        self.kernel()
            .linked_offsets(self.links.data()[index])
            .filter_map(|offset| self.kinds.neighbor(voxel, offset))
            .map(|n| self.kinds.index_of(n))
            .collect()
    }

    /// Linear indices of the foreground kernel neighbors of `index`, linked or
    /// bridged.
    pub fn adjacent(&self, index: usize) -> SmallVec<[usize; 26]> {
        let voxel = self.kinds.voxel_of(index);
        self.kernel()
            .offsets()
            .into_iter()
            .filter_map(|offset| self.kinds.neighbor(voxel, offset))
            .map(|n| self.kinds.index_of(n))
            .filter(|&n| self.kinds.data()[n] != 0)
            .collect()
    }

    /// Number of pixels carrying `kind`.
    pub fn count(&self, kind: PointKind) -> usize {
        let code = kind.code();
        self.kinds.data().iter().filter(|&&c| c == code).count()
    }

    pub fn foreground_count(&self) -> usize {
        self.kinds.data().iter().filter(|&&c| c != 0).count()
    }

    /// Classified pixels in scan order.
    pub fn points(&self) -> impl Iterator<Item = ClassifiedPoint> + '_ {
        self.kinds.iter_voxels().filter_map(|(voxel, &code)| {
            PointKind::from_code(code).map(|kind| ClassifiedPoint { voxel, kind })
        })
    }
}

/// Classifies the skeleton of object `label` inside a labeled raster.
///
/// Returns the parsed codes (0 background, 1 endpoint, 2 chain, 3 branch).
pub fn parse_single_skeleton(
    skeleton: &Raster<u32>,
    label: u32,
    connectivity: Connectivity,
) -> Result<Raster<u8>> {
    let mask = skeleton.map(|&v| v == label);
    Ok(classify(&mask, connectivity)?.into_kinds())
}
