// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for raster handling and skeleton classification.

use crate::kernel::Connectivity;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or classifying a skeleton.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The connectivity family does not match the raster rank (e.g. `n6` on a 2D raster).
    #[error("connectivity {connectivity} needs a {expected}D raster, got a {actual}D raster")]
    InvalidConnectivity {
        connectivity: Connectivity,
        expected: usize,
        actual: usize,
    },

    /// The connectivity identifier is not one of `n4`, `n8`, `n6`, `n18`, `n26`.
    #[error("unknown connectivity '{0}', expected one of n4, n8, n6, n18, n26")]
    UnknownConnectivity(String),

    /// Only 2D and 3D rasters are supported.
    #[error("rasters must be 2D or 3D, got {0}D")]
    UnsupportedDimensions(usize),

    /// The data length does not match the product of the shape.
    #[error("shape {shape:?} holds {expected} elements, got {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// A structuring element must be a 3-wide window of the labeled raster's rank.
    #[error("structuring element of shape {shape:?} does not fit a {ndim}D raster")]
    InvalidStructure { shape: Vec<usize>, ndim: usize },

    /// The object has no foreground pixels.
    #[error("object has no skeleton pixels")]
    EmptyObject,

    /// A skeleton pixel has a neighborhood outside the thin-pattern tables.
    ///
    /// This almost always means the input was not thinned to one pixel width.
    #[error("malformed skeleton at {voxel:?}: neighborhood {window:#x} is not a thin pattern")]
    MalformedSkeleton { voxel: Vec<usize>, window: u32 },
}
