// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Toska Core
//!
//! Pixel-level topology of thin skeletons in 2D and 3D rasters.
//!
//! ## Overview
//!
//! This crate provides the raster side of skeleton analysis:
//!
//! - **Rasters**: dense 2D/3D [`Raster`] storage with crop, pad and paste
//! - **Regions**: per-label bounding boxes and masks via [`regions`]
//! - **Kernels**: the `n4`/`n8` (2D) and `n6`/`n18`/`n26` (3D) neighborhoods
//!   with compile-time pattern tables
//! - **Classification**: endpoint / chain / branch tags per skeleton pixel
//! - **Branches**: chain pixels grouped into labeled branches
//!
//! ## Quick Start
//!
//! ```rust
//! use toska_core::{classify, label_object_branches, Connectivity, PointKind, Raster};
//!
//! #[rustfmt::skip]
//! let mask = Raster::from_vec(&[3, 6], vec![
//!     false, false, false, false, false, false,
//!     false, true,  true,  true,  true,  false,
//!     false, false, false, false, false, false,
//! ]).unwrap();
//!
//! let classified = classify(&mask, Connectivity::N8).unwrap();
//! assert_eq!(classified.count(PointKind::Endpoint), 2);
//! assert_eq!(classified.count(PointKind::Chain), 2);
//!
//! let branches = label_object_branches(&classified);
//! assert_eq!(branches.count, 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for rasters and tags

pub mod branches;
pub mod classify;
pub mod error;
pub mod kernel;
pub mod labeling;
pub mod parse;
pub mod raster;
pub mod region;

pub use branches::{label_branches, label_object_branches, BranchLabels};
pub use classify::{classify, parse_single_skeleton, ClassifiedPoint, ClassifiedSkeleton, PointKind};
pub use error::{Error, Result};
pub use kernel::{Connectivity, Kernel};
pub use labeling::label_components;
pub use parse::parse_all_skeletons;
pub use raster::{Offset, Raster, Voxel};
pub use region::{regions, BoundingBox, Region};
