// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dense 2D/3D rasters.
//!
//! A [`Raster`] stores its elements row-major (slice-major in 3D). 2D rasters
//! are kept as a single plane of a 3D raster so that every algorithm in the
//! workspace walks one `[z, y, x]` coordinate space; [`Raster::shape`] and
//! [`Raster::coords`] hide the extra axis again.

use crate::error::{Error, Result};
use crate::region::BoundingBox;

/// A `[z, y, x]` voxel coordinate. `z` is always 0 for 2D rasters.
pub type Voxel = [usize; 3];

/// A relative `[dz, dy, dx]` offset.
pub type Offset = [isize; 3];

/// Dense N-D (2D or 3D) raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster<T> {
    ndim: usize,
    /// `[planes, rows, cols]`; `planes == 1` for 2D.
    extents: [usize; 3],
    data: Vec<T>,
}

impl<T> Raster<T> {
    /// Wraps `data` laid out row-major in a raster of the given shape.
    pub fn from_vec(shape: &[usize], data: Vec<T>) -> Result<Self> {
        let extents = extents_for(shape)?;
        let expected: usize = extents.iter().product();
        if expected != data.len() {
            return Err(Error::ShapeMismatch {
                shape: shape.to_vec(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            ndim: shape.len(),
            extents,
            data,
        })
    }

    /// Builds a raster from already validated parts.
    pub(crate) fn from_parts(ndim: usize, extents: [usize; 3], data: Vec<T>) -> Self {
        debug_assert_eq!(extents.iter().product::<usize>(), data.len());
        Self {
            ndim,
            extents,
            data,
        }
    }

    /// Number of axes (2 or 3).
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Shape as given at construction (`[rows, cols]` or `[planes, rows, cols]`).
    pub fn shape(&self) -> &[usize] {
        &self.extents[3 - self.ndim..]
    }

    /// Shape padded to three axes.
    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Linear index of a voxel. The voxel must be in bounds.
    #[inline]
    pub fn index_of(&self, voxel: Voxel) -> usize {
        (voxel[0] * self.extents[1] + voxel[1]) * self.extents[2] + voxel[2]
    }

    /// Voxel of a linear index.
    #[inline]
    pub fn voxel_of(&self, index: usize) -> Voxel {
        let plane = self.extents[1] * self.extents[2];
        let rem = index % plane;
        [index / plane, rem / self.extents[2], rem % self.extents[2]]
    }

    /// Returns the element at `voxel`, or `None` when out of bounds.
    pub fn get(&self, voxel: Voxel) -> Option<&T> {
        if self.contains(voxel) {
            self.data.get(self.index_of(voxel))
        } else {
            None
        }
    }

    /// Returns `true` if `voxel` lies inside the raster.
    pub fn contains(&self, voxel: Voxel) -> bool {
        voxel
            .iter()
            .zip(self.extents.iter())
            .all(|(&c, &extent)| c < extent)
    }

    /// Steps from `voxel` by `offset`, returning `None` when leaving the raster.
    #[inline]
    pub fn neighbor(&self, voxel: Voxel, offset: Offset) -> Option<Voxel> {
        let mut out = [0usize; 3];
        for axis in 0..3 {
            let c = voxel[axis] as isize + offset[axis];
            if c < 0 || c as usize >= self.extents[axis] {
                return None;
            }
            out[axis] = c as usize;
        }
        Some(out)
    }

    /// Coordinates of `voxel` with only the raster's own axes.
    pub fn coords(&self, voxel: Voxel) -> Vec<usize> {
        voxel[3 - self.ndim..].to_vec()
    }

    /// Returns `true` if both rasters have the same rank and shape.
    pub fn same_shape<U>(&self, other: &Raster<U>) -> bool {
        self.ndim == other.ndim && self.extents == other.extents
    }

    /// Applies `f` to every element.
    pub fn map<U, F>(&self, f: F) -> Raster<U>
    where
        F: FnMut(&T) -> U,
    {
        Raster {
            ndim: self.ndim,
            extents: self.extents,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Builds a raster of the same shape from a function of the linear index.
    pub fn map_indexed<U, F>(&self, f: F) -> Raster<U>
    where
        F: FnMut(usize) -> U,
    {
        Raster {
            ndim: self.ndim,
            extents: self.extents,
            data: (0..self.data.len()).map(f).collect(),
        }
    }

    /// Iterates `(voxel, element)` pairs in scan order.
    pub fn iter_voxels(&self) -> impl Iterator<Item = (Voxel, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(index, value)| (self.voxel_of(index), value))
    }
}

impl<T: Clone> Raster<T> {
    /// Creates a raster of the given shape with every element set to `value`.
    pub fn filled(shape: &[usize], value: T) -> Result<Self> {
        let extents = extents_for(shape)?;
        Ok(Self {
            ndim: shape.len(),
            extents,
            data: vec![value; extents.iter().product()],
        })
    }

    /// Copies the elements inside `bbox`.
    pub fn crop(&self, bbox: &BoundingBox) -> Raster<T> {
        let size = bbox.extents();
        let mut data = Vec::with_capacity(size.iter().product());
        for z in bbox.min[0]..bbox.max[0] {
            for y in bbox.min[1]..bbox.max[1] {
                let start = self.index_of([z, y, bbox.min[2]]);
                data.extend_from_slice(&self.data[start..start + size[2]]);
            }
        }
        Raster {
            ndim: self.ndim,
            extents: size,
            data,
        }
    }

    /// Writes every element of `src` for which `keep` holds at `origin`.
    ///
    /// Elements of `src` falling outside `self` are skipped.
    pub fn paste_where<F>(&mut self, src: &Raster<T>, origin: Voxel, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        for (index, value) in src.data.iter().enumerate() {
            if !keep(value) {
                continue;
            }
            let local = src.voxel_of(index);
            let target = [
                origin[0] + local[0],
                origin[1] + local[1],
                origin[2] + local[2],
            ];
            if self.contains(target) {
                let at = self.index_of(target);
                self.data[at] = value.clone();
            }
        }
    }
}

impl<T: Clone + Default> Raster<T> {
    /// Creates a raster of the given shape filled with `T::default()`.
    pub fn new(shape: &[usize]) -> Result<Self> {
        Self::filled(shape, T::default())
    }

    /// Surrounds the raster with `width` background elements on every own axis.
    pub fn padded(&self, width: usize) -> Raster<T> {
        let mut extents = self.extents;
        for extent in &mut extents[3 - self.ndim..] {
            *extent += 2 * width;
        }
        let mut out = Raster {
            ndim: self.ndim,
            extents,
            data: vec![T::default(); extents.iter().product()],
        };
        let origin = self.pad_origin(width);
        out.paste_where(self, origin, |_| true);
        out
    }

    /// Removes `width` elements from both ends of every own axis.
    pub fn unpadded(&self, width: usize) -> Raster<T> {
        let origin = self.pad_origin(width);
        let mut max = self.extents;
        for axis in 3 - self.ndim..3 {
            max[axis] = self.extents[axis].saturating_sub(width).max(origin[axis]);
        }
        self.crop(&BoundingBox { min: origin, max })
    }

    fn pad_origin(&self, width: usize) -> Voxel {
        let mut origin = [0usize; 3];
        for axis in 3 - self.ndim..3 {
            origin[axis] = width;
        }
        origin
    }
}

fn extents_for(shape: &[usize]) -> Result<[usize; 3]> {
    match *shape {
        [rows, cols] => Ok([1, rows, cols]),
        [planes, rows, cols] => Ok([planes, rows, cols]),
        _ => Err(Error::UnsupportedDimensions(shape.len())),
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Raster;

    #[derive(Serialize)]
    struct RasterRef<'a, T> {
        shape: &'a [usize],
        data: &'a [T],
    }

    #[derive(Deserialize)]
    struct RasterOwned<T> {
        shape: Vec<usize>,
        data: Vec<T>,
    }

    impl<T: Serialize> Serialize for Raster<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            RasterRef {
                shape: self.shape(),
                data: &self.data,
            }
            .serialize(serializer)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for Raster<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = RasterOwned::<T>::deserialize(deserializer)?;
            Raster::from_vec(&raw.shape, raw.data).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_rank() {
        assert_eq!(
            Raster::<u8>::new(&[4]).unwrap_err(),
            Error::UnsupportedDimensions(1)
        );
        assert!(Raster::<u8>::new(&[2, 2, 2, 2]).is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Raster::from_vec(&[2, 3], vec![0u8; 5]).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                shape: vec![2, 3],
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn index_voxel_roundtrip_3d() {
        let r = Raster::<u8>::new(&[2, 3, 4]).unwrap();
        for index in 0..r.len() {
            assert_eq!(r.index_of(r.voxel_of(index)), index);
        }
        assert_eq!(r.voxel_of(13), [1, 0, 1]);
    }

    #[test]
    fn shape_hides_plane_axis_in_2d() {
        let r = Raster::<u8>::new(&[3, 5]).unwrap();
        assert_eq!(r.shape(), &[3, 5]);
        assert_eq!(r.extents(), [1, 3, 5]);
        assert_eq!(r.coords([0, 2, 4]), vec![2, 4]);
    }

    #[test]
    fn neighbor_stops_at_border() {
        let r = Raster::<u8>::new(&[3, 3]).unwrap();
        assert_eq!(r.neighbor([0, 0, 0], [0, -1, 0]), None);
        assert_eq!(r.neighbor([0, 0, 0], [0, 1, 1]), Some([0, 1, 1]));
        assert_eq!(r.neighbor([0, 1, 1], [1, 0, 0]), None);
    }

    #[test]
    fn pad_and_unpad_2d() {
        let r = Raster::from_vec(&[2, 2], vec![1u8, 2, 3, 4]).unwrap();
        let p = r.padded(1);
        assert_eq!(p.shape(), &[4, 4]);
        assert_eq!(p.get([0, 1, 1]), Some(&1));
        assert_eq!(p.get([0, 2, 2]), Some(&4));
        assert_eq!(p.get([0, 0, 0]), Some(&0));
        assert_eq!(p.unpadded(1), r);
    }

    #[test]
    fn pad_3d_touches_every_axis() {
        let r = Raster::filled(&[1, 1, 1], true).unwrap();
        let p = r.padded(1);
        assert_eq!(p.shape(), &[3, 3, 3]);
        assert_eq!(p.data().iter().filter(|&&v| v).count(), 1);
        assert_eq!(p.get([1, 1, 1]), Some(&true));
    }

    #[test]
    fn crop_copies_window() {
        let r = Raster::from_vec(&[3, 3], (0u8..9).collect()).unwrap();
        let c = r.crop(&BoundingBox {
            min: [0, 1, 1],
            max: [1, 3, 3],
        });
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.data(), &[4, 5, 7, 8]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_validates_shape() {
        let ok: Raster<u32> = serde_json::from_str(r#"{"shape":[1,2],"data":[0,7]}"#).unwrap();
        assert_eq!(ok.get([0, 0, 1]), Some(&7));
        let bad = serde_json::from_str::<Raster<u32>>(r#"{"shape":[2,2],"data":[0]}"#);
        assert!(bad.is_err());
    }
}
