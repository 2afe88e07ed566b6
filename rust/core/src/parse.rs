// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-image classification of labeled skeletons.

use rayon::prelude::*;

use crate::classify::classify;
use crate::error::Result;
use crate::kernel::Connectivity;
use crate::raster::Raster;
use crate::region::regions;

/// Classifies the skeleton of every object in a labeled raster.
///
/// Each object is cropped to its bounding box, padded by one background pixel,
/// classified, and pasted back. Objects never see each other's pixels, so two
/// touching objects are classified as if alone. Returns the parsed codes
/// (0 background, 1 endpoint, 2 chain, 3 branch).
///
/// # Errors
///
/// The first failing object in label order decides the error.
pub fn parse_all_skeletons(labeled: &Raster<u32>, connectivity: Connectivity) -> Result<Raster<u8>> {
    let connectivity = connectivity.check_ndim(labeled.ndim())?;

    let objects: Vec<Result<_>> = regions(labeled)
        .into_par_iter()
        .map(|region| {
            let kinds = classify(&region.mask.padded(1), connectivity)?.into_kinds();
            Ok((region.bbox.min, kinds.unpadded(1)))
        })
        .collect();

    let mut parsed = labeled.map(|_| 0u8);
    for object in objects {
        let (origin, kinds) = object?;
        parsed.paste_where(&kinds, origin, |&code| code != 0);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn touching_objects_are_classified_separately() {
        #[rustfmt::skip]
        let labeled = Raster::from_vec(&[1, 6], vec![
            1, 1, 1, 2, 2, 2,
        ]).unwrap();
        let parsed = parse_all_skeletons(&labeled, Connectivity::N4).unwrap();
        assert_eq!(parsed.data(), &[1, 2, 1, 1, 2, 1]);
    }

    #[test]
    fn objects_at_the_border_are_padded() {
        #[rustfmt::skip]
        let labeled = Raster::from_vec(&[3, 3], vec![
            5, 0, 0,
            5, 0, 0,
            5, 5, 5,
        ]).unwrap();
        let parsed = parse_all_skeletons(&labeled, Connectivity::N8).unwrap();
        assert_eq!(parsed.data(), &[1, 0, 0, 2, 0, 0, 2, 2, 1]);
    }

    #[test]
    fn malformed_object_fails_the_parse() {
        #[rustfmt::skip]
        let labeled = Raster::from_vec(&[2, 4], vec![
            1, 1, 0, 2,
            1, 1, 0, 2,
        ]).unwrap();
        assert!(matches!(
            parse_all_skeletons(&labeled, Connectivity::N8),
            Err(Error::MalformedSkeleton { .. })
        ));
    }

    #[test]
    fn three_dimensional_labels() {
        let mut labeled = Raster::<u32>::new(&[3, 3, 3]).unwrap();
        for z in 0..3 {
            let at = labeled.index_of([z, 1, 1]);
            labeled.data_mut()[at] = 4;
        }
        let parsed = parse_all_skeletons(&labeled, Connectivity::N26).unwrap();
        assert_eq!(parsed.get([0, 1, 1]), Some(&1));
        assert_eq!(parsed.get([1, 1, 1]), Some(&2));
        assert_eq!(parsed.get([2, 1, 1]), Some(&1));
        assert!(parse_all_skeletons(&labeled, Connectivity::N8).is_err());
    }
}
