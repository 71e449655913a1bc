//! The CT voxel grid. Immutable for the duration of a render; shared
//! read-only across tile workers.

use std::sync::Arc;

/// Dense 3-D grid of signed 16-bit Hounsfield-unit samples.
///
/// Storage order is `index(i, j, k) = i + j*Vx + k*Vx*Vy`, `i` fastest.
#[derive(Clone)]
pub struct Volume {
    data: Arc<[i16]>,
    dims: (usize, usize, usize),
    spacing: (f64, f64, f64),
}

impl Volume {
    pub fn new(data: impl Into<Arc<[i16]>>, dims: (usize, usize, usize), spacing: (f64, f64, f64)) -> Self {
        let data = data.into();
        debug_assert_eq!(data.len(), dims.0 * dims.1 * dims.2, "volume buffer does not match dims");
        Self { data, dims, spacing }
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        self.dims
    }

    #[inline]
    pub fn spacing(&self) -> (f64, f64, f64) {
        self.spacing
    }

    /// Physical extent of the volume box in millimetres: `(Vx*sx, Vy*sy, Vz*sz)`.
    #[inline]
    pub fn extent_mm(&self) -> (f64, f64, f64) {
        (
            self.dims.0 as f64 * self.spacing.0,
            self.dims.1 as f64 * self.spacing.1,
            self.dims.2 as f64 * self.spacing.2,
        )
    }

    /// Geometric centre of the volume, the default isocentre.
    #[inline]
    pub fn geometric_centre(&self) -> [f64; 3] {
        let e = self.extent_mm();
        [e.0 / 2.0, e.1 / 2.0, e.2 / 2.0]
    }

    #[inline]
    pub fn in_bounds(&self, i: i64, j: i64, k: i64) -> bool {
        i >= 0 && j >= 0 && k >= 0 && (i as usize) < self.dims.0 && (j as usize) < self.dims.1 && (k as usize) < self.dims.2
    }

    /// Reads a voxel. Caller must have checked [`Volume::in_bounds`].
    #[inline]
    pub fn get(&self, i: i64, j: i64, k: i64) -> i16 {
        let idx = i as usize + j as usize * self.dims.0 + k as usize * self.dims.0 * self.dims.1;
        self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometric_centre_matches_half_extent() {
        let v = Volume::new(vec![0i16; 4 * 4 * 4], (4, 4, 4), (2.0, 2.0, 2.0));
        assert_eq!(v.geometric_centre(), [4.0, 4.0, 4.0]);
    }

    #[test]
    fn storage_order_is_i_fastest() {
        let mut data = vec![0i16; 2 * 3 * 1];
        data[1 + 1 * 2] = 7;
        let v = Volume::new(data, (2, 3, 1), (1.0, 1.0, 1.0));
        assert_eq!(v.get(1, 1, 0), 7);
        assert_eq!(v.get(0, 1, 0), 0);
    }

    #[test]
    fn bounds_check_rejects_negative_and_overflowing_indices() {
        let v = Volume::new(vec![0i16; 8], (2, 2, 2), (1.0, 1.0, 1.0));
        assert!(v.in_bounds(1, 1, 1));
        assert!(!v.in_bounds(-1, 0, 0));
        assert!(!v.in_bounds(2, 0, 0));
    }
}
