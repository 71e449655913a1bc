//! 4x4 homogeneous transforms and the image<->camera coordinate maps.
//!
//! All rotations here pivot about an arbitrary point rather than the
//! origin: `translate(-c) * R * translate(+c)`, expanded algebraically
//! so the translation column is computed directly instead of via three
//! matrix multiplications.

use nalgebra::Matrix4;

/// Rotation about the X axis by `angle` radians, pivoting at `c`.
pub fn rotation_x(c: [f64; 3], angle: f64) -> Matrix4<f64> {
    let (y, z) = (c[1], c[2]);
    let (s, co) = angle.sin_cos();
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, co, -s, y * (1.0 - co) + z * s,
        0.0, s, co, z * (1.0 - co) - y * s,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about the Y axis by `angle` radians, pivoting at `c`.
pub fn rotation_y(c: [f64; 3], angle: f64) -> Matrix4<f64> {
    let (x, z) = (c[0], c[2]);
    let (s, co) = angle.sin_cos();
    Matrix4::new(
        co, 0.0, s, x * (1.0 - co) - z * s,
        0.0, 1.0, 0.0, 0.0,
        -s, 0.0, co, z * (1.0 - co) + x * s,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about the Z axis by `angle` radians, pivoting at `c`.
pub fn rotation_z(c: [f64; 3], angle: f64) -> Matrix4<f64> {
    let (x, y) = (c[0], c[1]);
    let (s, co) = angle.sin_cos();
    Matrix4::new(
        co, -s, 0.0, x * (1.0 - co) + y * s,
        s, co, 0.0, y * (1.0 - co) - x * s,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// A rotation axis, used by the incremental-rotation heuristic in
/// [`crate::transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn rotation(self, pivot: [f64; 3], angle: f64) -> Matrix4<f64> {
        match self {
            Axis::X => rotation_x(pivot, angle),
            Axis::Y => rotation_y(pivot, angle),
            Axis::Z => rotation_z(pivot, angle),
        }
    }
}

/// Maps a detector pixel `(i, j)` to its position in the camera frame.
///
/// `origin` is `(Ox, Oy, -SDD)`, precomputed once per detector
/// configuration (`Ox = -px*(Dx-1)/2`, `Oy = -py*(Dy-1)/2`).
#[inline]
pub fn pixel_to_camera(i: f64, j: f64, origin: (f64, f64, f64), pitch: (f64, f64)) -> [f64; 3] {
    [origin.0 + i * pitch.0, origin.1 + j * pitch.1, origin.2]
}

/// Inverse of [`pixel_to_camera`] restricted to the (x, y) plane; `z`
/// is implied by the detector's fixed `-SDD` depth and is not returned.
#[inline]
pub fn camera_to_pixel(cam: (f64, f64), origin: (f64, f64, f64), pitch: (f64, f64)) -> (f64, f64) {
    ((cam.0 - origin.0) / pitch.0, (cam.1 - origin.1) / pitch.1)
}

/// Dehomogenises a `Vector4`, dividing through by `w`.
#[inline]
pub fn dehomogenize(v: nalgebra::Vector4<f64>) -> [f64; 3] {
    [v[0] / v[3], v[1] / v[3], v[2] / v[3]]
}
