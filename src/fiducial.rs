//! Fiducial projector: maps a 3-D point in the volume
//! frame onto detector pixel coordinates, reusing the transform stack
//! composed for the ray integrator.

use nalgebra::Vector4;

use crate::detector::DetectorConfig;
use crate::geometry::{camera_to_pixel, dehomogenize};
use crate::transform::ComposedTransform;

/// Projects `point_volume_frame_mm` onto the detector, returning pixel
/// coordinates that may fall outside `[0, Dx) x [0, Dy)`.
///
/// The detector plane is always axis-aligned at the fixed camera-space
/// depth `z = -SDD`, so the source/point line's intersection with it
/// reduces to a single division rather than a general point+normal
/// plane intersection (see `DESIGN.md` for the fuller comparison).
pub fn project(
    transform: &ComposedTransform,
    detector: &DetectorConfig,
    sdd: f64,
    point_volume_frame_mm: [f64; 3],
) -> (f64, f64) {
    let world_to_camera_inv = transform
        .world_to_camera
        .try_inverse()
        .unwrap_or_else(nalgebra::Matrix4::identity);
    let q = Vector4::new(point_volume_frame_mm[0], point_volume_frame_mm[1], point_volume_frame_mm[2], 1.0);
    let q_cam = dehomogenize(world_to_camera_inv * q);

    // Line from q_cam to the camera-frame origin (the source), scaled
    // until it crosses z = -sdd.
    let (ix, iy) = if q_cam[2].abs() > f64::EPSILON {
        let scale = -sdd / q_cam[2];
        (q_cam[0] * scale, q_cam[1] * scale)
    } else {
        (q_cam[0], q_cam[1])
    };

    let origin = detector.camera_origin(sdd);
    let (u, v_raw) = camera_to_pixel((ix, iy), origin, detector.pitch);
    let v = detector.size.1 as f64 - v_raw;
    (u, v)
}
