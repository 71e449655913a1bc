//! Transform composer: assembles `world_to_camera` and
//! `source_world` from gantry angle, volume pose, isocentre and SDD.

use nalgebra::{Matrix4, Vector4};

use crate::geometry::{dehomogenize, rotation_x, rotation_y, rotation_z, Axis};
use crate::params::{Params, RotationState};

/// Fixed axis-swap mapping camera Y-up into patient Z-up:
/// `(1,0,0,0 | 0,0,1,0 | 0,-1,0,0 | 0,0,0,1)`.
fn camera_reorient() -> Matrix4<f64> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, -1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// The composed transform, recomputed only when a parameter changed
/// since the last composition.
#[derive(Clone, Copy, Debug)]
pub struct ComposedTransform {
    pub world_to_camera: Matrix4<f64>,
    pub source_world: [f64; 3],
}

impl Default for ComposedTransform {
    fn default() -> Self {
        Self { world_to_camera: Matrix4::identity(), source_world: [0.0; 3] }
    }
}

const MIN_DELTA_RAD: f64 = 1e-8;

/// Applies a single-non-zero-axis incremental rotation: of the three
/// Euler deltas since the last call, the first (in X, Y, Z priority
/// order) whose magnitude exceeds `1e-8` rad is applied; the others
/// are assumed to be floating-point noise from an axis that didn't
/// actually move. Treating one axis as the one that moved avoids
/// compounding slider jitter on the other two axes into the
/// accumulated rotation — see `set_pose`'s doc comment and
/// `rotate_single_axis` for the explicit alternative.
pub fn apply_incremental_euler(rotation: &mut RotationState, isocentre: [f64; 3], new_euler_rad: [f64; 3]) {
    let delta = [
        new_euler_rad[0] - rotation.last_euler_rad[0],
        new_euler_rad[1] - rotation.last_euler_rad[1],
        new_euler_rad[2] - rotation.last_euler_rad[2],
    ];
    rotation.last_euler_rad = new_euler_rad;

    let (axis, d) = if delta[0].abs() > MIN_DELTA_RAD {
        (Axis::X, delta[0])
    } else if delta[1].abs() > MIN_DELTA_RAD {
        (Axis::Y, delta[1])
    } else {
        (Axis::Z, delta[2])
    };
    let delta_r = axis.rotation(isocentre, d);
    rotation.accumulated *= delta_r;
}

/// Applies a single-axis rotation directly, bypassing the
/// single-non-zero-axis heuristic. Preferred over `set_pose` whenever
/// the caller already knows which axis moved, since it can't
/// misattribute a delta to the wrong axis.
pub fn rotate_single_axis(rotation: &mut RotationState, isocentre: [f64; 3], axis: Axis, delta_rad: f64) {
    let idx = match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    };
    rotation.last_euler_rad[idx] += delta_rad;
    rotation.accumulated *= axis.rotation(isocentre, delta_rad);
}

/// Composes `world_to_camera` and `source_world` from the current
/// rotation state and params. Does not touch the modify/update
/// timestamps — the caller (the engine) owns that bookkeeping.
pub fn compose(rotation: &RotationState, params: &Params) -> ComposedTransform {
    let isocentre = params.isocentre;

    let mut volume_rot = rotation.accumulated;
    volume_rot[(0, 3)] += params.pose.volume_translation_mm[0];
    volume_rot[(1, 3)] += params.pose.volume_translation_mm[1];
    volume_rot[(2, 3)] += params.pose.volume_translation_mm[2];

    let gantry_rot = rotation_z(isocentre, -params.pose.gantry_angle_rad);

    let mut camera_shift = Matrix4::identity();
    camera_shift[(0, 3)] += -isocentre[0];
    camera_shift[(1, 3)] += params.optics.sdd_mm - isocentre[1];
    camera_shift[(2, 3)] += -isocentre[2];

    let forward = camera_reorient() * camera_shift * gantry_rot * volume_rot;
    let world_to_camera = forward.try_inverse().unwrap_or_else(Matrix4::identity);

    let source = world_to_camera * Vector4::new(0.0, 0.0, 0.0, 1.0);
    let source_world = dehomogenize(source);

    ComposedTransform { world_to_camera, source_world }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_axis_heuristic_picks_x_first() {
        let mut rot = RotationState::default();
        apply_incremental_euler(&mut rot, [0.0; 3], [0.2, 0.0, 0.0]);
        let expected = rotation_x([0.0; 3], 0.2);
        assert_relative_eq!(rot.accumulated, expected, epsilon = 1e-12);
    }

    #[test]
    fn incremental_commutativity_matches_sequential_axis_calls() {
        // Reset, apply (alpha,0,0) then (0,beta,0) == Rx(alpha)*Ry(beta),
        // the same post-multiply order a single two-axis sequence would use.
        let iso = [1.0, 2.0, 3.0];
        let mut rot = RotationState::default();
        apply_incremental_euler(&mut rot, iso, [0.3, 0.0, 0.0]);
        apply_incremental_euler(&mut rot, iso, [0.3, 0.4, 0.0]);

        let expected = rotation_x(iso, 0.3) * rotation_y(iso, 0.4);
        assert_relative_eq!(rot.accumulated, expected, epsilon = 1e-10);
    }

    #[test]
    fn zero_pose_places_source_sdd_away_on_y() {
        let params = Params::default();
        let rot = RotationState::default();
        let t = compose(&rot, &params);
        // isocentre is origin, sdd defaults to 1000mm; with identity pose
        // the source lands on the world Y axis at distance SDD.
        assert_relative_eq!(t.source_world[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(t.source_world[1], -1000.0, epsilon = 1e-6);
        assert_relative_eq!(t.source_world[2], 0.0, epsilon = 1e-9);
    }
}
