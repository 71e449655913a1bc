//! Mutable rendering parameters and the incremental-rotation state
//! tracked between transform compositions.
//!
//! Grouped into plain structs behind a single lock so setters and the
//! render path can share state without pulling in an async runtime.

use nalgebra::Matrix4;

/// Gantry and volume pose. Angles in radians, translation in
/// millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub gantry_angle_rad: f64,
    pub volume_euler_rad: [f64; 3],
    pub volume_translation_mm: [f64; 3],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            gantry_angle_rad: 0.0,
            volume_euler_rad: [0.0; 3],
            volume_translation_mm: [0.0; 3],
        }
    }
}

/// Source-to-detector distance and the attenuation threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Optics {
    pub sdd_mm: f64,
    pub threshold: f64,
}

impl Default for Optics {
    fn default() -> Self {
        Self { sdd_mm: 1000.0, threshold: 0.0 }
    }
}

/// All render-affecting parameters other than the volume/detector
/// shape themselves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    pub pose: Pose,
    pub optics: Optics,
    pub block_size: usize,
    pub isocentre: [f64; 3],
}

impl Default for Params {
    fn default() -> Self {
        Self {
            pose: Pose::default(),
            optics: Optics::default(),
            block_size: 32,
            isocentre: [0.0; 3],
        }
    }
}

/// The running product of incremental volume rotations, plus the
/// Euler triple last used to compute a delta against. Cleared by
/// [`crate::DrrEngine::reset`], independent of `Params`.
#[derive(Clone, Copy, Debug)]
pub struct RotationState {
    pub accumulated: Matrix4<f64>,
    pub last_euler_rad: [f64; 3],
}

impl Default for RotationState {
    fn default() -> Self {
        Self { accumulated: Matrix4::identity(), last_euler_rad: [0.0; 3] }
    }
}
