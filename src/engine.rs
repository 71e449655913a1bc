//! Public engine façade: owns volume/detector/pose state behind a
//! `parking_lot::RwLock` and ties the geometry, transform, integrator,
//! driver and normaliser stages together into `render`/`project`.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::detector::{DetectorConfig, Image};
use crate::driver;
use crate::error::DrrDiagnostic;
use crate::fiducial;
use crate::geometry::Axis;
use crate::normalize::normalize;
use crate::params::{Params, RotationState};
use crate::transform::{apply_incremental_euler, compose, rotate_single_axis, ComposedTransform};
use crate::volume::Volume;

struct Inner {
    volume: Option<Volume>,
    detector: DetectorConfig,
    params: Params,
    rotation: RotationState,
    modify: u64,
    update: u64,
    cached: ComposedTransform,
    diagnostics: Vec<DrrDiagnostic>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            volume: None,
            detector: DetectorConfig::default(),
            params: Params::default(),
            rotation: RotationState::default(),
            modify: 1,
            update: 0,
            cached: ComposedTransform::default(),
            diagnostics: Vec::new(),
        }
    }
}

impl Inner {
    fn touch(&mut self) {
        self.modify += 1;
    }

    /// Recomposes only when something touched since the last render
    /// or project call.
    fn ensure_composed(&mut self) -> ComposedTransform {
        if self.update < self.modify {
            self.cached = compose(&self.rotation, &self.params);
            self.update = self.modify;
        }
        self.cached
    }

    fn push(&mut self, diag: DrrDiagnostic) {
        diag.log();
        self.diagnostics.push(diag);
    }

    fn check_tile_alignment(&mut self) {
        let (dx, dy) = self.detector.size;
        let block_size = self.params.block_size;
        if block_size != 0 && (dx % block_size != 0 || dy % block_size != 0) {
            self.push(DrrDiagnostic::DetectorNotTileAligned { dx, dy, block_size });
        }
    }
}

/// DRR rendering engine. Cheap to construct; the volume buffer is
/// supplied separately via `set_volume` and is never copied (`Volume`
/// stores it in an `Arc<[i16]>`).
pub struct DrrEngine {
    inner: RwLock<Inner>,
}

impl Default for DrrEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DrrEngine {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::default()) }
    }

    /// Installs the CT volume and re-centres the isocentre on its
    /// geometric centre. `buffer` is stored without copying; `spacing`
    /// defaults to `(1.0, 1.0, 1.0)` mm when `None`.
    pub fn set_volume(&self, buffer: impl Into<Arc<[i16]>>, dims: (usize, usize, usize), spacing: Option<(f64, f64, f64)>) {
        let mut inner = self.inner.write();
        let volume = Volume::new(buffer, dims, spacing.unwrap_or((1.0, 1.0, 1.0)));
        inner.params.isocentre = volume.geometric_centre();
        inner.volume = Some(volume);
        inner.touch();
    }

    pub fn set_detector(&self, size: (usize, usize), pitch: (f64, f64)) {
        let mut inner = self.inner.write();
        inner.detector = DetectorConfig { size, pitch };
        inner.check_tile_alignment();
        inner.touch();
    }

    /// Applies a gantry angle and volume pose in one call, subject to
    /// the single-non-zero-axis incremental rotation heuristic. Prefer
    /// `rotate_volume_x/y/z` when the caller already knows which axis
    /// moved.
    pub fn set_pose(&self, gantry_angle_rad: f64, volume_euler_rad: [f64; 3], volume_translation_mm: [f64; 3]) {
        let mut inner = self.inner.write();
        inner.params.pose.gantry_angle_rad = gantry_angle_rad;
        inner.params.pose.volume_translation_mm = volume_translation_mm;
        let isocentre = inner.params.isocentre;
        apply_incremental_euler(&mut inner.rotation, isocentre, volume_euler_rad);
        inner.touch();
    }

    pub fn set_optics(&self, source_to_detector_mm: f64, threshold: f64) {
        let mut inner = self.inner.write();
        inner.params.optics.sdd_mm = source_to_detector_mm;
        inner.params.optics.threshold = threshold;
        inner.touch();
    }

    pub fn set_tile(&self, block_size: usize) {
        let mut inner = self.inner.write();
        if block_size == 0 {
            inner.push(DrrDiagnostic::ZeroBlockSize);
            return;
        }
        inner.params.block_size = block_size;
        inner.check_tile_alignment();
    }

    /// Rotates the volume about the isocentre by `delta_rad` around X,
    /// bypassing the single-non-zero-axis heuristic `set_pose` applies.
    pub fn rotate_volume_x(&self, delta_rad: f64) {
        self.rotate_axis(Axis::X, delta_rad);
    }
    pub fn rotate_volume_y(&self, delta_rad: f64) {
        self.rotate_axis(Axis::Y, delta_rad);
    }
    pub fn rotate_volume_z(&self, delta_rad: f64) {
        self.rotate_axis(Axis::Z, delta_rad);
    }

    fn rotate_axis(&self, axis: Axis, delta_rad: f64) {
        let mut inner = self.inner.write();
        let isocentre = inner.params.isocentre;
        rotate_single_axis(&mut inner.rotation, isocentre, axis, delta_rad);
        inner.touch();
    }

    /// Clears the accumulated volume rotation and the last Euler
    /// triple; volume, detector, optics and gantry pose are left
    /// untouched.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.rotation = RotationState::default();
        inner.touch();
    }

    /// Renders the current scene. Never fails: a missing volume or an
    /// un-tile-aligned detector produces a best-effort (possibly
    /// partially zero) image plus a logged diagnostic, retrievable via
    /// `take_diagnostics`.
    pub fn render(&self) -> Image {
        let mut inner = self.inner.write();
        let Some(volume) = inner.volume.clone() else {
            inner.push(DrrDiagnostic::VolumeNotSet);
            let (w, h) = inner.detector.size;
            return Image::zeroed(w, h);
        };
        let transform = inner.ensure_composed();
        let detector = inner.detector;
        let sdd = inner.params.optics.sdd_mm;
        let threshold = inner.params.optics.threshold;
        let block_size = inner.params.block_size;
        drop(inner);

        let raw = driver::render(&volume, &detector, sdd, threshold, &transform, block_size);
        normalize(&raw)
    }

    /// Projects a point given in the volume frame onto detector pixel
    /// coordinates; see `fiducial::project`.
    pub fn project(&self, point_volume_frame_mm: [f64; 3]) -> (f64, f64) {
        let mut inner = self.inner.write();
        let transform = inner.ensure_composed();
        let detector = inner.detector;
        let sdd = inner.params.optics.sdd_mm;
        fiducial::project(&transform, &detector, sdd, point_volume_frame_mm)
    }

    /// Drains and returns diagnostics accumulated since the last call.
    pub fn take_diagnostics(&self) -> Vec<DrrDiagnostic> {
        std::mem::take(&mut self.inner.write().diagnostics)
    }
}
