//! Ray integrator: Siddon incremental ray/voxel
//! traversal. Never fails — degenerate or missing rays return 0, and
//! out-of-range voxel indices from floating-point slop are skipped.

use crate::volume::Volume;

const SENTINEL_PARALLEL_MIN: f64 = -2.0;
const SENTINEL_PARALLEL_MAX: f64 = 2.0;
const LARGE_STEP: f64 = 999.0;

pub const SIGNED_16_MIN: f64 = i16::MIN as f64;
pub const SIGNED_16_MAX: f64 = i16::MAX as f64;

/// Per-axis entry/exit parametric range for a ray against one pair of
/// bounding planes, `[0, extent]`.
fn axis_range(source: f64, ray: f64, extent: f64) -> (f64, f64) {
    if ray != 0.0 {
        let a0 = (0.0 - source) / ray;
        let a1 = (extent - source) / ray;
        (a0.min(a1), a0.max(a1))
    } else {
        (SENTINEL_PARALLEL_MIN, SENTINEL_PARALLEL_MAX)
    }
}

/// Casts the ray `source -> world_point` through `volume` and returns
/// the clamped, threshold-subtracted line integral of voxel
/// intensities along the segment inside the volume box.
pub fn integrate_ray(volume: &Volume, source: [f64; 3], world_point: [f64; 3], threshold: f64) -> i16 {
    let ray = [
        world_point[0] - source[0],
        world_point[1] - source[1],
        world_point[2] - source[2],
    ];
    let (vx, vy, vz) = volume.dims();
    let (sx, sy, sz) = volume.spacing();
    let extent = [vx as f64 * sx, vy as f64 * sy, vz as f64 * sz];

    let (xmin, xmax) = axis_range(source[0], ray[0], extent[0]);
    let (ymin, ymax) = axis_range(source[1], ray[1], extent[1]);
    let (zmin, zmax) = axis_range(source[2], ray[2], extent[2]);

    let alpha_min = xmin.max(ymin).max(zmin);
    let alpha_max = xmax.min(ymax).min(zmax);
    if alpha_min >= alpha_max {
        return 0;
    }

    let entry = [
        source[0] + alpha_min * ray[0],
        source[1] + alpha_min * ray[1],
        source[2] + alpha_min * ray[2],
    ];
    let entry_index = [entry[0] / sx, entry[1] / sy, entry[2] / sz];

    let first_crossing = |axis: usize, spacing: f64| -> f64 {
        if ray[axis] == 0.0 {
            return SENTINEL_PARALLEL_MAX;
        }
        let up = entry_index[axis].ceil() * spacing;
        let down = entry_index[axis].floor() * spacing;
        let a_up = (up - source[axis]) / ray[axis];
        let a_down = (down - source[axis]) / ray[axis];
        a_up.max(a_down)
    };
    let mut alpha_x = first_crossing(0, sx);
    let mut alpha_y = first_crossing(1, sy);
    let mut alpha_z = first_crossing(2, sz);

    let step = |r: f64, spacing: f64| if r != 0.0 { spacing / r.abs() } else { LARGE_STEP };
    let delta_x = step(ray[0], sx);
    let delta_y = step(ray[1], sy);
    let delta_z = step(ray[2], sz);

    let step_dir = |s: f64, p: f64| if s < p { 1i64 } else { -1i64 };
    let ux = step_dir(source[0], world_point[0]);
    let uy = step_dir(source[1], world_point[1]);
    let uz = step_dir(source[2], world_point[2]);

    let mut voxel = [
        entry_index[0].floor() as i64,
        entry_index[1].floor() as i64,
        entry_index[2].floor() as i64,
    ];

    let mut acc = 0.0f64;
    let mut alpha_cur = alpha_x.min(alpha_y).min(alpha_z);

    while alpha_cur < alpha_max {
        let alpha_prev = alpha_cur;

        if alpha_x <= alpha_y && alpha_x <= alpha_z {
            alpha_cur = alpha_x;
            voxel[0] += ux;
            alpha_x += delta_x;
        } else if alpha_y <= alpha_x && alpha_y <= alpha_z {
            alpha_cur = alpha_y;
            voxel[1] += uy;
            alpha_y += delta_y;
        } else {
            alpha_cur = alpha_z;
            voxel[2] += uz;
            alpha_z += delta_z;
        }

        if volume.in_bounds(voxel[0], voxel[1], voxel[2]) {
            let value = volume.get(voxel[0], voxel[1], voxel[2]) as f64;
            if value > threshold {
                acc += (alpha_cur - alpha_prev) * (value - threshold);
            }
        }
    }

    acc.clamp(SIGNED_16_MIN, SIGNED_16_MAX) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_cube(value: i16, n: usize) -> Volume {
        Volume::new(vec![value; n * n * n], (n, n, n), (1.0, 1.0, 1.0))
    }

    #[test]
    fn centred_ray_through_uniform_cube_integrates_full_path_length() {
        let volume = uniform_cube(1000, 64);
        // Source below the volume on Y, pixel directly above the centre on Y.
        let source = [32.0, -1000.0, 32.0];
        let point = [32.0, 64.0, 32.0];
        let d = integrate_ray(&volume, source, point, 0.0);
        assert_eq!(d as f64, ((1000.0) * 64.0).clamp(SIGNED_16_MIN, SIGNED_16_MAX));
    }

    #[test]
    fn ray_that_misses_the_volume_returns_zero() {
        let volume = uniform_cube(1000, 64);
        let source = [-1000.0, -1000.0, -1000.0];
        let point = [-1000.0, 2000.0, -1000.0];
        assert_eq!(integrate_ray(&volume, source, point, 0.0), 0);
    }

    #[test]
    fn threshold_clips_contributions_at_or_below_it() {
        let volume = uniform_cube(100, 16);
        let source = [8.0, -500.0, 8.0];
        let point = [8.0, 16.0, 8.0];
        assert_eq!(integrate_ray(&volume, source, point, 100.0), 0);
    }

    #[test]
    fn empty_volume_integrates_to_zero() {
        let volume = uniform_cube(-2000, 16);
        let source = [8.0, -500.0, 8.0];
        let point = [8.0, 16.0, 8.0];
        assert_eq!(integrate_ray(&volume, source, point, 0.0), 0);
    }

    #[test]
    fn linearity_in_voxel_intensity_holds_below_clamp() {
        let base = uniform_cube(10, 8);
        let scaled = uniform_cube(30, 8);
        let source = [4.0, -500.0, 4.0];
        let point = [4.0, 8.0, 4.0];
        let d0 = integrate_ray(&base, source, point, 0.0) as f64;
        let d1 = integrate_ray(&scaled, source, point, 0.0) as f64;
        assert!((d1 - 3.0 * d0).abs() < 1e-6);
    }
}
