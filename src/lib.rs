//! Digitally reconstructed radiograph (DRR) rendering engine.
//!
//! Casts rays from a point X-ray source through a CT voxel grid to a
//! rectangular detector, integrating voxel intensities along each ray
//! with an incremental Siddon-style traversal. The crate is a library:
//! it owns no window, no scene graph and no file I/O, and never
//! installs a logger — callers wire `log` to whatever backend they
//! use.
//!
//! The pieces compose as: geometry -> transform -> integrator ->
//! driver -> normalize, with fiducial projection sharing the same
//! composed transform.

mod detector;
mod driver;
mod engine;
mod error;
mod fiducial;
mod geometry;
mod integrator;
mod normalize;
mod params;
mod transform;
mod volume;

pub use detector::{DetectorConfig, Image};
pub use engine::DrrEngine;
pub use error::DrrDiagnostic;
