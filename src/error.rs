//! Non-fatal diagnostics. A render never fails outright — bad input
//! degrades to a best-effort image plus diagnostics emitted here and
//! logged on the side, per the engine's "render something sensible for
//! any input" contract.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DrrDiagnostic {
    #[cfg_attr(
        feature = "strict-tiling",
        error("detector size ({dx}, {dy}) is not a multiple of block size {block_size}; remainder pixels will be left unrendered")
    )]
    #[cfg_attr(
        not(feature = "strict-tiling"),
        error("detector size ({dx}, {dy}) is not a multiple of block size {block_size}; remainder pixels render but straddle a partial tile")
    )]
    DetectorNotTileAligned {
        dx: usize,
        dy: usize,
        block_size: usize,
    },

    #[error("no volume has been set; render() will produce a zero image")]
    VolumeNotSet,

    #[error("block size must be non-zero; ignoring set_tile call")]
    ZeroBlockSize,
}

impl DrrDiagnostic {
    /// Emits this diagnostic to the `log` side channel at the
    /// appropriate level.
    pub fn log(&self) {
        log::warn!("{self}");
    }
}
