//! Error taxonomy for the splat/aggregate/interpolate pipeline.
//!
//! Every variant is detected by validation that runs before the corresponding
//! stage's main computation. None are recovered silently: substituting a
//! default (e.g. zero weight) would corrupt downstream physical quantities,
//! so callers must treat any of these as a hard stop for the invocation.

use thiserror::Error;

use crate::ParticleId;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SplatError>;

/// All failure modes of the pipeline.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SplatError {
    /// Two arrays that must be aligned 1:1 disagree in length.
    #[error("shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Which pair of arrays disagreed.
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Support radius was zero, negative, or NaN.
    #[error("support radius must be positive, got {0}")]
    InvalidRadius(f32),

    /// The same particle id appeared twice where ids must be unique.
    #[error("duplicate particle id {0}")]
    DuplicateParticleId(ParticleId),

    /// The weight grid references an id the attribute table has no row for.
    #[error("particle id {0} is missing from the attribute table")]
    UnknownParticleId(ParticleId),

    /// A requested channel is not a column of the attribute table.
    #[error("unknown channel {0:?}")]
    UnknownChannel(String),

    /// The grid has fewer nodes on one axis than the interpolation stencil needs.
    #[error("{method} interpolation needs at least {needed} nodes per axis, {axis} axis has {got}")]
    InsufficientGridResolution {
        method: &'static str,
        axis: &'static str,
        needed: usize,
        got: usize,
    },

    /// A field query fell outside the grid's bounding box.
    #[error("query point ({x}, {y}) is outside the interpolation domain")]
    OutOfDomain { x: f32, y: f32 },
}
