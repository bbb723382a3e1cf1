//! One-call pipeline: neighbor index -> splat -> aggregate -> interpolants.
//!
//! Each stage consumes the prior stage's complete output; there is no shared
//! mutable state between invocations and no incremental update. When particle
//! state changes, rerun the whole pipeline.

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, ChannelGrid};
use crate::error::Result;
use crate::grid::Grid;
use crate::interp::{ContinuousField, InterpMethod};
use crate::kernels::Kernel;
use crate::splat::{splat, WeightGrid};
use crate::table::AttributeTable;
use crate::ParticleId;

/// Configuration for one splat/aggregate/interpolate cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// SPH support radius h. Must be positive.
    pub support_radius: f32,
    /// Field reconstruction method.
    pub method: InterpMethod,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            support_radius: 1.5,
            method: InterpMethod::Cubic,
        }
    }
}

/// All artifacts of one pipeline run.
///
/// The intermediates are exposed for diagnostics and testing; `field` is the
/// product callers query.
#[derive(Debug)]
pub struct FieldOutput {
    /// Sparse per-node `(id, weight)` contributions.
    pub weights: WeightGrid,
    /// Dense `(nx, ny, channels)` weighted sums.
    pub values: ChannelGrid,
    /// Continuously queryable multi-channel field.
    pub field: ContinuousField,
}

/// Run the full pipeline over one particle snapshot.
///
/// `channels` selects and orders the attribute columns to propagate; that
/// order is the channel order of `values` and of every `field.query` result.
pub fn splat_field<K: Kernel, S: AsRef<str>>(
    grid: &Grid,
    positions: &[Vec2],
    ids: &[ParticleId],
    table: &AttributeTable,
    channels: &[S],
    config: &FieldConfig,
    kernel: &K,
) -> Result<FieldOutput> {
    let weights = splat(grid, positions, ids, config.support_radius, kernel)?;
    debug!(
        "splat: {} particles onto {} nodes, {} occupied, {} contributions",
        positions.len(),
        grid.len(),
        weights.occupied_cells(),
        weights.entries().len()
    );

    let values = aggregate(&weights, table, channels)?;
    debug!(
        "aggregate: {} channels over {} nodes",
        values.num_channels(),
        grid.len()
    );

    let field = ContinuousField::build(grid, &values, config.method)?;
    debug!("interpolants: {:?} over {:?} grid", config.method, grid.shape());

    Ok(FieldOutput {
        weights,
        values,
        field,
    })
}
