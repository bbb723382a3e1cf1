//! Weighted aggregation of particle attributes onto the dense channel grid.
//!
//! Converts the sparse weight grid plus the attribute table into a dense
//! `(nx, ny, channels)` array: each node's channel vector is the sum over its
//! contributing particles of `attributes * weight`. Weights are NOT required
//! to sum to one and the sums are never normalized here; see
//! `WeightGrid::density` for the caller-side normalization hook.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SplatError};
use crate::splat::WeightGrid;
use crate::table::AttributeTable;

/// Dense per-node, per-channel aggregated values.
///
/// A derived, recomputable artifact: it owns no particle or grid data and is
/// rebuilt from scratch on every splat. Serializable so intermediate state
/// can be dumped for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelGrid {
    nx: usize,
    ny: usize,
    channels: Vec<String>,
    /// x-major, channel-minor: `(i, j, c)` lives at `(i * ny + j) * nc + c`.
    data: Vec<f32>,
}

impl ChannelGrid {
    /// `(nx, ny)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Channel names in output order (the order requested at aggregation).
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Channel vector at node `(i, j)`.
    #[inline]
    pub fn node_values(&self, i: usize, j: usize) -> &[f32] {
        let nc = self.channels.len();
        let base = (i * self.ny + j) * nc;
        &self.data[base..base + nc]
    }

    /// Single channel value at node `(i, j)`.
    #[inline]
    pub fn value(&self, i: usize, j: usize, channel: usize) -> f32 {
        self.node_values(i, j)[channel]
    }

    /// Copy of one channel's plane, x-major `(nx * ny)`.
    pub fn channel_plane(&self, channel: usize) -> Vec<f32> {
        debug_assert!(channel < self.channels.len());
        let nc = self.channels.len();
        self.data
            .iter()
            .skip(channel)
            .step_by(nc)
            .copied()
            .collect()
    }
}

/// Aggregate particle attributes into the dense channel grid.
///
/// `channels` is the ordered list of attribute columns to propagate; its
/// order defines the channel axis of the output and is preserved through
/// interpolation. Referential integrity is validated up front: every
/// requested channel must be a table column (`UnknownChannel`) and every id
/// in the weight grid must have a table row (`UnknownParticleId`). No partial
/// grid is ever produced.
pub fn aggregate<S: AsRef<str>>(
    weights: &WeightGrid,
    table: &AttributeTable,
    channels: &[S],
) -> Result<ChannelGrid> {
    let cols: Vec<usize> = channels
        .iter()
        .map(|name| {
            table
                .channel_index(name.as_ref())
                .ok_or_else(|| SplatError::UnknownChannel(name.as_ref().to_string()))
        })
        .collect::<Result<_>>()?;

    // Resolve the id -> row join for every arena entry before touching the
    // output; this is both the fail-fast validation and the lookup the main
    // loop reuses.
    let rows: Vec<&[f32]> = weights
        .entries()
        .iter()
        .map(|entry| {
            table
                .row(entry.id)
                .ok_or(SplatError::UnknownParticleId(entry.id))
        })
        .collect::<Result<_>>()?;

    let (nx, ny) = weights.shape();
    let nc = cols.len();
    let mut data = vec![0.0f32; nx * ny * nc];
    if nc > 0 {
        // Cell spans are disjoint, so each output chunk has a single writer.
        data.par_chunks_mut(nc).enumerate().for_each(|(flat, out)| {
            let (i, j) = (flat / ny, flat % ny);
            let range = weights.cell_range(i, j);
            for (entry, row) in weights.cell(i, j).iter().zip(&rows[range]) {
                for (value, &col) in out.iter_mut().zip(&cols) {
                    *value += row[col] * entry.weight;
                }
            }
        });
    }

    Ok(ChannelGrid {
        nx,
        ny,
        channels: channels.iter().map(|s| s.as_ref().to_string()).collect(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::kernels::Hat;
    use crate::splat::splat;
    use glam::Vec2;

    fn setup() -> (WeightGrid, AttributeTable) {
        let grid = Grid::uniform(Vec2::ZERO, 1.0, 3, 3);
        let positions = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(5.0, 5.0)];
        let weights = splat(&grid, &positions, &[1, 2, 3], 1.5, &Hat).unwrap();

        let mut table = AttributeTable::new(["mass", "vx"]);
        table.insert(1, &[2.0, 0.5]).unwrap();
        table.insert(2, &[4.0, -0.5]).unwrap();
        table.insert(3, &[1.0, 0.0]).unwrap();
        (weights, table)
    }

    #[test]
    fn test_weighted_sum_at_node() {
        let (weights, table) = setup();
        let values = aggregate(&weights, &table, &["mass"]).unwrap();

        // Node (0,0): particle 1 at distance 0 (w = 1), particle 2 at
        // distance 1 (w = 1/3) with the hat kernel at h = 1.5
        let expected = 1.0 * 2.0 + (1.0 - 1.0 / 1.5) * 4.0;
        assert!(
            (values.value(0, 0, 0) - expected).abs() < 1e-5,
            "got {}, expected {}",
            values.value(0, 0, 0),
            expected
        );
    }

    #[test]
    fn test_empty_cells_are_zero() {
        let (weights, table) = setup();
        let values = aggregate(&weights, &table, &["mass", "vx"]).unwrap();
        assert!(weights.is_cell_empty(2, 2));
        assert_eq!(values.node_values(2, 2), &[0.0, 0.0]);
    }

    #[test]
    fn test_channel_order_defines_output_axis() {
        let (weights, table) = setup();
        let forward = aggregate(&weights, &table, &["mass", "vx"]).unwrap();
        let reversed = aggregate(&weights, &table, &["vx", "mass"]).unwrap();
        assert_eq!(forward.channels(), &["mass".to_string(), "vx".to_string()]);
        assert_eq!(reversed.channels(), &["vx".to_string(), "mass".to_string()]);
        assert_eq!(forward.value(0, 0, 0), reversed.value(0, 0, 1));
        assert_eq!(forward.value(0, 0, 1), reversed.value(0, 0, 0));
    }

    #[test]
    fn test_unknown_channel_fails_before_aggregation() {
        let (weights, table) = setup();
        assert_eq!(
            aggregate(&weights, &table, &["density"]).unwrap_err(),
            SplatError::UnknownChannel("density".into())
        );
    }

    #[test]
    fn test_unknown_particle_id_fails() {
        let (weights, _) = setup();
        let mut sparse_table = AttributeTable::new(["mass"]);
        sparse_table.insert(1, &[2.0]).unwrap();
        // id 2 contributes to several cells but has no row
        assert_eq!(
            aggregate(&weights, &sparse_table, &["mass"]).unwrap_err(),
            SplatError::UnknownParticleId(2)
        );
    }

    #[test]
    fn test_channel_plane_extraction() {
        let (weights, table) = setup();
        let values = aggregate(&weights, &table, &["mass", "vx"]).unwrap();
        let plane = values.channel_plane(1);
        assert_eq!(plane.len(), 9);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(plane[i * 3 + j], values.value(i, j, 1));
            }
        }
    }
}
