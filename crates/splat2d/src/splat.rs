//! Kernel splatting of a particle cloud onto grid nodes.
//!
//! For every grid node, finds the particles within the kernel support radius
//! and records one `(particle id, kernel weight)` pair per neighbor. A node
//! may collect contributions from many particles and a particle may land on
//! many nodes; the spatial index keeps that many-to-many pairing from
//! degenerating into an O(particles x nodes) double loop.

use std::collections::HashSet;
use std::ops::Range;

use glam::Vec2;
use rayon::prelude::*;

use crate::error::{Result, SplatError};
use crate::grid::Grid;
use crate::kernels::Kernel;
use crate::neighbors::NeighborIndex;
use crate::ParticleId;

/// One particle's contribution to one grid node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightEntry {
    pub id: ParticleId,
    pub weight: f32,
}

/// `(start, len)` into the entry arena. `len == 0` marks an empty cell.
#[derive(Clone, Copy, Debug, Default)]
struct CellSpan {
    start: u32,
    len: u32,
}

/// Sparse grid of per-node particle contributions.
///
/// The ragged per-cell lists live in one flat arena; each cell holds a span
/// into it. Cell spans are disjoint, so downstream passes can walk cells in
/// parallel and write into per-cell output slots without synchronization.
#[derive(Clone, Debug)]
pub struct WeightGrid {
    nx: usize,
    ny: usize,
    spans: Vec<CellSpan>,
    entries: Vec<WeightEntry>,
}

impl WeightGrid {
    /// `(nx, ny)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Contributions recorded for node `(i, j)`. Empty slice for empty cells.
    #[inline]
    pub fn cell(&self, i: usize, j: usize) -> &[WeightEntry] {
        let span = self.spans[i * self.ny + j];
        &self.entries[span.start as usize..(span.start + span.len) as usize]
    }

    /// Arena range backing node `(i, j)`'s contribution list.
    #[inline]
    pub fn cell_range(&self, i: usize, j: usize) -> Range<usize> {
        let span = self.spans[i * self.ny + j];
        span.start as usize..(span.start + span.len) as usize
    }

    /// True iff no particle lies within the support radius of node `(i, j)`.
    #[inline]
    pub fn is_cell_empty(&self, i: usize, j: usize) -> bool {
        self.spans[i * self.ny + j].len == 0
    }

    /// The whole contribution arena, cell by cell in x-major order.
    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    /// Number of nodes with at least one contributing particle.
    pub fn occupied_cells(&self) -> usize {
        self.spans.iter().filter(|s| s.len > 0).count()
    }

    /// Per-node total kernel weight, x-major.
    ///
    /// Aggregated channel values are plain weighted sums; callers that want a
    /// density-normalized field divide by this. Never applied implicitly.
    pub fn density(&self) -> Vec<f32> {
        self.spans
            .iter()
            .map(|span| {
                self.entries[span.start as usize..(span.start + span.len) as usize]
                    .iter()
                    .map(|e| e.weight)
                    .sum()
            })
            .collect()
    }
}

/// Zip two parallel coordinate columns into positions.
///
/// Fails with `ShapeMismatch` if the columns disagree in length.
pub fn positions_from_xy(px: &[f32], py: &[f32]) -> Result<Vec<Vec2>> {
    if px.len() != py.len() {
        return Err(SplatError::ShapeMismatch {
            what: "particle position columns",
            expected: px.len(),
            actual: py.len(),
        });
    }
    Ok(px
        .iter()
        .zip(py)
        .map(|(&x, &y)| Vec2::new(x, y))
        .collect())
}

/// Splat particles onto the grid, producing the sparse weight grid.
///
/// For each node, the kernel is evaluated at the node-minus-particle offset
/// of every particle strictly within `support`. Nodes with no neighbor are
/// marked empty rather than zero-weighted, which lets aggregation skip them
/// outright.
///
/// Fails with `InvalidRadius` if `support <= 0`, `ShapeMismatch` if
/// `positions` and `ids` disagree in length, and `DuplicateParticleId` if an
/// id appears twice. All validation runs before any splatting.
pub fn splat<K: Kernel>(
    grid: &Grid,
    positions: &[Vec2],
    ids: &[ParticleId],
    support: f32,
    kernel: &K,
) -> Result<WeightGrid> {
    if !(support > 0.0) {
        return Err(SplatError::InvalidRadius(support));
    }
    if positions.len() != ids.len() {
        return Err(SplatError::ShapeMismatch {
            what: "particle positions vs ids",
            expected: positions.len(),
            actual: ids.len(),
        });
    }
    let mut seen = HashSet::with_capacity(ids.len());
    for &id in ids {
        if !seen.insert(id) {
            return Err(SplatError::DuplicateParticleId(id));
        }
    }

    let index = NeighborIndex::build(positions);
    let (nx, ny) = grid.shape();

    // Per-node neighbor queries are independent; collect each cell's ragged
    // list in parallel, then pack the lists into the arena.
    let cells: Vec<Vec<WeightEntry>> = (0..nx * ny)
        .into_par_iter()
        .map(|flat| {
            let node = grid.node(flat / ny, flat % ny);
            index
                .within_radius(node, support)
                .map(|slot| WeightEntry {
                    id: ids[slot],
                    weight: kernel.weight(node - positions[slot], support),
                })
                .collect()
        })
        .collect();

    let total: usize = cells.iter().map(Vec::len).sum();
    let mut spans = Vec::with_capacity(nx * ny);
    let mut entries = Vec::with_capacity(total);
    for cell in cells {
        spans.push(CellSpan {
            start: entries.len() as u32,
            len: cell.len() as u32,
        });
        entries.extend(cell);
    }

    Ok(WeightGrid {
        nx,
        ny,
        spans,
        entries,
    })
}
