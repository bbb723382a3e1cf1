//! Continuous field reconstruction from the dense channel grid.
//!
//! One independent scalar interpolant is built per channel over the shared
//! grid axes; a query evaluates all of them at the same point and returns the
//! channel vector in channel order. Queries outside the grid's bounding box
//! are rejected with `OutOfDomain` for every channel alike, so the output
//! vector is always internally consistent.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::ChannelGrid;
use crate::error::{Result, SplatError};
use crate::grid::Grid;

/// Field reconstruction method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpMethod {
    /// Piecewise-bilinear. Exact at nodes, C0 across cell edges. Needs at
    /// least 2 nodes per axis.
    Linear,
    /// Bicubic Hermite with Catmull-Rom tangents (nonuniform-spacing aware).
    /// Exact at nodes, C1 across cell edges. Needs at least 4 nodes per axis.
    Cubic,
}

impl InterpMethod {
    /// Minimum nodes per axis for this method's stencil.
    pub fn min_nodes(&self) -> usize {
        match self {
            Self::Linear => 2,
            Self::Cubic => 4,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cubic => "cubic",
        }
    }
}

/// One channel's scalar interpolant: a plane of node values over the shared
/// axes. Homogeneous across channels; evaluation dispatches on the field's
/// method.
#[derive(Clone, Debug)]
struct ScalarInterpolant {
    /// x-major `(nx * ny)` node values.
    values: Vec<f32>,
}

impl ScalarInterpolant {
    /// Node value at `(i, j)`.
    #[inline]
    fn at(&self, ny: usize, i: usize, j: usize) -> f32 {
        self.values[i * ny + j]
    }

    fn eval(&self, grid: &Grid, method: InterpMethod, kx: usize, ky: usize, x: f32, y: f32) -> f32 {
        let ny = grid.ny();
        match method {
            InterpMethod::Linear => {
                let sx = segment_fraction(grid.xs(), kx, x);
                let sy = segment_fraction(grid.ys(), ky, y);
                let v0 = lerp(self.at(ny, kx, ky), self.at(ny, kx + 1, ky), sx);
                let v1 = lerp(self.at(ny, kx, ky + 1), self.at(ny, kx + 1, ky + 1), sx);
                lerp(v0, v1, sy)
            }
            InterpMethod::Cubic => {
                // Tensor-product: cubic along x for the rows the outer cubic
                // touches, then cubic along y through those values.
                cubic_1d(grid.ys(), ky, y, |j| {
                    cubic_1d(grid.xs(), kx, x, |i| self.at(ny, i, j))
                })
            }
        }
    }
}

/// Continuously queryable multi-channel field.
///
/// Owns its interpolants; stateless with respect to the particle set. If
/// particle state changes, rerun the whole pipeline and build a new field.
#[derive(Clone, Debug)]
pub struct ContinuousField {
    grid: Grid,
    channels: Vec<String>,
    method: InterpMethod,
    interpolants: Vec<ScalarInterpolant>,
}

impl ContinuousField {
    /// Build one interpolant per channel of `values` over `grid`.
    ///
    /// Fails with `ShapeMismatch` if the channel grid's shape disagrees with
    /// the grid's, and `InsufficientGridResolution` if an axis has fewer
    /// nodes than the method's stencil needs.
    pub fn build(grid: &Grid, values: &ChannelGrid, method: InterpMethod) -> Result<Self> {
        if values.shape() != grid.shape() {
            let (enx, eny) = grid.shape();
            let (anx, any) = values.shape();
            return Err(SplatError::ShapeMismatch {
                what: "channel grid vs grid nodes",
                expected: enx * eny,
                actual: anx * any,
            });
        }
        let needed = method.min_nodes();
        for (axis, got) in [("x", grid.nx()), ("y", grid.ny())] {
            if got < needed {
                return Err(SplatError::InsufficientGridResolution {
                    method: method.name(),
                    axis,
                    needed,
                    got,
                });
            }
        }

        // Channels are independent; build their planes in parallel.
        let interpolants = (0..values.num_channels())
            .into_par_iter()
            .map(|c| ScalarInterpolant {
                values: values.channel_plane(c),
            })
            .collect();

        Ok(Self {
            grid: grid.clone(),
            channels: values.channels().to_vec(),
            method,
            interpolants,
        })
    }

    /// Channel names in output order.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn method(&self) -> InterpMethod {
        self.method
    }

    /// Evaluate every channel at `(x, y)`, in channel order.
    ///
    /// The domain is the grid's bounding box, boundary included. Points
    /// outside it fail with `OutOfDomain`; there is no extrapolation and no
    /// clamping, for any channel.
    pub fn query(&self, x: f32, y: f32) -> Result<Vec<f32>> {
        let xs = self.grid.xs();
        let ys = self.grid.ys();
        if !(x >= xs[0] && x <= xs[xs.len() - 1] && y >= ys[0] && y <= ys[ys.len() - 1]) {
            return Err(SplatError::OutOfDomain { x, y });
        }
        let kx = locate_segment(xs, x);
        let ky = locate_segment(ys, y);
        Ok(self
            .interpolants
            .iter()
            .map(|f| f.eval(&self.grid, self.method, kx, ky, x, y))
            .collect())
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Index `k` of the axis segment `[axis[k], axis[k+1]]` containing `t`.
/// `t` must already be inside the axis range.
#[inline]
fn locate_segment(axis: &[f32], t: f32) -> usize {
    let upper = axis.partition_point(|&a| a <= t);
    upper.clamp(1, axis.len() - 1) - 1
}

#[inline]
fn segment_fraction(axis: &[f32], k: usize, t: f32) -> f32 {
    (t - axis[k]) / (axis[k + 1] - axis[k])
}

/// Cubic Hermite on segment `k` of `axis`, with Catmull-Rom finite-difference
/// tangents (one-sided at the axis ends). Exact at nodes, C1 across segments.
fn cubic_1d(axis: &[f32], k: usize, t: f32, sample: impl Fn(usize) -> f32) -> f32 {
    let x0 = axis[k];
    let x1 = axis[k + 1];
    let v0 = sample(k);
    let v1 = sample(k + 1);
    let h = x1 - x0;

    let m0 = if k > 0 {
        (v1 - sample(k - 1)) / (x1 - axis[k - 1])
    } else {
        (v1 - v0) / h
    };
    let m1 = if k + 2 < axis.len() {
        (sample(k + 2) - v0) / (axis[k + 2] - x0)
    } else {
        (v1 - v0) / h
    };

    let s = (t - x0) / h;
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    h00 * v0 + h10 * m0 * h + h01 * v1 + h11 * m1 * h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::kernels::Hat;
    use crate::splat::splat;
    use crate::table::AttributeTable;
    use glam::Vec2;

    /// Dense grid with a hand-picked value pattern, via a 1-particle splat
    /// per node so the pipeline types stay honest.
    fn field_from_fn(
        nx: usize,
        ny: usize,
        method: InterpMethod,
        f: impl Fn(usize, usize) -> f32,
    ) -> (Grid, ChannelGrid, ContinuousField) {
        let grid = Grid::uniform(Vec2::ZERO, 1.0, nx, ny);
        let mut positions = Vec::new();
        let mut ids = Vec::new();
        let mut table = AttributeTable::new(["value"]);
        for i in 0..nx {
            for j in 0..ny {
                let id = (i * ny + j) as u64;
                positions.push(grid.node(i, j));
                ids.push(id);
                table.insert(id, &[f(i, j)]).unwrap();
            }
        }
        // Tight support: each node sees exactly its own particle with w = 1
        let weights = splat(&grid, &positions, &ids, 0.5, &Hat).unwrap();
        let values = aggregate(&weights, &table, &["value"]).unwrap();
        let field = ContinuousField::build(&grid, &values, method).unwrap();
        (grid, values, field)
    }

    #[test]
    fn test_linear_exact_at_nodes() {
        let (grid, values, field) = field_from_fn(3, 3, InterpMethod::Linear, |i, j| {
            (i * 10 + j) as f32
        });
        for i in 0..3 {
            for j in 0..3 {
                let node = grid.node(i, j);
                let out = field.query(node.x, node.y).unwrap();
                assert!(
                    (out[0] - values.value(i, j, 0)).abs() < 1e-5,
                    "node ({}, {}): {} vs {}",
                    i,
                    j,
                    out[0],
                    values.value(i, j, 0)
                );
            }
        }
    }

    #[test]
    fn test_cubic_exact_at_nodes() {
        let (grid, values, field) = field_from_fn(5, 4, InterpMethod::Cubic, |i, j| {
            (i as f32).sin() + (j as f32) * 0.7
        });
        for i in 0..5 {
            for j in 0..4 {
                let node = grid.node(i, j);
                let out = field.query(node.x, node.y).unwrap();
                assert!(
                    (out[0] - values.value(i, j, 0)).abs() < 1e-4,
                    "node ({}, {}): {} vs {}",
                    i,
                    j,
                    out[0],
                    values.value(i, j, 0)
                );
            }
        }
    }

    #[test]
    fn test_linear_midpoint_average() {
        let (_, _, field) = field_from_fn(2, 2, InterpMethod::Linear, |i, _| i as f32);
        // Halfway between columns 0 and 1 the value is 0.5 regardless of y
        let out = field.query(0.5, 0.25).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-6, "got {}", out[0]);
    }

    #[test]
    fn test_cubic_reproduces_linear_ramp() {
        // Catmull-Rom tangents are exact for affine data, so a plane stays a
        // plane between nodes too
        let (_, _, field) = field_from_fn(5, 5, InterpMethod::Cubic, |i, j| {
            2.0 * i as f32 - 3.0 * j as f32 + 1.0
        });
        for (x, y) in [(0.3, 0.3), (1.7, 2.2), (3.9, 0.1), (2.5, 3.5)] {
            let out = field.query(x, y).unwrap();
            let expected = 2.0 * x - 3.0 * y + 1.0;
            assert!(
                (out[0] - expected).abs() < 1e-4,
                "at ({}, {}): {} vs {}",
                x,
                y,
                out[0],
                expected
            );
        }
    }

    #[test]
    fn test_out_of_domain_rejected() {
        let (_, _, field) = field_from_fn(3, 3, InterpMethod::Linear, |_, _| 1.0);
        assert_eq!(
            field.query(-0.1, 1.0).unwrap_err(),
            SplatError::OutOfDomain { x: -0.1, y: 1.0 }
        );
        assert_eq!(
            field.query(1.0, 2.1).unwrap_err(),
            SplatError::OutOfDomain { x: 1.0, y: 2.1 }
        );
        assert!(field.query(f32::NAN, 1.0).is_err());
        // Boundary itself is inside
        assert!(field.query(2.0, 2.0).is_ok());
        assert!(field.query(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_cubic_needs_four_nodes_per_axis() {
        let grid = Grid::uniform(Vec2::ZERO, 1.0, 3, 5);
        let weights = splat(&grid, &[], &[], 1.0, &Hat).unwrap();
        let table = AttributeTable::new(["value"]);
        let values = aggregate(&weights, &table, &["value"]).unwrap();
        let err = ContinuousField::build(&grid, &values, InterpMethod::Cubic).unwrap_err();
        assert_eq!(
            err,
            SplatError::InsufficientGridResolution {
                method: "cubic",
                axis: "x",
                needed: 4,
                got: 3,
            }
        );
        // Linear is fine on the same grid
        assert!(ContinuousField::build(&grid, &values, InterpMethod::Linear).is_ok());
    }

    #[test]
    fn test_locate_segment() {
        let axis = [0.0, 1.0, 2.5, 4.0];
        assert_eq!(locate_segment(&axis, 0.0), 0);
        assert_eq!(locate_segment(&axis, 0.5), 0);
        assert_eq!(locate_segment(&axis, 1.0), 1);
        assert_eq!(locate_segment(&axis, 3.0), 2);
        assert_eq!(locate_segment(&axis, 4.0), 2);
    }

    #[test]
    fn test_nonuniform_axes() {
        let grid = Grid::from_axes(vec![0.0, 0.5, 2.0, 5.0], vec![0.0, 1.0, 1.5, 4.0]);
        let mut positions = Vec::new();
        let mut ids = Vec::new();
        let mut table = AttributeTable::new(["value"]);
        for i in 0..4 {
            for j in 0..4 {
                let id = (i * 4 + j) as u64;
                positions.push(grid.node(i, j));
                ids.push(id);
                // Affine in physical coordinates
                let node = grid.node(i, j);
                table.insert(id, &[node.x + 2.0 * node.y]).unwrap();
            }
        }
        let weights = splat(&grid, &positions, &ids, 0.25, &Hat).unwrap();
        let values = aggregate(&weights, &table, &["value"]).unwrap();
        for method in [InterpMethod::Linear, InterpMethod::Cubic] {
            let field = ContinuousField::build(&grid, &values, method).unwrap();
            for (x, y) in [(0.25, 0.5), (1.0, 1.25), (3.0, 2.0)] {
                let out = field.query(x, y).unwrap();
                let expected = x + 2.0 * y;
                assert!(
                    (out[0] - expected).abs() < 1e-4,
                    "{:?} at ({}, {}): {} vs {}",
                    method,
                    x,
                    y,
                    out[0],
                    expected
                );
            }
        }
    }
}
