//! Rectangular grid of nodes defined by two coordinate meshes.
//!
//! The meshes are rectilinear: they factor into one coordinate axis per
//! dimension, with node `(i, j)` sitting at `(xs[i], ys[j])`. Flat storage is
//! x-major: flat index `i * ny + j`.

use glam::Vec2;

use crate::error::{Result, SplatError};

/// Grid topology for one splat/aggregate/interpolate cycle.
///
/// Axes are strictly increasing and fixed for the lifetime of the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    xs: Vec<f32>,
    ys: Vec<f32>,
}

impl Grid {
    /// Build a grid from its two coordinate axes.
    pub fn from_axes(xs: Vec<f32>, ys: Vec<f32>) -> Self {
        assert!(!xs.is_empty(), "x axis must have at least one node");
        assert!(!ys.is_empty(), "y axis must have at least one node");
        assert!(
            xs.windows(2).all(|w| w[0] < w[1]),
            "x axis must be strictly increasing"
        );
        assert!(
            ys.windows(2).all(|w| w[0] < w[1]),
            "y axis must be strictly increasing"
        );
        Self { xs, ys }
    }

    /// Uniform grid: `nx` x `ny` nodes spaced `spacing` apart from `origin`.
    pub fn uniform(origin: Vec2, spacing: f32, nx: usize, ny: usize) -> Self {
        assert!(spacing > 0.0, "spacing must be > 0");
        let xs = (0..nx).map(|i| origin.x + i as f32 * spacing).collect();
        let ys = (0..ny).map(|j| origin.y + j as f32 * spacing).collect();
        Self::from_axes(xs, ys)
    }

    /// Build a grid from two full coordinate meshes of shape `(nx, ny)`,
    /// stored x-major.
    ///
    /// Fails with `ShapeMismatch` if either mesh does not have `nx * ny`
    /// entries. The meshes must factor into per-axis coordinates
    /// (`X[i][j] == X[i][0]`, `Y[i][j] == Y[0][j]`), the layout a meshgrid
    /// produces.
    pub fn from_meshes(nx: usize, ny: usize, x_mesh: &[f32], y_mesh: &[f32]) -> Result<Self> {
        let len = nx * ny;
        if x_mesh.len() != len {
            return Err(SplatError::ShapeMismatch {
                what: "grid x mesh",
                expected: len,
                actual: x_mesh.len(),
            });
        }
        if y_mesh.len() != len {
            return Err(SplatError::ShapeMismatch {
                what: "grid y mesh",
                expected: len,
                actual: y_mesh.len(),
            });
        }
        let xs: Vec<f32> = (0..nx).map(|i| x_mesh[i * ny]).collect();
        let ys: Vec<f32> = (0..ny).map(|j| y_mesh[j]).collect();
        for i in 0..nx {
            for j in 0..ny {
                let flat = i * ny + j;
                assert!(
                    x_mesh[flat] == xs[i] && y_mesh[flat] == ys[j],
                    "coordinate meshes must be rectilinear (meshgrid layout)"
                );
            }
        }
        Ok(Self::from_axes(xs, ys))
    }

    /// Nodes along the x axis.
    #[inline]
    pub fn nx(&self) -> usize {
        self.xs.len()
    }

    /// Nodes along the y axis.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ys.len()
    }

    /// `(nx, ny)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.xs.len(), self.ys.len())
    }

    /// Total node count.
    pub fn len(&self) -> usize {
        self.xs.len() * self.ys.len()
    }

    pub fn is_empty(&self) -> bool {
        // Axes are validated non-empty at construction
        false
    }

    pub fn xs(&self) -> &[f32] {
        &self.xs
    }

    pub fn ys(&self) -> &[f32] {
        &self.ys
    }

    /// Physical location of node `(i, j)`.
    #[inline]
    pub fn node(&self, i: usize, j: usize) -> Vec2 {
        debug_assert!(i < self.nx() && j < self.ny());
        Vec2::new(self.xs[i], self.ys[j])
    }

    /// Flat x-major index of node `(i, j)`.
    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx() && j < self.ny());
        i * self.ys.len() + j
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_grid_nodes() {
        let grid = Grid::uniform(Vec2::new(1.0, 2.0), 0.5, 3, 4);
        assert_eq!(grid.shape(), (3, 4));
        assert_eq!(grid.node(0, 0), Vec2::new(1.0, 2.0));
        assert_eq!(grid.node(2, 3), Vec2::new(2.0, 3.5));
    }

    #[test]
    fn test_flat_indexing_is_x_major() {
        let grid = Grid::uniform(Vec2::ZERO, 1.0, 3, 2);
        assert_eq!(grid.idx(0, 0), 0);
        assert_eq!(grid.idx(0, 1), 1);
        assert_eq!(grid.idx(1, 0), 2);
        assert_eq!(grid.idx(2, 1), 5);
    }

    #[test]
    fn test_from_meshes_roundtrip() {
        let base = Grid::from_axes(vec![0.0, 1.0, 3.0], vec![-1.0, 2.0]);
        let (nx, ny) = base.shape();
        let mut x_mesh = Vec::new();
        let mut y_mesh = Vec::new();
        for i in 0..nx {
            for j in 0..ny {
                let node = base.node(i, j);
                x_mesh.push(node.x);
                y_mesh.push(node.y);
            }
        }
        let rebuilt = Grid::from_meshes(nx, ny, &x_mesh, &y_mesh).unwrap();
        assert_eq!(rebuilt, base);
    }

    #[test]
    fn test_from_meshes_shape_mismatch() {
        let err = Grid::from_meshes(2, 2, &[0.0, 0.0, 1.0], &[0.0, 1.0, 0.0, 1.0]).unwrap_err();
        assert!(matches!(err, SplatError::ShapeMismatch { .. }));
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn test_non_monotone_axis_rejected() {
        Grid::from_axes(vec![0.0, 2.0, 1.0], vec![0.0, 1.0]);
    }
}
