//! 2D SPH splatting and continuous field reconstruction.
//!
//! Transfers per-particle physical state (mass, velocity, inertia,
//! orientation, spin) onto a regular 2D grid with a smoothed-particle
//! kernel, then rebuilds a continuous multi-channel field from that grid so
//! values can be queried at arbitrary points.
//!
//! The pipeline is pure and synchronous: build index -> splat -> aggregate ->
//! build interpolants, each stage consuming the previous one's complete
//! output. Per-node splatting and per-channel interpolant construction run in
//! parallel.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use splat2d::{splat_field, AttributeTable, FieldConfig, Grid, Hat, InterpMethod};
//!
//! let grid = Grid::uniform(Vec2::ZERO, 1.0, 3, 3);
//!
//! let positions = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 2.0)];
//! let ids = vec![1, 2, 3];
//! let mut table = AttributeTable::new(["mass", "vx"]);
//! table.insert(1, &[2.0, 0.1]).unwrap();
//! table.insert(2, &[4.0, -0.1]).unwrap();
//! table.insert(3, &[1.0, 0.0]).unwrap();
//!
//! let config = FieldConfig {
//!     support_radius: 1.5,
//!     method: InterpMethod::Linear,
//! };
//! let output = splat_field(&grid, &positions, &ids, &table, &["mass", "vx"], &config, &Hat)
//!     .unwrap();
//!
//! // One value per requested channel, in order
//! let at_origin = output.field.query(0.0, 0.0).unwrap();
//! assert_eq!(at_origin.len(), 2);
//! assert!(at_origin[0] > 0.0);
//! ```

pub mod aggregate;
pub mod error;
pub mod grid;
pub mod interp;
pub mod kernels;
pub mod neighbors;
pub mod pipeline;
pub mod splat;
pub mod table;

pub use aggregate::{aggregate, ChannelGrid};
pub use error::{Result, SplatError};
pub use grid::Grid;
pub use interp::{ContinuousField, InterpMethod};
pub use kernels::{Hat, Kernel, Poly6};
pub use neighbors::NeighborIndex;
pub use pipeline::{splat_field, FieldConfig, FieldOutput};
pub use splat::{positions_from_xy, splat, WeightEntry, WeightGrid};
pub use table::AttributeTable;

/// Stable integer particle identifier.
///
/// The join key between the weight grid and the attribute table; must be
/// unique across the particle set and stable for one pipeline cycle.
pub type ParticleId = u64;
