//! Static spatial index over particle positions.
//!
//! An R-tree bulk-loaded once from the particle cloud. Queries are O(log n)
//! after the O(n log n) build. The index is immutable after construction and
//! can be shared across worker threads without locking; rebuild from scratch
//! if particle positions change.

use glam::Vec2;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A particle position tagged with its slot in the source arrays.
#[derive(Clone, Copy, Debug)]
struct IndexedPoint {
    position: [f32; 2],
    slot: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Radius-query index over a fixed particle point set.
pub struct NeighborIndex {
    tree: RTree<IndexedPoint>,
}

impl NeighborIndex {
    /// Bulk-load the index from particle positions.
    pub fn build(positions: &[Vec2]) -> Self {
        let points = positions
            .iter()
            .enumerate()
            .map(|(slot, p)| IndexedPoint {
                position: [p.x, p.y],
                slot,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Slots of all particles strictly within `radius` of `query`.
    ///
    /// The boundary is exclusive: a particle at exactly `radius` is not
    /// returned, consistent with compact-support kernels being zero there.
    pub fn within_radius(&self, query: Vec2, radius: f32) -> impl Iterator<Item = usize> + '_ {
        let center = [query.x, query.y];
        let r2 = radius * radius;
        self.tree
            .locate_within_distance(center, r2)
            .filter(move |p| p.distance_2(&center) < r2)
            .map(|p| p.slot)
    }

    /// Number of indexed particles.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
