//! R*-tree over node positions, backed by rstar.
//!
//! The simulation rebuilds it every tick from predicted positions to find
//! collision candidates; the session rebuilds it lazily for hit-testing.

use std::fmt;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;

/// A node's position as stored in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    id: NodeId,
    at: [f64; 2],
}

impl RTreeObject for Entry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.at)
    }
}

impl PointDistance for Entry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (dx, dy) = (self.at[0] - point[0], self.at[1] - point[1]);
        dx * dx + dy * dy
    }
}

/// Snapshot of node positions for radius and nearest-node queries.
///
/// The snapshot goes stale as soon as nodes move; callers rebuild it when
/// they need it.
pub struct SpatialIndex {
    tree: RTree<Entry>,
}

impl SpatialIndex {
    /// An index with no entries.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Replace the contents with `(id, x, y)` positions, bulk loaded.
    ///
    /// Non-finite coordinates are skipped.
    pub fn rebuild(&mut self, positions: impl IntoIterator<Item = (NodeId, f64, f64)>) {
        let entries = positions
            .into_iter()
            .filter(|&(_, x, y)| x.is_finite() && y.is_finite())
            .map(|(id, x, y)| Entry { id, at: [x, y] })
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    /// Nodes within `max_distance` of a point, nearest first, with their
    /// squared distances.
    pub fn nearest_first(&self, x: f64, y: f64, max_distance: f64) -> Vec<(NodeId, f64)> {
        let limit = max_distance * max_distance;
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[x, y])
            .take_while(|&(_, d2)| d2 <= limit)
            .map(|(entry, d2)| (entry.id, d2))
            .collect()
    }

    /// Nodes within `radius` of a point, in no particular order.
    pub fn in_radius(&self, x: f64, y: f64, radius: f64) -> Vec<NodeId> {
        self.tree
            .locate_within_distance([x, y], radius * radius)
            .map(|entry| entry.id)
            .collect()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// True if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len()).finish()
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(points: &[(u32, f64, f64)]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(points.iter().map(|&(id, x, y)| (NodeId(id), x, y)));
        index
    }

    #[test]
    fn test_nearest_first_ordering() {
        let index = index(&[(0, 0.0, 0.0), (1, 3.0, 0.0), (2, 10.0, 0.0)]);

        let hits = index.nearest_first(4.0, 0.0, 5.0);
        let ids: Vec<_> = hits.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![NodeId(1), NodeId(0)]);
        assert_eq!(hits[0].1, 1.0);

        assert!(index.nearest_first(6.5, 0.0, 0.5).is_empty());
    }

    #[test]
    fn test_in_radius_collects_candidates() {
        let index = index(&[(0, 0.0, 0.0), (1, 3.0, 4.0), (2, 10.0, 0.0)]);

        let mut hits = index.in_radius(0.0, 0.0, 5.0);
        hits.sort();
        assert_eq!(hits, vec![NodeId(0), NodeId(1)]);
    }

    #[test]
    fn test_rebuild_replaces_and_skips_non_finite() {
        let mut index = index(&[(0, 0.0, 0.0), (1, f64::NAN, 1.0), (2, 2.0, 2.0)]);
        assert_eq!(index.len(), 2);

        index.rebuild([(NodeId(7), 50.0, 50.0)]);
        assert_eq!(index.in_radius(50.0, 50.0, 1.0), vec![NodeId(7)]);
        assert!(index.in_radius(0.0, 0.0, 5.0).is_empty());

        index.clear();
        assert!(index.is_empty());
    }
}
