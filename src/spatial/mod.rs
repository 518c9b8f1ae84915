//! Spatial indexing for collision candidates and pointer hit-testing.
//!
//! This module provides an R-tree based spatial index over node positions,
//! so neither the collision force nor pointer lookups scan every node.

mod rtree;

pub use rtree::SpatialIndex;
