//! Graph Model: normalized node and edge data with stable identity.
//!
//! The model is built once per layout session from a [`GraphDescription`].
//! Node records live in an arena addressed by [`NodeId`]; petgraph's
//! StableGraph keeps the topology for O(1) endpoint lookup and adjacency
//! queries during hover highlighting.

mod edge;
mod model;
mod node;

pub use edge::{EdgeId, LinkDescription};
pub use model::{GraphDescription, GraphModel};
pub use node::{NodeDescription, NodeId};
