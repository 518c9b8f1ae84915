//! Hover highlighting.
//!
//! Hovering a node keeps it, its direct neighbours, and its incident edges
//! at full opacity and dims everything else. Adjacency is read from the
//! live model on every enter.

use serde::Serialize;

use crate::config::GraphConfig;
use crate::graph::{EdgeId, GraphModel, NodeId};

/// Opacity per node and per edge, indexed by [`NodeId`] and [`EdgeId`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpacityMap {
    /// The hovered node, if any.
    pub hovered: Option<NodeId>,
    /// Opacity by node slot.
    pub nodes: Vec<f64>,
    /// Opacity by edge index.
    pub edges: Vec<f64>,
}

impl OpacityMap {
    /// Everything at full opacity.
    pub fn opaque(model: &GraphModel) -> Self {
        Self {
            hovered: None,
            nodes: vec![1.0; model.node_count()],
            edges: vec![1.0; model.edge_count()],
        }
    }

    /// Opacity of a node.
    pub fn node(&self, id: NodeId) -> Option<f64> {
        self.nodes.get(id.index()).copied()
    }

    /// Opacity of an edge.
    pub fn edge(&self, id: EdgeId) -> Option<f64> {
        self.edges.get(id.index()).copied()
    }
}

/// Hover handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Hover {
    dim: f64,
    hovered: Option<NodeId>,
}

impl Hover {
    /// Build from the session configuration.
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            dim: config.dim_opacity(),
            hovered: None,
        }
    }

    /// Currently hovered node.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Pointer entered a node. Returns `None` for unknown nodes.
    pub fn enter(&mut self, model: &GraphModel, id: NodeId) -> Option<OpacityMap> {
        if !model.contains(id) {
            return None;
        }
        self.hovered = Some(id);

        let mut nodes = vec![self.dim; model.node_count()];
        let mut edges = vec![self.dim; model.edge_count()];
        nodes[id.index()] = 1.0;
        for neighbor in model.neighbors(id) {
            nodes[neighbor.index()] = 1.0;
        }
        for edge in model.incident_edges(id) {
            edges[edge.index()] = 1.0;
        }

        Some(OpacityMap {
            hovered: Some(id),
            nodes,
            edges,
        })
    }

    /// Pointer left the hovered node. Returns `None` if nothing was hovered.
    pub fn leave(&mut self, model: &GraphModel) -> Option<OpacityMap> {
        self.hovered.take()?;
        Some(OpacityMap::opaque(model))
    }
}
