//! GraphModel - validated, indexed graph for one layout session.
//!
//! The model stores node records in an arena addressed by [`NodeId`] and the
//! topology in petgraph's StableGraph. It is immutable once built: replacing
//! the graph means building a new model and restarting the session.

use petgraph::Directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;

use super::edge::{EdgeId, LinkDescription};
use super::node::{NodeDescription, NodeId};
use crate::error::{Error, Result};

/// Graph description supplied by the host:
/// `{ nodes: [{id, radius?}], links: [{source, target}] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Node list.
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    /// Link list.
    #[serde(default, alias = "edges")]
    pub links: Vec<LinkDescription>,
}

impl GraphDescription {
    /// Build a description from node identities and identity pairs.
    pub fn from_pairs<'a>(
        nodes: impl IntoIterator<Item = &'a str>,
        links: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            nodes: nodes.into_iter().map(NodeDescription::new).collect(),
            links: links
                .into_iter()
                .map(|(source, target)| LinkDescription::new(source, target))
                .collect(),
        }
    }

    /// True if there is nothing to lay out.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Validated graph topology.
///
/// This struct manages:
/// - Node keys, radii and starting positions in arena order
/// - Identity → NodeId index for O(1) lookup
/// - Edge endpoints in input order
/// - Graph topology via petgraph for adjacency queries
#[derive(Debug, Clone)]
pub struct GraphModel {
    /// The underlying graph structure.
    /// Nodes store their NodeId, edges store their EdgeId.
    graph: StableGraph<NodeId, EdgeId, Directed>,

    /// Map from NodeId slot to petgraph NodeIndex
    indices: Vec<NodeIndex>,

    /// Map from identity to NodeId
    key_to_id: HashMap<Rc<str>, NodeId>,

    /// Node identities in arena order
    keys: Vec<Rc<str>>,

    /// Per-node radius overrides
    radii: Vec<Option<f64>>,

    /// Per-node starting positions
    initial: Vec<Option<(f64, f64)>>,

    /// Edge endpoints in input order
    endpoints: Vec<(NodeId, NodeId)>,
}

impl GraphModel {
    /// Validate a description and build the model.
    ///
    /// Fails with [`Error::UnknownEndpoint`] naming the first edge whose
    /// source or target does not resolve, or [`Error::DuplicateNode`] if two
    /// nodes share an identity.
    pub fn from_description(description: &GraphDescription) -> Result<Self> {
        let node_count = description.nodes.len();
        let edge_count = description.links.len();

        let mut graph = StableGraph::with_capacity(node_count, edge_count);
        let mut indices = Vec::with_capacity(node_count);
        let mut key_to_id: HashMap<Rc<str>, NodeId> = HashMap::with_capacity(node_count);
        let mut keys = Vec::with_capacity(node_count);
        let mut radii = Vec::with_capacity(node_count);
        let mut initial = Vec::with_capacity(node_count);

        for (slot, node) in description.nodes.iter().enumerate() {
            let id = NodeId(slot as u32);
            let key: Rc<str> = Rc::from(node.id.as_str());
            if key_to_id.insert(Rc::clone(&key), id).is_some() {
                return Err(Error::DuplicateNode {
                    id: node.id.clone(),
                });
            }
            indices.push(graph.add_node(id));
            keys.push(key);
            radii.push(node.radius);
            initial.push(node.x.zip(node.y));
        }

        let mut endpoints = Vec::with_capacity(edge_count);
        for (i, link) in description.links.iter().enumerate() {
            let (Some(&source), Some(&target)) = (
                key_to_id.get(link.source.as_str()),
                key_to_id.get(link.target.as_str()),
            ) else {
                return Err(Error::UnknownEndpoint {
                    edge: i,
                    from: link.source.clone(),
                    to: link.target.clone(),
                });
            };
            graph.add_edge(
                indices[source.index()],
                indices[target.index()],
                EdgeId(i as u32),
            );
            endpoints.push((source, target));
        }

        Ok(Self {
            graph,
            indices,
            key_to_id,
            keys,
            radii,
            initial,
            endpoints,
        })
    }

    // =========================================================================
    // Node Queries
    // =========================================================================

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.keys.len()
    }

    /// True if the model has no nodes.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All node ids in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.keys.len()).map(|i| NodeId(i as u32))
    }

    /// Resolve an identity to its NodeId.
    pub fn id_of(&self, key: &str) -> Option<NodeId> {
        self.key_to_id.get(key).copied()
    }

    /// Identity of a node.
    pub fn key(&self, id: NodeId) -> Option<&Rc<str>> {
        self.keys.get(id.index())
    }

    /// Radius override of a node, if any.
    pub fn radius(&self, id: NodeId) -> Option<f64> {
        self.radii.get(id.index()).copied().flatten()
    }

    /// Caller-supplied starting position of a node, if any.
    pub fn initial_position(&self, id: NodeId) -> Option<(f64, f64)> {
        self.initial.get(id.index()).copied().flatten()
    }

    /// Check if a node id belongs to this model.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.keys.len()
    }

    /// Number of edges touching a node (self-loops count twice).
    pub fn degree(&self, id: NodeId) -> usize {
        let Some(&index) = self.indices.get(id.index()) else {
            return 0;
        };
        self.graph.edges_directed(index, petgraph::Direction::Outgoing).count()
            + self.graph.edges_directed(index, petgraph::Direction::Incoming).count()
    }

    /// Nodes reachable from `id` through exactly one edge, in either direction.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&index) = self.indices.get(id.index()) else {
            return Vec::new();
        };
        let mut neighbors: Vec<NodeId> = self
            .graph
            .neighbors_undirected(index)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Edges touching a node, in either direction.
    pub fn incident_edges(&self, id: NodeId) -> Vec<EdgeId> {
        let Some(&index) = self.indices.get(id.index()) else {
            return Vec::new();
        };
        let mut edges: Vec<EdgeId> = self
            .graph
            .edges_directed(index, petgraph::Direction::Outgoing)
            .chain(self.graph.edges_directed(index, petgraph::Direction::Incoming))
            .map(|e| *e.weight())
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    // =========================================================================
    // Edge Queries
    // =========================================================================

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Endpoints of every edge, indexed by EdgeId.
    pub fn endpoints(&self) -> &[(NodeId, NodeId)] {
        &self.endpoints
    }

    /// Endpoints of a single edge.
    pub fn edge(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        self.endpoints.get(id.index()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> GraphDescription {
        GraphDescription::from_pairs(["a", "b", "c"], [("a", "b"), ("b", "c")])
    }

    #[test]
    fn test_build_model() {
        let model = GraphModel::from_description(&chain()).unwrap();
        assert_eq!(model.node_count(), 3);
        assert_eq!(model.edge_count(), 2);
        assert_eq!(model.id_of("b"), Some(NodeId(1)));
        assert_eq!(model.key(NodeId(2)).map(|k| &**k), Some("c"));
        assert_eq!(model.edge(EdgeId(1)), Some((NodeId(1), NodeId(2))));
    }

    #[test]
    fn test_unknown_endpoint_names_edge() {
        let description =
            GraphDescription::from_pairs(["a", "b"], [("a", "b"), ("b", "missing")]);
        match GraphModel::from_description(&description) {
            Err(Error::UnknownEndpoint { edge, from, to }) => {
                assert_eq!(edge, 1);
                assert_eq!(from, "b");
                assert_eq!(to, "missing");
            }
            other => panic!("expected UnknownEndpoint, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let description = GraphDescription::from_pairs(["a", "a"], []);
        assert!(matches!(
            GraphModel::from_description(&description),
            Err(Error::DuplicateNode { id }) if id == "a"
        ));
    }

    #[test]
    fn test_neighbors_are_undirected() {
        let model = GraphModel::from_description(&chain()).unwrap();
        assert_eq!(model.neighbors(NodeId(1)), vec![NodeId(0), NodeId(2)]);
        assert_eq!(model.neighbors(NodeId(0)), vec![NodeId(1)]);
        assert_eq!(model.incident_edges(NodeId(1)), vec![EdgeId(0), EdgeId(1)]);
        assert_eq!(model.incident_edges(NodeId(2)), vec![EdgeId(1)]);
    }

    #[test]
    fn test_degree() {
        let model = GraphModel::from_description(&chain()).unwrap();
        assert_eq!(model.degree(NodeId(0)), 1);
        assert_eq!(model.degree(NodeId(1)), 2);
        assert_eq!(model.degree(NodeId(9)), 0);
    }

    #[test]
    fn test_node_overrides() {
        let description = GraphDescription {
            nodes: vec![
                NodeDescription::new("a").with_radius(3.0).at(5.0, 6.0),
                NodeDescription::new("b"),
            ],
            links: Vec::new(),
        };
        let model = GraphModel::from_description(&description).unwrap();
        assert_eq!(model.radius(NodeId(0)), Some(3.0));
        assert_eq!(model.initial_position(NodeId(0)), Some((5.0, 6.0)));
        assert_eq!(model.radius(NodeId(1)), None);
        assert_eq!(model.initial_position(NodeId(1)), None);
    }

    #[test]
    fn test_deserialize_description() {
        let description: GraphDescription = serde_json::from_str(
            r#"{"nodes":[{"id":"a"},{"id":"b","radius":5}],"links":[{"source":"a","target":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(description.nodes.len(), 2);
        assert_eq!(description.links, vec![LinkDescription::new("a", "b")]);

        let empty: GraphDescription = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_numeric_identities_resolve() {
        let description: GraphDescription = serde_json::from_str(
            r#"{"nodes":[{"id":1},{"id":2},{"id":"3"}],"links":[{"source":1,"target":2},{"source":2,"target":3}]}"#,
        )
        .unwrap();
        let model = GraphModel::from_description(&description).unwrap();
        assert_eq!(model.edge(EdgeId(0)), Some((NodeId(0), NodeId(1))));
        assert_eq!(model.edge(EdgeId(1)), Some((NodeId(1), NodeId(2))));
        assert_eq!(model.id_of("1"), Some(NodeId(0)));
    }
}
