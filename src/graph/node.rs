//! Node identity and input description.
//!
//! A node is known to the host by its string key and to the engine by its
//! arena slot ([`NodeId`]), assigned in input order. Radius and starting
//! position are optional overrides.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A node's slot in the session arena, valid for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Arena slot as an index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// A node identity on the wire: a string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Str(String),
    Int(i64),
    Float(f64),
}

/// Deserialize a node identity, turning numbers into their decimal form so
/// `{id: 1}` and `{source: 1}` resolve to the same key.
pub(super) fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawKey::deserialize(deserializer)? {
        RawKey::Str(s) => s,
        RawKey::Int(n) => n.to_string(),
        RawKey::Float(f) => f.to_string(),
    })
}

/// A node as supplied by the host: `{ id, radius?, x?, y? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Unique identity; numbers are accepted and keyed by their decimal form.
    #[serde(deserialize_with = "deserialize_key")]
    pub id: String,
    /// Radius override; the configured node radius applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Starting x position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Starting y position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl NodeDescription {
    /// A node with only an identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            radius: None,
            x: None,
            y: None,
        }
    }

    /// Set the radius override.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Set the starting position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}
