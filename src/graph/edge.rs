//! Edge identity and input description.
//!
//! Edges have no position of their own: their rendered endpoints are read
//! from the two endpoint nodes on every tick.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::deserialize_key;

/// Stable edge identifier: the edge's position in the input link list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Position in the link list.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// A link as supplied by the host: `{ source, target }` by node identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescription {
    /// Source node identity.
    #[serde(deserialize_with = "deserialize_key")]
    pub source: String,
    /// Target node identity.
    #[serde(deserialize_with = "deserialize_key")]
    pub target: String,
}

impl LinkDescription {
    /// Create a link between two node identities.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
