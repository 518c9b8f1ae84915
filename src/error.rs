//! Error types surfaced at session start.

/// Errors reported synchronously when a layout session cannot begin.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An edge references a node identity that is not in the node list.
    #[error("edge {edge} references an unknown node ({from} -> {to})")]
    UnknownEndpoint {
        /// Position of the offending edge in the input link list.
        edge: usize,
        /// Source identity as supplied.
        from: String,
        /// Target identity as supplied.
        to: String,
    },

    /// Two nodes share the same identity.
    #[error("duplicate node identity: {id}")]
    DuplicateNode {
        /// The repeated identity.
        id: String,
    },

    /// The host handed over data that could not be decoded.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
