use thiserror::Error;

use crate::graph::NodeId;

/** the adjacency description given to the graph model is structurally invalid */
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedGraphError {
    /// a row of the adjacency matrix does not have one entry per node
    #[error("adjacency matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        /// offending row
        row: NodeId,
        /// number of entries found
        len: usize,
        /// number of nodes
        expected: usize,
    },
    /// an adjacency matrix entry is neither 0 nor 1
    #[error("adjacency matrix entry ({row},{col}) is {value}, expected 0 or 1")]
    InvalidEntry {
        /// row of the entry
        row: NodeId,
        /// column of the entry
        col: NodeId,
        /// value found
        value: u8,
    },
    /// a neighbor index is not a node of the graph
    #[error("node {node} references node {neighbor}, but the graph has {nb_nodes} nodes")]
    OutOfRange {
        /// node whose adjacency is invalid
        node: NodeId,
        /// referenced index
        neighbor: usize,
        /// number of nodes
        nb_nodes: usize,
    },
    /// a → b is present but b → a is not
    #[error("adjacency is not symmetric: {a} -> {b} has no reverse edge")]
    Asymmetric {
        /// source of the one-way edge
        a: NodeId,
        /// target of the one-way edge
        b: NodeId,
    },
    /// a node must differ from itself
    #[error("node {0} is constrained against itself")]
    SelfLoop(NodeId),
    /// the label list does not match the node count
    #[error("expected {expected} node labels, got {got}")]
    LabelCount {
        /// number of nodes
        expected: usize,
        /// number of labels given
        got: usize,
    },
}

/** precondition violations of the assignment state */
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentError {
    /// no unassigned node is left to select
    #[error("no unassigned node left")]
    Empty,
    /// the node is not part of the assigned sequence
    #[error("node {0} is not assigned")]
    NotFound(NodeId),
}

/** errors raised while reading instances or writing results */
#[derive(Debug, Error)]
pub enum InstanceError {
    /// file could not be read or written
    #[error("i/o error on {path}: {source}")]
    Io {
        /// file involved
        path: String,
        /// underlying error
        #[source]
        source: std::io::Error,
    },
    /// invalid JSON document
    #[error("invalid JSON instance: {0}")]
    Json(#[from] serde_json::Error),
    /// invalid DIMACS file
    #[error("invalid DIMACS instance: {0}")]
    Dimacs(String),
    /// structurally invalid graph
    #[error(transparent)]
    Malformed(#[from] MalformedGraphError),
    /// the color domain has no color
    #[error("the color domain must contain at least one color")]
    EmptyDomain,
    /// a color label is given twice
    #[error("color {0} appears twice in the color domain")]
    DuplicateColor(String),
    /// the instance gives neither an adjacency matrix nor an edge list (or both)
    #[error("an instance needs exactly one of `adjacency` or `edges` ({0})")]
    MissingAdjacency(String),
    /// the instance type requires an instance argument
    #[error("instances of type {0} need --instance")]
    MissingInstance(String),
    /// unknown instance type on the command line
    #[error("unknown instance type {0}")]
    UnknownType(String),
    /// random instance description is not `nb_nodes:density:seed`
    #[error("invalid random instance description {0} (expected nb_nodes:density:seed)")]
    InvalidRandomSpec(String),
}
