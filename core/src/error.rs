use thiserror::Error;

use crate::graph::NodeId;

/// Structural problem found while loading raw records.
///
/// Loading never drops bad records silently: the first violation aborts
/// the load and is reported here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedGraph {
    #[error("node record {index} has an empty id")]
    EmptyNodeId { index: usize },

    #[error("duplicate node id '{0}'")]
    DuplicateNode(NodeId),

    #[error("edge {index} references unknown node '{node}'")]
    UnknownEndpoint { index: usize, node: NodeId },

    #[error("edge {index} ({from} - {to}) has invalid length {length} km, must be > 0")]
    InvalidLength {
        index: usize,
        from: NodeId,
        to: NodeId,
        length: f64,
    },
}

/// Routing was asked for endpoints that cannot form a route.
///
/// Reported before any search is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidEndpoints {
    #[error("origin '{0}' is not in the graph")]
    UnknownOrigin(NodeId),

    #[error("destination '{0}' is not in the graph")]
    UnknownDestination(NodeId),

    #[error("origin and destination are the same node '{0}'")]
    SameNode(NodeId),
}

/// A centrality run observed its cancellation token and stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("centrality computation cancelled after {sources_done} of {sources_total} sources")]
pub struct Cancelled {
    pub sources_done: usize,
    pub sources_total: usize,
}

/// A textual option (strategy, way type) could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {what} '{value}', expected one of: {expected}")]
pub struct ParseError {
    pub what: &'static str,
    pub value: String,
    pub expected: &'static str,
}
