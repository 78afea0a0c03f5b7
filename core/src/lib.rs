//! cyclenet-core: In-memory cycle-network analytics.
//!
//! A pure Rust library that holds a street/cycleway graph and answers the
//! structural queries a planning dashboard needs: filtering, connected
//! components, shortest routes, betweenness centrality and PageRank.
//! No threads, no I/O: every function is a computation over a `Graph`
//! value, and every derived view is a fresh copy.
//!
//! The `cyclenet-engine` crate wraps this with a source-of-truth holder and
//! an isolated centrality worker.

mod centrality;
mod components;
mod error;
mod filter;
mod graph;
mod metrics;
mod pagerank;
mod route;

pub use centrality::{
    betweenness, centrality_view, select_sources, CancelToken, CentralityOptions,
    CentralityScores, CriticalNode, SampleStrategy, CENTRALITY_BOOST, DEFAULT_AUTO_THRESHOLD,
    DEFAULT_SAMPLE_SIZE,
};
pub use components::{
    component_group, label_components, labeled_view, ComponentId, ComponentLabels,
};
pub use error::{Cancelled, InvalidEndpoints, MalformedGraph, ParseError};
pub use filter::{apply_filters, FilterCriteria, WayTypeFilter};
pub use graph::{
    Adjacent, Coordinates, Edge, EdgeRecord, Graph, Node, NodeId, NodeIndex, NodeRecord, RawGraph,
};
pub use metrics::{
    degree_centrality, network_metrics, network_metrics_with, DegreeResult, NetworkMetrics,
};
pub use pagerank::{
    pagerank, pagerank_ranking, DEFAULT_DAMPING, DEFAULT_PAGERANK_MAX_ITER,
    DEFAULT_PAGERANK_TOLERANCE,
};
pub use route::{
    effective_speed, route_view, shortest_route, travel_minutes, Route, RouteSegment,
    DEFAULT_AVERAGE_SPEED_KMH, MAX_AVERAGE_SPEED_KMH, MIN_AVERAGE_SPEED_KMH, ROUTE_EDGE_FACTOR,
    ROUTE_NODE_BOOST,
};
