//! The four stateless operations the dashboard calls.
//!
//! Each one is a pure function of its inputs: it takes the graph snapshot
//! explicitly and returns a value. [`crate::Engine`] wraps these with the
//! loaded source graph and configuration.

use std::sync::Arc;
use std::time::Duration;

use cyclenet_core::{
    label_components, labeled_view, shortest_route, CentralityOptions, CentralityScores,
    ComponentLabels, FilterCriteria, Graph, InvalidEndpoints, MalformedGraph, RawGraph, Route,
    SampleStrategy,
};

use crate::error::Unavailable;
use crate::generation::RequestGeneration;
use crate::worker::spawn_centrality;

/// Filtered view, plus component labels when they were requested.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Independently owned copy. With labels, each node's group is `comp-N`.
    pub graph: Graph,
    pub labels: Option<ComponentLabels>,
}

/// Validate raw records into a graph.
pub fn load_graph(raw: RawGraph) -> Result<Graph, MalformedGraph> {
    Graph::load(raw)
}

/// Filter `source` and optionally label connected components on the result.
pub fn apply_filters(
    source: &Graph,
    criteria: &FilterCriteria,
    with_components: bool,
) -> FilterOutcome {
    let filtered = cyclenet_core::apply_filters(source, criteria);
    if !with_components {
        return FilterOutcome {
            graph: filtered,
            labels: None,
        };
    }
    let labels = label_components(&filtered);
    FilterOutcome {
        graph: labeled_view(&filtered, &labels),
        labels: Some(labels),
    }
}

/// Shortest route; `Ok(None)` means no path exists.
///
/// `speed_kmh` only affects `duration_min` and is clamped to the range the
/// engine config accepts; NaN uses the default speed.
pub fn compute_route(
    graph: &Graph,
    origin: &str,
    destination: &str,
    speed_kmh: f64,
) -> Result<Option<Route>, InvalidEndpoints> {
    shortest_route(graph, origin, destination, speed_kmh)
}

/// Betweenness on a worker thread, waiting at most `timeout`.
///
/// The graph is copied into the worker, so the caller's graph is never
/// shared with it. On timeout the worker is cancelled and
/// [`Unavailable::TimedOut`] is returned.
pub fn estimate_critical_nodes(
    graph: &Graph,
    sample_size: usize,
    strategy: SampleStrategy,
    timeout: Duration,
) -> Result<CentralityScores, Unavailable> {
    let options = CentralityOptions::new(strategy, sample_size);
    let requests = RequestGeneration::new();
    spawn_centrality(Arc::new(graph.clone()), options, &requests)?.wait(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclenet_core::{EdgeRecord, NodeRecord};

    fn abc_raw() -> RawGraph {
        RawGraph {
            nodes: vec![NodeRecord::new("A"), NodeRecord::new("B"), NodeRecord::new("C")],
            edges: vec![
                EdgeRecord::new("A", "B", 2.0, "Local"),
                EdgeRecord::new("B", "C", 3.0, "Local"),
            ],
        }
    }

    #[test]
    fn test_route_scenario() {
        let g = load_graph(abc_raw()).unwrap();
        let route = compute_route(&g, "A", "C", 15.0).unwrap().unwrap();
        assert_eq!(route.nodes, vec!["A", "B", "C"]);
        assert!((route.distance_km - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_route_speed_is_clamped() {
        let g = load_graph(abc_raw()).unwrap();
        for speed in [0.0, f64::NAN, -1.0] {
            let route = compute_route(&g, "A", "C", speed).unwrap().unwrap();
            assert!(route.duration_min.is_finite());
        }
        let nan = compute_route(&g, "A", "C", f64::NAN).unwrap().unwrap();
        assert!((nan.duration_min - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_route_same_node() {
        let g = load_graph(abc_raw()).unwrap();
        assert_eq!(
            compute_route(&g, "A", "A", 15.0),
            Err(InvalidEndpoints::SameNode("A".into()))
        );
    }

    #[test]
    fn test_load_dangling_edge() {
        let raw = RawGraph {
            nodes: vec![NodeRecord::new("A")],
            edges: vec![EdgeRecord::new("A", "ghost", 1.0, "Local")],
        };
        assert!(matches!(
            load_graph(raw),
            Err(MalformedGraph::UnknownEndpoint { .. })
        ));
    }

    #[test]
    fn test_filter_with_components() {
        let mut raw = abc_raw();
        raw.nodes.push(NodeRecord::new("D"));
        raw.nodes.push(NodeRecord::new("E"));
        raw.edges.push(EdgeRecord::new("D", "E", 1.0, "Local"));
        let g = load_graph(raw).unwrap();

        let out = apply_filters(&g, &FilterCriteria::new(), true);
        let labels = out.labels.unwrap();
        assert_eq!(labels.component_count(), 2);
        assert_eq!(out.graph.node("E").unwrap().group.as_deref(), Some("comp-2"));
        assert!(g.nodes().iter().all(|n| n.group.is_none()));

        let plain = apply_filters(&g, &FilterCriteria::new(), false);
        assert!(plain.labels.is_none());
        assert!(plain.graph.nodes().iter().all(|n| n.group.is_none()));
    }

    #[test]
    fn test_estimate_critical_nodes() {
        let g = load_graph(abc_raw()).unwrap();
        let scores =
            estimate_critical_nodes(&g, 60, SampleStrategy::Full, Duration::from_secs(10)).unwrap();
        assert_eq!(scores.get("B"), Some(1.0));
        assert_eq!(scores.get("A"), Some(0.0));
    }
}
