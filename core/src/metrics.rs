use serde::Serialize;

use crate::components::{label_components, ComponentLabels};
use crate::graph::{Graph, NodeId};

/// Summary figures for a network view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    pub largest_component_size: usize,
    /// Share of nodes in the largest component, 0.0 for an empty graph.
    pub largest_component_share: f64,
    /// `2E / (N(N-1))`, 0.0 below two nodes.
    pub density: f64,
    pub total_length_km: f64,
}

/// Compute summary metrics, reusing labels already computed for this graph.
pub fn network_metrics_with(graph: &Graph, labels: &ComponentLabels) -> NetworkMetrics {
    let n = graph.node_count();
    let e = graph.edge_count();
    let largest = labels.largest().map_or(0, |(_, size)| size);

    NetworkMetrics {
        node_count: n,
        edge_count: e,
        component_count: labels.component_count(),
        largest_component_size: largest,
        largest_component_share: if n > 0 { largest as f64 / n as f64 } else { 0.0 },
        density: if n > 1 {
            (2 * e) as f64 / (n as f64 * (n - 1) as f64)
        } else {
            0.0
        },
        total_length_km: graph.edges().iter().map(|e| e.length_km).sum(),
    }
}

pub fn network_metrics(graph: &Graph) -> NetworkMetrics {
    network_metrics_with(graph, &label_components(graph))
}

/// Degree information for a single node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeResult {
    pub node_id: NodeId,
    pub name: Option<String>,
    pub district: Option<String>,
    pub degree: u32,
}

/// Return nodes ranked by undirected degree.
///
/// If `top_n` is 0, returns all nodes. Otherwise returns the top N by
/// degree (descending). Ties keep graph order.
pub fn degree_centrality(graph: &Graph, top_n: usize) -> Vec<DegreeResult> {
    let degrees = graph.degrees();
    let mut results: Vec<DegreeResult> = graph
        .nodes()
        .iter()
        .zip(degrees)
        .map(|(node, degree)| DegreeResult {
            node_id: node.id.clone(),
            name: node.name.clone(),
            district: node.district.clone(),
            degree,
        })
        .collect();

    results.sort_by(|a, b| b.degree.cmp(&a.degree));

    if top_n > 0 && top_n < results.len() {
        results.truncate(top_n);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeRecord, NodeRecord, RawGraph};

    fn star_plus_pair() -> Graph {
        Graph::load(RawGraph {
            nodes: ["hub", "a", "b", "c", "x", "y"]
                .into_iter()
                .map(NodeRecord::new)
                .collect(),
            edges: vec![
                EdgeRecord::new("hub", "a", 1.0, "Local"),
                EdgeRecord::new("hub", "b", 2.0, "Local"),
                EdgeRecord::new("hub", "c", 0.5, "Local"),
                EdgeRecord::new("x", "y", 1.5, "Metropolitana"),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_metrics() {
        let m = network_metrics(&star_plus_pair());
        assert_eq!(m.node_count, 6);
        assert_eq!(m.edge_count, 4);
        assert_eq!(m.component_count, 2);
        assert_eq!(m.largest_component_size, 4);
        assert!((m.largest_component_share - 4.0 / 6.0).abs() < 1e-9);
        assert!((m.density - 8.0 / 30.0).abs() < 1e-9);
        assert!((m.total_length_km - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_empty() {
        let m = network_metrics(&Graph::new());
        assert_eq!(m.component_count, 0);
        assert_eq!(m.largest_component_share, 0.0);
        assert_eq!(m.density, 0.0);
    }

    #[test]
    fn test_degree_ranking() {
        let ranked = degree_centrality(&star_plus_pair(), 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].node_id, "hub");
        assert_eq!(ranked[0].degree, 3);
        // Ties keep graph order.
        assert_eq!(ranked[1].node_id, "a");
        assert_eq!(ranked[2].node_id, "b");
    }

    #[test]
    fn test_degree_all() {
        assert_eq!(degree_centrality(&star_plus_pair(), 0).len(), 6);
    }
}
