//! PageRank over the undirected network.
//!
//! Each edge is followed in both directions, parallel edges collapse and
//! self-loops are ignored, so the walk sees the same simple graph as
//! betweenness. Nodes with no neighbor spread their mass over every node.

use crate::centrality::{simple_neighbors, CriticalNode};
use crate::graph::Graph;

pub const DEFAULT_DAMPING: f64 = 0.85;

/// Per-node L1 tolerance; the run stops once the total change is below
/// `node_count * tolerance`.
pub const DEFAULT_PAGERANK_TOLERANCE: f64 = 1e-6;

pub const DEFAULT_PAGERANK_MAX_ITER: usize = 100;

/// PageRank scores parallel to `graph.nodes()`, summing to 1.
///
/// `damping` is clamped to `[0, 1]`. If the scores have not converged after
/// `max_iter` rounds the last iterate is returned.
pub fn pagerank(graph: &Graph, damping: f64, tolerance: f64, max_iter: usize) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    let d = if damping.is_nan() { DEFAULT_DAMPING } else { damping.clamp(0.0, 1.0) };
    let nbrs = simple_neighbors(graph);
    let uniform = 1.0 / n as f64;

    let mut rank = vec![uniform; n];
    let mut next = vec![0.0f64; n];

    for _ in 0..max_iter {
        let dangling: f64 = (0..n).filter(|&v| nbrs[v].is_empty()).map(|v| rank[v]).sum();
        let base = (1.0 - d) * uniform + d * dangling * uniform;
        next.iter_mut().for_each(|x| *x = base);

        for (u, list) in nbrs.iter().enumerate() {
            if list.is_empty() {
                continue;
            }
            let share = d * rank[u] / list.len() as f64;
            for &v in list {
                next[v] += share;
            }
        }

        let change: f64 = rank.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut rank, &mut next);
        if change < n as f64 * tolerance {
            break;
        }
    }
    rank
}

/// Nodes ranked by PageRank with default parameters, highest first.
///
/// Ties keep graph order. `top_n == 0` returns every node.
pub fn pagerank_ranking(graph: &Graph, top_n: usize) -> Vec<CriticalNode> {
    let scores = pagerank(
        graph,
        DEFAULT_DAMPING,
        DEFAULT_PAGERANK_TOLERANCE,
        DEFAULT_PAGERANK_MAX_ITER,
    );
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    if top_n > 0 {
        order.truncate(top_n);
    }
    order
        .into_iter()
        .map(|i| CriticalNode {
            id: graph.nodes()[i].id.clone(),
            score: scores[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeRecord, NodeRecord, RawGraph};

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        Graph::load(RawGraph {
            nodes: nodes.iter().map(|&id| NodeRecord::new(id)).collect(),
            edges: edges
                .iter()
                .map(|&(a, b)| EdgeRecord::new(a, b, 1.0, "Local"))
                .collect(),
        })
        .unwrap()
    }

    fn default_rank(g: &Graph) -> Vec<f64> {
        pagerank(g, DEFAULT_DAMPING, DEFAULT_PAGERANK_TOLERANCE, DEFAULT_PAGERANK_MAX_ITER)
    }

    #[test]
    fn test_cycle_is_uniform() {
        let g = graph(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")],
        );
        for score in default_rank(&g) {
            assert!((score - 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_star_hub_first() {
        let g = graph(
            &["a", "hub", "b", "c", "d"],
            &[("hub", "a"), ("hub", "b"), ("hub", "c"), ("hub", "d")],
        );
        let ranked = pagerank_ranking(&g, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "hub");
        assert!(ranked[0].score > ranked[1].score);

        let total: f64 = default_rank(&g).iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_nodes_keep_mass() {
        let g = graph(&["a", "b", "lone"], &[("a", "b"), ("a", "b"), ("lone", "lone")]);
        let scores = default_rank(&g);
        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((scores[0] - scores[1]).abs() < 1e-12);
        assert!(scores[2] > 0.0);
    }

    #[test]
    fn test_empty_graph() {
        assert!(default_rank(&Graph::new()).is_empty());
        assert!(pagerank_ranking(&Graph::new(), 10).is_empty());
    }
}
