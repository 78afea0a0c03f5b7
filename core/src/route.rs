use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::error::InvalidEndpoints;
use crate::graph::{Graph, NodeId, NodeIndex};

/// Average cycling speed used for travel-time estimates when none is configured.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 15.0;

/// Value added to every node on a route in a route view.
pub const ROUTE_NODE_BOOST: f64 = 6.0;

/// Factor applied to the value of every edge on a route in a route view.
pub const ROUTE_EDGE_FACTOR: f64 = 3.0;

/// One hop of a route and the edge that carries it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    pub from: NodeId,
    pub to: NodeId,
    /// Position of the matched edge in the graph the route was computed on.
    pub edge_index: usize,
    pub length_km: f64,
    pub way_type: String,
}

/// A shortest route between two distinct nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Origin to destination, both inclusive.
    pub nodes: Vec<NodeId>,
    /// `segments[i]` joins `nodes[i]` and `nodes[i + 1]`.
    pub segments: Vec<RouteSegment>,
    pub distance_km: f64,
    pub duration_min: f64,
}

impl Route {
    pub fn origin(&self) -> &str {
        &self.nodes[0]
    }

    pub fn destination(&self) -> &str {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn hop_count(&self) -> usize {
        self.segments.len()
    }
}

/// Slowest average speed accepted for travel-time estimates.
pub const MIN_AVERAGE_SPEED_KMH: f64 = 1.0;

/// Fastest average speed accepted for travel-time estimates.
pub const MAX_AVERAGE_SPEED_KMH: f64 = 80.0;

/// `speed_kmh` clamped to the accepted range. NaN falls back to
/// [`DEFAULT_AVERAGE_SPEED_KMH`].
pub fn effective_speed(speed_kmh: f64) -> f64 {
    if speed_kmh.is_nan() {
        DEFAULT_AVERAGE_SPEED_KMH
    } else {
        speed_kmh.clamp(MIN_AVERAGE_SPEED_KMH, MAX_AVERAGE_SPEED_KMH)
    }
}

/// Minutes needed to ride `distance_km` at `speed_kmh` (see [`effective_speed`]).
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    distance_km / effective_speed(speed_kmh) * 60.0
}

#[derive(Debug, Clone, Copy)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Min-heap on cost; equal costs pop in node order.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest route by total length (Dijkstra over undirected edges).
///
/// Returns `Err` when either endpoint is missing or both are the same node;
/// nothing is computed in that case. Returns `Ok(None)` when the
/// destination cannot be reached. The search stops as soon as the
/// destination is settled.
///
/// Between two nodes joined by parallel edges the shortest edge is used;
/// on equal lengths the first one in edge order wins.
pub fn shortest_route(
    graph: &Graph,
    origin: &str,
    destination: &str,
    speed_kmh: f64,
) -> Result<Option<Route>, InvalidEndpoints> {
    let start = graph
        .index_of(origin)
        .ok_or_else(|| InvalidEndpoints::UnknownOrigin(origin.to_string()))?;
    let target = graph
        .index_of(destination)
        .ok_or_else(|| InvalidEndpoints::UnknownDestination(destination.to_string()))?;
    if start == target {
        return Err(InvalidEndpoints::SameNode(origin.to_string()));
    }

    let adj = graph.adjacency();
    let edges = graph.edges();
    let n = graph.node_count();

    let mut dist = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];
    // node -> (predecessor, edge used to reach it)
    let mut pred: Vec<Option<(NodeIndex, usize)>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[start] = 0.0;
    heap.push(State {
        cost: 0.0,
        node: start,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;
        if node == target {
            break;
        }

        for a in &adj[node] {
            if settled[a.node] {
                continue;
            }
            let next = cost + edges[a.edge].length_km;
            if next < dist[a.node] {
                dist[a.node] = next;
                pred[a.node] = Some((node, a.edge));
                heap.push(State {
                    cost: next,
                    node: a.node,
                });
            }
        }
    }

    if !settled[target] {
        return Ok(None);
    }

    let mut path = vec![target];
    let mut hops = Vec::new();
    let mut current = target;
    while let Some((parent, edge)) = pred[current] {
        hops.push((parent, current, edge));
        path.push(parent);
        current = parent;
    }
    path.reverse();
    hops.reverse();

    let segments: Vec<RouteSegment> = hops
        .into_iter()
        .map(|(from, to, edge)| RouteSegment {
            from: graph.nodes()[from].id.clone(),
            to: graph.nodes()[to].id.clone(),
            edge_index: edge,
            length_km: edges[edge].length_km,
            way_type: edges[edge].way_type.clone(),
        })
        .collect();
    let distance_km: f64 = segments.iter().map(|s| s.length_km).sum();

    Ok(Some(Route {
        nodes: path.into_iter().map(|i| graph.nodes()[i].id.clone()).collect(),
        segments,
        distance_km,
        duration_min: travel_minutes(distance_km, speed_kmh),
    }))
}

/// Copy of `graph` with the route emphasised for display.
///
/// Route nodes get their value (default 1) raised by [`ROUTE_NODE_BOOST`];
/// other nodes get the default filled in. Matched route edges get their
/// value (default 1) multiplied by [`ROUTE_EDGE_FACTOR`]. `route` must
/// come from the same graph.
pub fn route_view(graph: &Graph, route: &Route) -> Graph {
    let mut view = graph.clone();
    for node in view.nodes_mut() {
        let base = node.value.unwrap_or(1.0);
        let on_route = route.nodes.iter().any(|id| *id == node.id);
        node.value = Some(if on_route { base + ROUTE_NODE_BOOST } else { base });
    }
    let edges = view.edges_mut();
    for seg in &route.segments {
        if let Some(edge) = edges.get_mut(seg.edge_index) {
            if edge.connects(&seg.from, &seg.to) {
                edge.value = Some(edge.value.unwrap_or(1.0) * ROUTE_EDGE_FACTOR);
            }
        }
    }
    view
}
