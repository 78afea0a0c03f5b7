use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::MalformedGraph;

/// Stable node identifier as it appears in the raw records.
pub type NodeId = String;

/// Dense position of a node inside one graph snapshot.
///
/// Only meaningful for the graph that produced it; derived graphs renumber.
pub type NodeIndex = usize;

/// Geographic position of a node (WGS84 degrees). Carried, never projected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A node as it arrives from the outside world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "distrito")]
    pub district: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, alias = "val")]
    pub value: Option<f64>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl NodeRecord {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            district: None,
            group: None,
            value: None,
            coordinates: None,
        }
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }
}

/// An undirected street or cycleway segment as it arrives from the outside world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(alias = "length")]
    pub length_km: f64,
    #[serde(default, alias = "type", alias = "tipo_via")]
    pub way_type: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl EdgeRecord {
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        length_km: f64,
        way_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            length_km,
            way_type: way_type.into(),
            value: None,
        }
    }
}

/// Flat collection of node and edge records, the input of [`Graph::load`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default, alias = "links")]
    pub edges: Vec<EdgeRecord>,
}

impl RawGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for a known network size.
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
            edges: Vec::with_capacity(edge_count),
        }
    }

    pub fn push_node(&mut self, node: NodeRecord) {
        self.nodes.push(node);
    }

    pub fn push_edge(&mut self, edge: EdgeRecord) {
        self.edges.push(edge);
    }
}

/// A node inside a loaded graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub district: Option<String>,
    /// Display group. Component labeling rewrites this on derived copies.
    pub group: Option<String>,
    /// Visual emphasis weight. Route and centrality views rewrite this on derived copies.
    pub value: Option<f64>,
    pub coordinates: Option<Coordinates>,
}

/// An undirected edge inside a loaded graph. Length is always finite and > 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub length_km: f64,
    pub way_type: String,
    pub value: Option<f64>,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// True if this edge joins `a` and `b` in either orientation.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// One entry of an undirected adjacency list: the neighbor and the edge used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacent {
    pub node: NodeIndex,
    pub edge: usize,
}

/// In-memory network snapshot: nodes, edges and an id index.
///
/// A `Graph` has no interior mutability and no shared references into other
/// graphs. `clone()` is a deep copy, and every derived view (filtered,
/// labeled, route or centrality emphasis) is built as a fresh `Graph`.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Node index of each edge's (source, target), parallel to `edges`.
    endpoints: Vec<(NodeIndex, NodeIndex)>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            endpoints: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Validate raw records and build a graph.
    ///
    /// Fails on an empty or duplicated node id, on an edge whose endpoint is
    /// not a loaded node, and on an edge length that is not a finite number
    /// greater than zero.
    pub fn load(raw: RawGraph) -> Result<Self, MalformedGraph> {
        let mut index = HashMap::with_capacity(raw.nodes.len());
        let mut nodes = Vec::with_capacity(raw.nodes.len());

        for (i, rec) in raw.nodes.into_iter().enumerate() {
            if rec.id.is_empty() {
                return Err(MalformedGraph::EmptyNodeId { index: i });
            }
            if index.contains_key(&rec.id) {
                return Err(MalformedGraph::DuplicateNode(rec.id));
            }
            index.insert(rec.id.clone(), nodes.len());
            nodes.push(Node {
                id: rec.id,
                name: rec.name,
                district: rec.district,
                group: rec.group,
                value: rec.value,
                coordinates: rec.coordinates,
            });
        }

        let mut edges = Vec::with_capacity(raw.edges.len());
        let mut endpoints = Vec::with_capacity(raw.edges.len());

        for (i, rec) in raw.edges.into_iter().enumerate() {
            let Some(&from) = index.get(&rec.source) else {
                return Err(MalformedGraph::UnknownEndpoint {
                    index: i,
                    node: rec.source,
                });
            };
            let Some(&to) = index.get(&rec.target) else {
                return Err(MalformedGraph::UnknownEndpoint {
                    index: i,
                    node: rec.target,
                });
            };
            if !rec.length_km.is_finite() || rec.length_km <= 0.0 {
                return Err(MalformedGraph::InvalidLength {
                    index: i,
                    from: rec.source,
                    to: rec.target,
                    length: rec.length_km,
                });
            }
            endpoints.push((from, to));
            edges.push(Edge {
                source: rec.source,
                target: rec.target,
                length_km: rec.length_km,
                way_type: rec.way_type,
                value: rec.value,
            });
        }

        Ok(Self {
            nodes,
            edges,
            endpoints,
            index,
        })
    }

    /// Assemble a derived graph from parts already known to be consistent
    /// (every edge endpoint is among `nodes`).
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let index: HashMap<NodeId, NodeIndex> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let endpoints = edges
            .iter()
            .map(|e| (index[&e.source], index[&e.target]))
            .collect();
        Self {
            nodes,
            edges,
            endpoints,
            index,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Node indices of an edge's (source, target).
    pub fn endpoints(&self, edge: usize) -> (NodeIndex, NodeIndex) {
        self.endpoints[edge]
    }

    pub(crate) fn id_index(&self) -> &HashMap<NodeId, NodeIndex> {
        &self.index
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Undirected adjacency list indexed by node position.
    ///
    /// Each non-loop edge appears once in each endpoint's list, in edge
    /// order. Self-loops are omitted: they never shorten a path or join
    /// two components.
    pub fn adjacency(&self) -> Vec<Vec<Adjacent>> {
        let mut adj: Vec<Vec<Adjacent>> = vec![Vec::new(); self.nodes.len()];
        for (edge, &(a, b)) in self.endpoints.iter().enumerate() {
            if a == b {
                continue;
            }
            adj[a].push(Adjacent { node: b, edge });
            adj[b].push(Adjacent { node: a, edge });
        }
        adj
    }

    /// Undirected degree per node position, ignoring self-loops.
    pub fn degrees(&self) -> Vec<u32> {
        let mut deg = vec![0u32; self.nodes.len()];
        for &(a, b) in &self.endpoints {
            if a != b {
                deg[a] += 1;
                deg[b] += 1;
            }
        }
        deg
    }

    /// Distinct district labels, sorted.
    pub fn districts(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter_map(|n| n.district.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct way types, sorted.
    pub fn way_types(&self) -> Vec<String> {
        self.edges
            .iter()
            .map(|e| e.way_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let strings: usize = self
            .nodes
            .iter()
            .map(|n| {
                n.id.len()
                    + n.name.as_ref().map_or(0, |s| s.len())
                    + n.district.as_ref().map_or(0, |s| s.len())
                    + n.group.as_ref().map_or(0, |s| s.len())
            })
            .sum::<usize>()
            + self
                .edges
                .iter()
                .map(|e| e.source.len() + e.target.len() + e.way_type.len())
                .sum::<usize>();

        let nodes_mem = self.nodes.len() * size_of::<Node>();
        let edges_mem = self.edges.len() * (size_of::<Edge>() + size_of::<(NodeIndex, NodeIndex)>());
        let index_mem = self.index.len() * (size_of::<NodeId>() + size_of::<NodeIndex>() + 16);

        nodes_mem + edges_mem + index_mem + strings * 2
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> RawGraph {
        RawGraph {
            nodes: vec![
                NodeRecord::new("A").with_district("Miraflores"),
                NodeRecord::new("B").with_district("Miraflores"),
                NodeRecord::new("C").with_district("Ate"),
            ],
            edges: vec![
                EdgeRecord::new("A", "B", 2.0, "Local"),
                EdgeRecord::new("B", "C", 3.0, "Metropolitana"),
            ],
        }
    }

    #[test]
    fn test_load_counts() {
        let g = Graph::load(abc()).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.index_of("B"), Some(1));
        assert_eq!(g.endpoints(1), (1, 2));
    }

    #[test]
    fn test_load_unknown_endpoint() {
        let raw = RawGraph {
            nodes: vec![NodeRecord::new("A")],
            edges: vec![EdgeRecord::new("A", "Z", 1.0, "Local")],
        };
        assert_eq!(
            Graph::load(raw),
            Err(MalformedGraph::UnknownEndpoint {
                index: 0,
                node: "Z".into()
            })
        );
    }

    #[test]
    fn test_load_duplicate_node() {
        let mut raw = abc();
        raw.nodes.push(NodeRecord::new("A"));
        assert_eq!(
            Graph::load(raw),
            Err(MalformedGraph::DuplicateNode("A".into()))
        );
    }

    #[test]
    fn test_load_empty_id() {
        let mut raw = abc();
        raw.nodes.push(NodeRecord::new(""));
        assert_eq!(
            Graph::load(raw),
            Err(MalformedGraph::EmptyNodeId { index: 3 })
        );
    }

    #[test]
    fn test_load_rejects_non_positive_length() {
        for bad in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let mut raw = abc();
            raw.edges[1].length_km = bad;
            match Graph::load(raw) {
                Err(MalformedGraph::InvalidLength { index, .. }) => assert_eq!(index, 1),
                other => panic!("expected InvalidLength for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_self_loop_loads_but_not_adjacent() {
        let mut raw = abc();
        raw.edges.push(EdgeRecord::new("C", "C", 0.5, "Local"));
        let g = Graph::load(raw).unwrap();
        assert_eq!(g.edge_count(), 3);
        assert!(g.edges()[2].is_self_loop());
        assert_eq!(g.adjacency()[2].len(), 1);
        assert_eq!(g.degrees(), vec![1, 2, 1]);
    }

    #[test]
    fn test_clone_is_independent() {
        let g = Graph::load(abc()).unwrap();
        let mut copy = g.clone();
        copy.nodes_mut()[0].value = Some(99.0);
        copy.edges_mut()[0].value = Some(3.0);
        assert_eq!(g.nodes()[0].value, None);
        assert_eq!(g.edges()[0].value, None);
        assert_ne!(g, copy);
    }

    #[test]
    fn test_districts_and_way_types_sorted() {
        let g = Graph::load(abc()).unwrap();
        assert_eq!(g.districts(), vec!["Ate", "Miraflores"]);
        assert_eq!(g.way_types(), vec!["Local", "Metropolitana"]);
    }

    #[test]
    fn test_raw_records_from_json_aliases() {
        let json = r#"{
            "nodes": [{"id": "n1", "distrito": "Ate", "val": 2}, {"id": "n2"}],
            "links": [{"source": "n1", "target": "n2", "length": 1.2, "type": "Local"}]
        }"#;
        let raw: RawGraph = serde_json::from_str(json).unwrap();
        let g = Graph::load(raw).unwrap();
        assert_eq!(g.node("n1").unwrap().district.as_deref(), Some("Ate"));
        assert_eq!(g.node("n1").unwrap().value, Some(2.0));
        assert_eq!(g.edges()[0].way_type, "Local");
    }

    #[test]
    fn test_memory_usage_nonzero() {
        let g = Graph::load(abc()).unwrap();
        assert!(g.memory_usage() > 0);
    }
}
