use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::graph::{Edge, Graph, Node};

/// Which way types survive the category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WayTypeFilter {
    #[default]
    Any,
    Only(String),
}

impl WayTypeFilter {
    /// Way types match case-insensitively ("local" keeps "Local").
    pub fn matches(&self, way_type: &str) -> bool {
        match self {
            WayTypeFilter::Any => true,
            WayTypeFilter::Only(wanted) => wanted.eq_ignore_ascii_case(way_type),
        }
    }
}

impl FromStr for WayTypeFilter {
    type Err = ParseError;

    /// Accepts "any" / "*" / "ambas" for no restriction, otherwise the category name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError {
                what: "way type",
                value: s.to_string(),
                expected: "'any' or a category name",
            });
        }
        match trimmed.to_lowercase().as_str() {
            "any" | "*" | "ambas" => Ok(WayTypeFilter::Any),
            _ => Ok(WayTypeFilter::Only(trimmed.to_string())),
        }
    }
}

impl fmt::Display for WayTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WayTypeFilter::Any => f.write_str("any"),
            WayTypeFilter::Only(name) => f.write_str(name),
        }
    }
}

/// Structural filter applied to a source graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Districts to keep. Empty means no district restriction.
    pub districts: BTreeSet<String>,
    pub way_type: WayTypeFilter,
    /// Edges shorter than this many kilometers are dropped.
    pub min_length_km: f64,
    /// Self-loops are dropped unless this is set.
    pub keep_self_loops: bool,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_districts<I, S>(mut self, districts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.districts = districts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_way_type(mut self, way_type: WayTypeFilter) -> Self {
        self.way_type = way_type;
        self
    }

    /// Negative or NaN thresholds are treated as 0.
    pub fn with_min_length(mut self, km: f64) -> Self {
        self.min_length_km = if km.is_nan() { 0.0 } else { km.max(0.0) };
        self
    }

    pub fn keeping_self_loops(mut self) -> Self {
        self.keep_self_loops = true;
        self
    }

    fn keeps_edge(&self, edge: &Edge) -> bool {
        (self.keep_self_loops || !edge.is_self_loop())
            && self.way_type.matches(&edge.way_type)
            && edge.length_km >= self.min_length_km
    }

    fn keeps_district(&self, node: &Node) -> bool {
        node.district
            .as_ref()
            .is_some_and(|d| self.districts.contains(d))
    }
}

/// Apply `criteria` to `source`, returning a new graph.
///
/// Edge filters run first (self-loops, way type, minimum length). Then:
/// - with a district set, nodes outside it are dropped along with every
///   edge that lost an endpoint; nodes inside it are kept even if isolated;
/// - without one, every node left with no incident edge is pruned.
///
/// `source` is only read. Applying the same criteria to the output again
/// returns an equal graph.
pub fn apply_filters(source: &Graph, criteria: &FilterCriteria) -> Graph {
    let edge_kept: Vec<bool> = source
        .edges()
        .iter()
        .map(|e| criteria.keeps_edge(e))
        .collect();

    let node_kept: Vec<bool> = if criteria.districts.is_empty() {
        let mut touched = vec![false; source.node_count()];
        for (i, _) in edge_kept.iter().enumerate().filter(|(_, &k)| k) {
            let (a, b) = source.endpoints(i);
            touched[a] = true;
            touched[b] = true;
        }
        touched
    } else {
        source
            .nodes()
            .iter()
            .map(|n| criteria.keeps_district(n))
            .collect()
    };

    let nodes: Vec<Node> = source
        .nodes()
        .iter()
        .zip(&node_kept)
        .filter(|(_, &k)| k)
        .map(|(n, _)| n.clone())
        .collect();

    let edges: Vec<Edge> = source
        .edges()
        .iter()
        .enumerate()
        .filter(|&(i, _)| {
            let (a, b) = source.endpoints(i);
            edge_kept[i] && node_kept[a] && node_kept[b]
        })
        .map(|(_, e)| e.clone())
        .collect();

    Graph::from_parts(nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeRecord, NodeRecord, RawGraph};
    use proptest::prelude::*;

    /// Two districts joined by a bridge, plus an isolated node and a self-loop.
    fn sample() -> Graph {
        let raw = RawGraph {
            nodes: vec![
                NodeRecord::new("m1").with_district("Miraflores"),
                NodeRecord::new("m2").with_district("Miraflores"),
                NodeRecord::new("s1").with_district("San Isidro"),
                NodeRecord::new("s2").with_district("San Isidro"),
                NodeRecord::new("lone").with_district("Ate"),
            ],
            edges: vec![
                EdgeRecord::new("m1", "m2", 1.0, "Local"),
                EdgeRecord::new("m2", "s1", 4.5, "Metropolitana"),
                EdgeRecord::new("s1", "s2", 0.3, "Local"),
                EdgeRecord::new("s2", "s2", 0.2, "Local"),
            ],
        };
        Graph::load(raw).unwrap()
    }

    fn ids(g: &Graph) -> Vec<&str> {
        g.nodes().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_no_criteria_prunes_orphans_and_loops() {
        let g = sample();
        let out = apply_filters(&g, &FilterCriteria::new());
        assert_eq!(ids(&out), vec!["m1", "m2", "s1", "s2"]);
        assert_eq!(out.edge_count(), 3);
    }

    #[test]
    fn test_keep_self_loops() {
        let g = sample();
        let out = apply_filters(&g, &FilterCriteria::new().keeping_self_loops());
        assert_eq!(out.edge_count(), 4);
    }

    #[test]
    fn test_way_type_filter_case_insensitive() {
        let g = sample();
        let criteria = FilterCriteria::new().with_way_type("local".parse().unwrap());
        let out = apply_filters(&g, &criteria);
        assert_eq!(ids(&out), vec!["m1", "m2", "s1", "s2"]);
        assert!(out.edges().iter().all(|e| e.way_type == "Local"));
        assert_eq!(out.edge_count(), 2);
    }

    #[test]
    fn test_min_length_prunes_orphans() {
        let g = sample();
        let out = apply_filters(&g, &FilterCriteria::new().with_min_length(1.0));
        assert_eq!(ids(&out), vec!["m1", "m2", "s1"]);
        assert_eq!(out.edge_count(), 2);
    }

    #[test]
    fn test_district_filter_is_node_driven() {
        let g = sample();
        let criteria = FilterCriteria::new()
            .with_districts(["Miraflores", "Ate"])
            .with_min_length(2.0);
        let out = apply_filters(&g, &criteria);
        // No orphan pruning with a district set: m1, m2 and lone survive without edges.
        assert_eq!(ids(&out), vec!["m1", "m2", "lone"]);
        assert_eq!(out.edge_count(), 0);
    }

    #[test]
    fn test_district_filter_drops_cross_edges() {
        let g = sample();
        let out = apply_filters(&g, &FilterCriteria::new().with_districts(["San Isidro"]));
        assert_eq!(ids(&out), vec!["s1", "s2"]);
        assert_eq!(out.edge_count(), 1);
        assert!(out.edges()[0].connects("s1", "s2"));
    }

    #[test]
    fn test_filter_on_empty_graph() {
        let out = apply_filters(&Graph::new(), &FilterCriteria::new());
        assert!(out.is_empty());
    }

    #[test]
    fn test_negative_threshold_clamped() {
        assert_eq!(FilterCriteria::new().with_min_length(-3.0).min_length_km, 0.0);
    }

    #[test]
    fn test_way_type_parse() {
        assert_eq!("Ambas".parse::<WayTypeFilter>().unwrap(), WayTypeFilter::Any);
        assert_eq!(
            " Metropolitana ".parse::<WayTypeFilter>().unwrap(),
            WayTypeFilter::Only("Metropolitana".into())
        );
        assert!("".parse::<WayTypeFilter>().is_err());
    }

    fn arb_graph() -> impl Strategy<Value = Graph> {
        (1usize..12).prop_flat_map(|n| {
            let edges = prop::collection::vec(
                (0..n, 0..n, 0.1f64..5.0, prop::bool::ANY),
                0..24,
            );
            let districts = prop::collection::vec(0u8..3, n);
            (Just(n), edges, districts).prop_map(|(n, edges, districts)| {
                let raw = RawGraph {
                    nodes: (0..n)
                        .map(|i| NodeRecord::new(format!("n{i}")).with_district(format!("d{}", districts[i])))
                        .collect(),
                    edges: edges
                        .into_iter()
                        .map(|(a, b, len, local)| {
                            EdgeRecord::new(
                                format!("n{a}"),
                                format!("n{b}"),
                                len,
                                if local { "Local" } else { "Metropolitana" },
                            )
                        })
                        .collect(),
                };
                Graph::load(raw).unwrap()
            })
        })
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            prop::collection::btree_set(0u8..3, 0..3),
            prop::option::of(prop::bool::ANY),
            0.0f64..4.0,
            prop::bool::ANY,
        )
            .prop_map(|(districts, way, min, loops)| FilterCriteria {
                districts: districts.into_iter().map(|d| format!("d{d}")).collect(),
                way_type: match way {
                    None => WayTypeFilter::Any,
                    Some(true) => WayTypeFilter::Only("Local".into()),
                    Some(false) => WayTypeFilter::Only("Metropolitana".into()),
                },
                min_length_km: min,
                keep_self_loops: loops,
            })
    }

    proptest! {
        #[test]
        fn prop_filter_idempotent(g in arb_graph(), c in arb_criteria()) {
            let once = apply_filters(&g, &c);
            let twice = apply_filters(&once, &c);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_filter_never_mutates_source(g in arb_graph(), c in arb_criteria()) {
            let before = g.clone();
            let _ = apply_filters(&g, &c);
            prop_assert_eq!(before, g);
        }
    }
}
