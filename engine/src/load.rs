//! Raw record ingestion from JSON.
//!
//! Accepts the shape the dashboard already exchanges:
//! `{"nodes": [...], "links": [...]}` (or `"edges"`). Identifiers may be
//! strings or integers. Lengths may be numbers or strings as typed into
//! municipal spreadsheets ("1,80", "1.80 km"); anything else is rejected.

use std::io::Read;

use cyclenet_core::{Coordinates, EdgeRecord, NodeRecord, RawGraph};
use serde::Deserialize;

use crate::error::EngineError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonId {
    Text(String),
    Int(i64),
}

impl JsonId {
    fn into_string(self) -> String {
        match self {
            JsonId::Text(s) => s,
            JsonId::Int(i) => i.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonNumber {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct JsonNode {
    id: JsonId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "distrito")]
    district: Option<String>,
    #[serde(default)]
    group: Option<JsonId>,
    #[serde(default, alias = "val")]
    value: Option<f64>,
    #[serde(default, alias = "lat_inicio")]
    lat: Option<f64>,
    #[serde(default, alias = "lon_inicio")]
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct JsonEdge {
    source: JsonId,
    target: JsonId,
    #[serde(alias = "length", alias = "longitud_km")]
    length_km: JsonNumber,
    #[serde(default, alias = "type", alias = "tipo_via")]
    way_type: Option<String>,
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct JsonGraph {
    #[serde(default)]
    nodes: Vec<JsonNode>,
    #[serde(default, alias = "links")]
    edges: Vec<JsonEdge>,
}

/// Parse a length such as `2`, `"1,80"` or `"1.80km"` into kilometers.
pub fn parse_length_km(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().to_lowercase();
    let cleaned = cleaned.trim_end_matches("km").trim().replace(',', ".");
    cleaned.parse::<f64>().ok()
}

/// Convert a JSON document into raw records. Structural checks (unknown
/// endpoints, duplicates, non-positive lengths) are left to `Graph::load`.
pub fn raw_graph_from_json(json: &str) -> Result<RawGraph, EngineError> {
    let doc: JsonGraph = serde_json::from_str(json)?;
    convert(doc)
}

/// Same as [`raw_graph_from_json`], reading from any byte source.
pub fn raw_graph_from_reader<R: Read>(reader: R) -> Result<RawGraph, EngineError> {
    let doc: JsonGraph = serde_json::from_reader(reader)?;
    convert(doc)
}

fn convert(doc: JsonGraph) -> Result<RawGraph, EngineError> {
    let mut raw = RawGraph::with_capacity(doc.nodes.len(), doc.edges.len());

    for node in doc.nodes {
        let coordinates = match (node.lat, node.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        };
        raw.push_node(NodeRecord {
            id: node.id.into_string(),
            name: node.name,
            district: node.district,
            group: node.group.map(JsonId::into_string),
            value: node.value,
            coordinates,
        });
    }

    for (index, edge) in doc.edges.into_iter().enumerate() {
        let length_km = match edge.length_km {
            JsonNumber::Number(n) => n,
            JsonNumber::Text(text) => {
                parse_length_km(&text).ok_or_else(|| EngineError::InvalidRecord {
                    index,
                    reason: format!("cannot parse length '{}'", text),
                })?
            }
        };
        raw.push_edge(EdgeRecord {
            source: edge.source.into_string(),
            target: edge.target.into_string(),
            length_km,
            way_type: edge.way_type.unwrap_or_default(),
            value: edge.value,
        });
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length_variants() {
        assert_eq!(parse_length_km("1,80"), Some(1.8));
        assert_eq!(parse_length_km(" 1.80km "), Some(1.8));
        assert_eq!(parse_length_km("2 KM"), Some(2.0));
        assert_eq!(parse_length_km("n/a"), None);
    }

    #[test]
    fn test_json_mixed_ids_and_lengths() {
        let raw = raw_graph_from_json(
            r#"{
                "nodes": [
                    {"id": 1, "name": "Av. Arequipa", "distrito": "Lince", "group": 1,
                     "lat": -12.08, "lon": -77.03},
                    {"id": "2"}
                ],
                "links": [
                    {"source": 1, "target": "2", "longitud_km": "1,80", "tipo_via": "Local"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(raw.nodes[0].id, "1");
        assert_eq!(raw.nodes[0].group.as_deref(), Some("1"));
        assert_eq!(raw.nodes[0].coordinates, Some(Coordinates { lat: -12.08, lon: -77.03 }));
        assert_eq!(raw.nodes[1].coordinates, None);
        assert_eq!(raw.edges[0].source, "1");
        assert_eq!(raw.edges[0].length_km, 1.8);
        assert_eq!(raw.edges[0].way_type, "Local");
    }

    #[test]
    fn test_json_bad_length_reports_index() {
        let err = raw_graph_from_json(
            r#"{"nodes": [{"id": "a"}, {"id": "b"}],
                "edges": [{"source": "a", "target": "b", "length": 1.0},
                          {"source": "b", "target": "a", "length": "long"}]}"#,
        )
        .unwrap_err();
        match err {
            EngineError::InvalidRecord { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_json_syntax_error() {
        assert!(matches!(raw_graph_from_json("{nodes"), Err(EngineError::Json(_))));
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk unplugged"))
        }
    }

    #[test]
    fn test_reader_io_failure_is_json_error() {
        match raw_graph_from_reader(BrokenReader) {
            Err(EngineError::Json(e)) => assert!(e.is_io()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_reader() {
        let json = br#"{"nodes": [{"id": "a"}], "links": []}"#;
        let raw = raw_graph_from_reader(&json[..]).unwrap();
        assert_eq!(raw.nodes.len(), 1);
    }
}
