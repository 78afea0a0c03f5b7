use serde::Serialize;

use crate::generation::RequestGeneration;
use crate::state::SourceGraph;

/// Snapshot of what the engine currently holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub source_name: Option<String>,
    /// "loaded" or "not_loaded".
    pub status: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub memory_bytes: usize,
    pub load_time_ms: f64,
    pub load_generation: u64,
    /// Latest centrality request generation issued.
    pub request_generation: u64,
}

pub fn engine_status(source: &SourceGraph, requests: &RequestGeneration) -> EngineStatus {
    let request_generation = requests.current();

    source
        .with_graph(|gs| EngineStatus {
            source_name: gs.source_name.clone(),
            status: "loaded".to_string(),
            node_count: gs.graph.node_count(),
            edge_count: gs.graph.edge_count(),
            memory_bytes: gs.graph.memory_usage(),
            load_time_ms: gs.load_time_ms,
            load_generation: gs.load_generation,
            request_generation,
        })
        .unwrap_or_else(|| EngineStatus {
            source_name: None,
            status: "not_loaded".to_string(),
            node_count: 0,
            edge_count: 0,
            memory_bytes: 0,
            load_time_ms: 0.0,
            load_generation: 0,
            request_generation,
        })
}
