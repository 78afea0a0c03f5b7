//! cyclenet-engine: query façade over `cyclenet-core`.
//!
//! Holds the loaded source-of-truth graph, ingests raw records from JSON,
//! reads configuration from `CYCLENET_*` variables and runs betweenness
//! centrality on an isolated, cancellable worker thread. Results that
//! arrive after a newer request was issued are discarded.

mod config;
mod error;
mod facade;
mod generation;
mod load;
mod query;
mod state;
mod status;
mod worker;

pub use config::{ConfigError, EngineConfig, Setting, SETTINGS};
pub use error::{EngineError, Unavailable};
pub use facade::{CriticalNodes, Engine, LoadSummary};
pub use generation::RequestGeneration;
pub use load::{parse_length_km, raw_graph_from_json, raw_graph_from_reader};
pub use query::{apply_filters, compute_route, estimate_critical_nodes, load_graph, FilterOutcome};
pub use state::{GraphState, SourceGraph};
pub use status::{engine_status, EngineStatus};
pub use worker::{spawn_centrality, CentralityHandle};
