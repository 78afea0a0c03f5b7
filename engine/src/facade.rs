//! Stateful entry point used by the dashboard.
//!
//! [`Engine`] owns the source-of-truth graph and the centrality request
//! counter. All derived views it hands out are fresh copies; the source
//! graph only changes through [`Engine::load`].

use std::sync::Arc;
use std::time::Instant;

use cyclenet_core::{
    degree_centrality, network_metrics, pagerank_ranking, CancelToken, CentralityScores,
    CriticalNode, DegreeResult, FilterCriteria, Graph, InvalidEndpoints, NetworkMetrics, RawGraph,
    Route, SampleStrategy,
};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{EngineError, Unavailable};
use crate::generation::RequestGeneration;
use crate::load::raw_graph_from_json;
use crate::query::{self, FilterOutcome};
use crate::state::{GraphState, SourceGraph};
use crate::status::{engine_status, EngineStatus};
use crate::worker::{spawn_centrality, CentralityHandle};

/// Row returned by a successful load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub load_time_ms: f64,
    pub load_generation: u64,
}

/// Critical-nodes report: three rankings of the same view, each cut to
/// the configured top-N and highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalNodes {
    pub scores: CentralityScores,
    /// Betweenness ranking.
    pub top: Vec<CriticalNode>,
    pub top_degree: Vec<DegreeResult>,
    pub top_pagerank: Vec<CriticalNode>,
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    source: SourceGraph,
    requests: RequestGeneration,
    in_flight: Mutex<Option<CancelToken>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    pub fn with_defaults() -> Self {
        Self::from_config(EngineConfig::default())
    }

    fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            source: SourceGraph::new(),
            requests: RequestGeneration::new(),
            in_flight: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate `raw` and make it the new source graph.
    ///
    /// On error the previously loaded graph stays in place and the load
    /// generation does not move.
    pub fn load(&self, raw: RawGraph, source_name: Option<&str>) -> Result<LoadSummary, EngineError> {
        let start = Instant::now();
        let graph = query::load_graph(raw).inspect_err(|e| {
            tracing::warn!(source = source_name, error = %e, "rejected graph load");
        })?;
        let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let installed = self.source.install(|load_generation| GraphState {
            graph: Arc::new(graph),
            source_name: source_name.map(str::to_string),
            load_time_ms,
            loaded_at: Instant::now(),
            load_generation,
        });
        let summary = LoadSummary {
            node_count: installed.graph.node_count(),
            edge_count: installed.graph.edge_count(),
            load_time_ms,
            load_generation: installed.load_generation,
        };

        tracing::info!(
            source = source_name,
            nodes = summary.node_count,
            edges = summary.edge_count,
            load_time_ms,
            load_generation = summary.load_generation,
            "loaded cycle network"
        );
        Ok(summary)
    }

    pub fn load_json(&self, json: &str, source_name: Option<&str>) -> Result<LoadSummary, EngineError> {
        let raw = raw_graph_from_json(json)?;
        self.load(raw, source_name)
    }

    /// The loaded source graph, shared read-only.
    pub fn source(&self) -> Result<Arc<Graph>, EngineError> {
        self.source
            .snapshot()
            .map(|gs| Arc::clone(&gs.graph))
            .ok_or(EngineError::NotLoaded)
    }

    /// Filter the source graph into a new view.
    pub fn filter(
        &self,
        criteria: &FilterCriteria,
        with_components: bool,
    ) -> Result<FilterOutcome, EngineError> {
        let source = self.source()?;
        let outcome = query::apply_filters(&source, criteria, with_components);
        tracing::debug!(
            nodes = outcome.graph.node_count(),
            edges = outcome.graph.edge_count(),
            components = outcome.labels.as_ref().map(|l| l.component_count()),
            "filtered view"
        );
        Ok(outcome)
    }

    /// Shortest route over `graph` (normally the current filtered view) at the
    /// configured average speed.
    pub fn route(
        &self,
        graph: &Graph,
        origin: &str,
        destination: &str,
    ) -> Result<Option<Route>, InvalidEndpoints> {
        let route = query::compute_route(graph, origin, destination, self.config.average_speed_kmh)?;
        match &route {
            Some(r) => tracing::debug!(
                origin,
                destination,
                hops = r.hop_count(),
                distance_km = r.distance_km,
                "route found"
            ),
            None => tracing::debug!(origin, destination, "no route"),
        }
        Ok(route)
    }

    /// Fresh copy of the source graph with no route highlighting.
    pub fn clear_route(&self) -> Result<Graph, EngineError> {
        Ok(self.source()?.as_ref().clone())
    }

    /// Start centrality on a copy of `graph`, cancelling any earlier request.
    pub fn request_centrality(
        &self,
        graph: &Graph,
        strategy: SampleStrategy,
        sample_size: Option<usize>,
    ) -> Result<CentralityHandle, Unavailable> {
        let options = self.config.centrality_options(strategy, sample_size);
        let mut in_flight = self.in_flight.lock();
        if let Some(previous) = in_flight.take() {
            previous.cancel();
        }
        let handle = spawn_centrality(Arc::new(graph.clone()), options, &self.requests)?;
        *in_flight = Some(handle.cancel_token());
        Ok(handle)
    }

    /// Betweenness with the configured timeout, plus degree and PageRank
    /// rankings of the same graph, each cut to the configured top-N.
    pub fn critical_nodes(
        &self,
        graph: &Graph,
        strategy: SampleStrategy,
        sample_size: Option<usize>,
    ) -> Result<CriticalNodes, Unavailable> {
        let handle = self.request_centrality(graph, strategy, sample_size)?;
        let scores = handle.wait(self.config.centrality_timeout())?;
        let top_n = self.config.critical_top_n;
        Ok(CriticalNodes {
            top: scores.top(top_n),
            top_degree: degree_centrality(graph, top_n),
            top_pagerank: pagerank_ranking(graph, top_n),
            scores,
        })
    }

    pub fn metrics(&self, graph: &Graph) -> NetworkMetrics {
        network_metrics(graph)
    }

    pub fn status(&self) -> EngineStatus {
        engine_status(&self.source, &self.requests)
    }
}
