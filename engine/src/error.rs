use std::time::Duration;

use cyclenet_core::{InvalidEndpoints, MalformedGraph};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the engine façade.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed graph: {0}")]
    MalformedGraph(#[from] MalformedGraph),

    #[error("invalid route endpoints: {0}")]
    InvalidEndpoints(#[from] InvalidEndpoints),

    #[error("edge record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("cannot parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no graph loaded, call load first")]
    NotLoaded,
}

/// Why a centrality request produced no scores.
///
/// Always recoverable: the caller keeps whatever it displayed before.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unavailable {
    #[error("centrality timed out after {0:?}")]
    TimedOut(Duration),

    #[error("centrality cancelled")]
    Cancelled,

    #[error("centrality superseded by a newer request")]
    Superseded,

    #[error("centrality worker failed: {0}")]
    WorkerFailed(String),
}
