//! Isolated centrality computation.
//!
//! Betweenness is the one query slow enough to block an interactive
//! caller, so it runs on its own thread. The caller hands over an owned
//! graph snapshot and gets back a [`CentralityHandle`]; the only things
//! shared across the thread boundary are the reply channel, a
//! cancellation token and the request generation counter.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, TryRecvError};
use cyclenet_core::{betweenness, CancelToken, Cancelled, CentralityOptions, CentralityScores, Graph};

use crate::error::Unavailable;
use crate::generation::RequestGeneration;

type WorkerReply = Result<CentralityScores, Cancelled>;

/// Caller side of one in-flight centrality computation.
///
/// Dropping the handle cancels the computation.
#[derive(Debug)]
pub struct CentralityHandle {
    reply: Receiver<WorkerReply>,
    cancel: CancelToken,
    generation: u64,
    requests: RequestGeneration,
    started: Instant,
}

impl CentralityHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while no newer request has been issued on the same counter.
    pub fn is_current(&self) -> bool {
        self.requests.is_current(self.generation)
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Block up to `timeout` for the scores.
    ///
    /// On timeout the computation is cancelled. A result that arrives after
    /// a newer request was issued is reported as superseded, never returned.
    pub fn wait(self, timeout: Duration) -> Result<CentralityScores, Unavailable> {
        match self.reply.recv_timeout(timeout) {
            Ok(reply) => self.finish(reply),
            Err(RecvTimeoutError::Timeout) => {
                self.cancel.cancel();
                tracing::warn!(
                    generation = self.generation,
                    timeout_ms = timeout.as_millis() as u64,
                    "centrality timed out, cancelling worker"
                );
                Err(Unavailable::TimedOut(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(self.worker_failed()),
        }
    }

    /// Non-blocking poll. `None` while the worker is still running.
    pub fn try_result(&self) -> Option<Result<CentralityScores, Unavailable>> {
        match self.reply.try_recv() {
            Ok(reply) => Some(self.finish(reply)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.worker_failed())),
        }
    }

    fn finish(&self, reply: WorkerReply) -> Result<CentralityScores, Unavailable> {
        if !self.is_current() {
            tracing::debug!(generation = self.generation, "discarding superseded centrality result");
            return Err(Unavailable::Superseded);
        }
        match reply {
            Ok(scores) => Ok(scores),
            Err(cancelled) => {
                tracing::warn!(
                    generation = self.generation,
                    done = cancelled.sources_done,
                    total = cancelled.sources_total,
                    "centrality cancelled"
                );
                Err(Unavailable::Cancelled)
            }
        }
    }

    fn worker_failed(&self) -> Unavailable {
        tracing::warn!(generation = self.generation, "centrality worker exited without a reply");
        Unavailable::WorkerFailed("worker exited without a reply".to_string())
    }
}

impl Drop for CentralityHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start a centrality computation on a dedicated thread.
///
/// The new request takes the next generation on `requests`, which makes
/// every older handle on the same counter stale.
pub fn spawn_centrality(
    graph: Arc<Graph>,
    options: CentralityOptions,
    requests: &RequestGeneration,
) -> Result<CentralityHandle, Unavailable> {
    let generation = requests.advance();
    let cancel = CancelToken::new();
    let (tx, rx) = channel::bounded::<WorkerReply>(1);

    let worker_cancel = cancel.clone();
    thread::Builder::new()
        .name(format!("centrality-{generation}"))
        .spawn(move || {
            let started = Instant::now();
            let reply = betweenness(&graph, &options, &worker_cancel);
            if let Ok(scores) = &reply {
                tracing::debug!(
                    generation,
                    nodes = graph.node_count(),
                    sources = scores.sources_used,
                    strategy = %scores.strategy,
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "centrality finished"
                );
            }
            // The caller may have given up already; a closed channel is fine.
            let _ = tx.send(reply);
        })
        .map_err(|e| Unavailable::WorkerFailed(e.to_string()))?;

    Ok(CentralityHandle {
        reply: rx,
        cancel,
        generation,
        requests: requests.clone(),
        started: Instant::now(),
    })
}
