use std::sync::Arc;
use std::time::Instant;

use cyclenet_core::Graph;
use parking_lot::RwLock;

/// Metadata about the loaded source-of-truth graph.
#[derive(Debug)]
pub struct GraphState {
    pub graph: Arc<Graph>,
    /// Caller-supplied name of the data set, if any.
    pub source_name: Option<String>,
    pub load_time_ms: f64,
    pub loaded_at: Instant,
    /// Load counter at the time of this load. The first load is 1.
    pub load_generation: u64,
}

/// Holder of the source-of-truth graph.
///
/// The graph is never patched in place: a reload builds a new
/// [`GraphState`] and swaps the whole `Arc`. Readers clone the `Arc` and
/// release the lock immediately, so no lock is held while a query runs.
#[derive(Debug, Default)]
pub struct SourceGraph {
    current: RwLock<Option<Arc<GraphState>>>,
}

impl SourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a closure with a read reference to the loaded state.
    /// Returns None if no graph is loaded.
    pub fn with_graph<R, F: FnOnce(&GraphState) -> R>(&self, f: F) -> Option<R> {
        let snapshot = self.snapshot()?;
        Some(f(&snapshot))
    }

    /// Current state, if any. Holds no lock after returning.
    pub fn snapshot(&self) -> Option<Arc<GraphState>> {
        self.current.read().clone()
    }

    /// Replace the loaded state wholesale.
    ///
    /// `build` receives the next load generation (previous + 1, or 1 on the
    /// first load) and runs under the write lock, so generations are
    /// installed in increasing order even when loads race.
    pub fn install<F>(&self, build: F) -> Arc<GraphState>
    where
        F: FnOnce(u64) -> GraphState,
    {
        let mut current = self.current.write();
        let generation = current.as_ref().map_or(1, |gs| gs.load_generation + 1);
        let state = Arc::new(build(generation));
        *current = Some(Arc::clone(&state));
        state
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(generation: u64) -> GraphState {
        GraphState {
            graph: Arc::new(Graph::new()),
            source_name: Some(format!("load-{generation}")),
            load_time_ms: 0.0,
            loaded_at: Instant::now(),
            load_generation: generation,
        }
    }

    #[test]
    fn test_empty_holder() {
        let holder = SourceGraph::new();
        assert!(!holder.is_loaded());
        assert!(holder.with_graph(|gs| gs.load_generation).is_none());
    }

    #[test]
    fn test_install_keeps_old_snapshots_alive() {
        let holder = SourceGraph::new();
        assert_eq!(holder.install(state).load_generation, 1);
        let old = holder.snapshot().unwrap();

        assert_eq!(holder.install(state).load_generation, 2);
        assert_eq!(old.load_generation, 1);
        assert_eq!(holder.with_graph(|gs| gs.load_generation), Some(2));
        assert_eq!(holder.with_graph(|gs| gs.source_name.clone()), Some(Some("load-2".into())));
    }

    #[test]
    fn test_concurrent_installs_are_ordered() {
        let holder = Arc::new(SourceGraph::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let holder = Arc::clone(&holder);
                std::thread::spawn(move || {
                    (0..50).map(|_| holder.install(state).load_generation).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen: Vec<u64> = threads
            .into_iter()
            .flat_map(|t| t.join().unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (1..=400).collect::<Vec<u64>>());
        assert_eq!(holder.with_graph(|gs| gs.load_generation), Some(400));
    }
}
