//! Betweenness centrality (Brandes) with pluggable source selection.
//!
//! Every edge is treated as undirected and unweighted: shortest paths are
//! counted in hops, not kilometers. Parallel edges collapse to a single
//! adjacency and self-loops are ignored.
//!
//! Scores are not normalized. Each unordered pair of endpoints is counted
//! once, so with [`SampleStrategy::Full`] the result equals exact undirected
//! betweenness. Sampled strategies accumulate only over the chosen sources:
//! the scores are a non-negative approximation that preserves the ranking
//! in expectation, not exact values.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Cancelled, ParseError};
use crate::graph::{Graph, NodeId, NodeIndex};

/// Sample size used when the caller does not pick one.
pub const DEFAULT_SAMPLE_SIZE: usize = 60;

/// Node count above which [`SampleStrategy::Auto`] stops computing exactly.
pub const DEFAULT_AUTO_THRESHOLD: usize = 500;

/// Value added to the most central node in a centrality view.
pub const CENTRALITY_BOOST: f64 = 6.0;

/// Nodes visited between cancellation checks inside one source sweep.
const CANCEL_CHECK_INTERVAL: usize = 4096;

/// How Brandes sources are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleStrategy {
    /// Every node is a source (exact).
    Full,
    /// `sample_size` nodes drawn uniformly without replacement.
    Random,
    /// The `sample_size` nodes of highest degree, graph order breaking ties.
    HighDegree,
    /// `Full` up to the auto threshold, `HighDegree` above it.
    #[default]
    Auto,
}

impl SampleStrategy {
    /// Strategy actually run for a graph of `node_count` nodes.
    pub fn resolve(self, node_count: usize, auto_threshold: usize) -> SampleStrategy {
        match self {
            SampleStrategy::Auto if node_count > auto_threshold => SampleStrategy::HighDegree,
            SampleStrategy::Auto => SampleStrategy::Full,
            other => other,
        }
    }
}

impl FromStr for SampleStrategy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "exact" => Ok(SampleStrategy::Full),
            "random" => Ok(SampleStrategy::Random),
            "high-degree" | "high_degree" | "degree" => Ok(SampleStrategy::HighDegree),
            "auto" => Ok(SampleStrategy::Auto),
            _ => Err(ParseError {
                what: "sample strategy",
                value: s.to_string(),
                expected: "full, random, high-degree, auto",
            }),
        }
    }
}

impl fmt::Display for SampleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SampleStrategy::Full => "full",
            SampleStrategy::Random => "random",
            SampleStrategy::HighDegree => "high-degree",
            SampleStrategy::Auto => "auto",
        })
    }
}

/// Parameters of one centrality run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralityOptions {
    pub strategy: SampleStrategy,
    pub sample_size: usize,
    pub auto_threshold: usize,
    /// Seed for [`SampleStrategy::Random`]; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for CentralityOptions {
    fn default() -> Self {
        Self {
            strategy: SampleStrategy::Auto,
            sample_size: DEFAULT_SAMPLE_SIZE,
            auto_threshold: DEFAULT_AUTO_THRESHOLD,
            seed: None,
        }
    }
}

impl CentralityOptions {
    pub fn new(strategy: SampleStrategy, sample_size: usize) -> Self {
        Self {
            strategy,
            sample_size,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_auto_threshold(mut self, threshold: usize) -> Self {
        self.auto_threshold = threshold;
        self
    }
}

/// Shared flag a caller flips to stop a running computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A node and its score, as returned by ranking helpers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalNode {
    pub id: NodeId,
    pub score: f64,
}

/// Betweenness scores for every node of one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityScores {
    ids: Vec<NodeId>,
    #[serde(skip)]
    index: HashMap<NodeId, NodeIndex>,
    scores: Vec<f64>,
    /// Strategy that actually ran (never `Auto`).
    pub strategy: SampleStrategy,
    pub sources_used: usize,
}

impl CentralityScores {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// True when every node was a source.
    pub fn is_exact(&self) -> bool {
        self.sources_used == self.scores.len()
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.index.get(id).map(|&i| self.scores[i])
    }

    pub fn score_at(&self, index: NodeIndex) -> f64 {
        self.scores[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ids
            .iter()
            .map(|s| s.as_str())
            .zip(self.scores.iter().copied())
    }

    pub fn max(&self) -> f64 {
        self.scores.iter().copied().fold(0.0, f64::max)
    }

    /// Scores divided by the maximum; all zeros when the maximum is 0.
    pub fn normalized(&self) -> Vec<CriticalNode> {
        let max = self.max();
        self.iter()
            .map(|(id, s)| CriticalNode {
                id: id.to_string(),
                score: if max > 0.0 { s / max } else { 0.0 },
            })
            .collect()
    }

    /// The `n` highest scores, descending; graph order breaks ties.
    /// `n == 0` returns every node.
    pub fn top(&self, n: usize) -> Vec<CriticalNode> {
        let mut order: Vec<usize> = (0..self.scores.len()).collect();
        order.sort_by(|&a, &b| self.scores[b].total_cmp(&self.scores[a]));
        if n > 0 {
            order.truncate(n);
        }
        order
            .into_iter()
            .map(|i| CriticalNode {
                id: self.ids[i].clone(),
                score: self.scores[i],
            })
            .collect()
    }

    pub fn to_map(&self) -> HashMap<NodeId, f64> {
        self.iter().map(|(id, s)| (id.to_string(), s)).collect()
    }
}

/// Choose Brandes sources for `graph` according to `opts`.
pub fn select_sources(graph: &Graph, opts: &CentralityOptions) -> Vec<NodeIndex> {
    let n = graph.node_count();
    let k = opts.sample_size.min(n);

    match opts.strategy.resolve(n, opts.auto_threshold) {
        SampleStrategy::Full | SampleStrategy::Auto => (0..n).collect(),
        SampleStrategy::HighDegree => {
            let degrees = graph.degrees();
            let mut order: Vec<NodeIndex> = (0..n).collect();
            // Stable sort keeps graph order among equal degrees.
            order.sort_by(|&a, &b| degrees[b].cmp(&degrees[a]));
            order.truncate(k);
            order
        }
        SampleStrategy::Random => {
            let mut rng = match opts.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut picked = rand::seq::index::sample(&mut rng, n, k).into_vec();
            picked.sort_unstable();
            picked
        }
    }
}

/// Unweighted undirected neighbor lists with parallel edges collapsed.
pub(crate) fn simple_neighbors(graph: &Graph) -> Vec<Vec<NodeIndex>> {
    graph
        .adjacency()
        .into_iter()
        .map(|list| {
            let mut nbrs: Vec<NodeIndex> = list.into_iter().map(|a| a.node).collect();
            nbrs.sort_unstable();
            nbrs.dedup();
            nbrs
        })
        .collect()
}

/// Betweenness centrality by Brandes' algorithm over the selected sources.
///
/// `cancel` is polled between sources and periodically inside each sweep;
/// once set, the run returns [`Cancelled`] without a partial result.
pub fn betweenness(
    graph: &Graph,
    opts: &CentralityOptions,
    cancel: &CancelToken,
) -> Result<CentralityScores, Cancelled> {
    let n = graph.node_count();
    let sources = select_sources(graph, opts);
    let nbrs = simple_neighbors(graph);

    let mut bc = vec![0.0f64; n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut preds: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut stack: Vec<NodeIndex> = Vec::with_capacity(n);
    let mut queue: VecDeque<NodeIndex> = VecDeque::with_capacity(n);

    for (done, &s) in sources.iter().enumerate() {
        let cancelled = Cancelled {
            sources_done: done,
            sources_total: sources.len(),
        };
        if cancel.is_cancelled() {
            return Err(cancelled);
        }

        for v in 0..n {
            preds[v].clear();
            sigma[v] = 0.0;
            dist[v] = -1;
            delta[v] = 0.0;
        }
        stack.clear();
        queue.clear();

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);

        // Forward sweep: hop distances and shortest-path counts.
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            if stack.len() % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(cancelled);
            }
            for &w in &nbrs[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        // Backward sweep: dependency accumulation in reverse finish order.
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                bc[w] += delta[w];
            }
        }
    }

    // Each unordered pair was counted from both ends.
    for score in &mut bc {
        *score /= 2.0;
    }

    Ok(CentralityScores {
        ids: graph.nodes().iter().map(|n| n.id.clone()).collect(),
        index: graph.id_index().clone(),
        scores: bc,
        strategy: opts.strategy.resolve(n, opts.auto_threshold),
        sources_used: sources.len(),
    })
}

/// Copy of `graph` with node values raised by relative centrality.
///
/// Each node's value becomes `base + round(score / max * CENTRALITY_BOOST)`
/// where `base` is its current value (default 1). `scores` must come from
/// the same graph.
pub fn centrality_view(graph: &Graph, scores: &CentralityScores) -> Graph {
    let max = scores.max();
    let mut view = graph.clone();
    for (i, node) in view.nodes_mut().iter_mut().enumerate() {
        let base = node.value.unwrap_or(1.0);
        let rel = if max > 0.0 { scores.score_at(i) / max } else { 0.0 };
        node.value = Some(base + (rel * CENTRALITY_BOOST).round());
    }
    view
}
