use cyclenet_core::{
    apply_filters, betweenness, label_components, shortest_route, CancelToken,
    CentralityOptions, EdgeRecord, FilterCriteria, Graph, NodeRecord, RawGraph, SampleStrategy,
    WayTypeFilter, DEFAULT_AVERAGE_SPEED_KMH,
};
use cyclenet_engine::EngineConfig;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(2_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: cyclenet-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  grid        Square street grid (uniform blocks)");
        println!("  ring        Ring road with random shortcuts (small-world)");
        println!("  districts   Hub-and-spoke districts joined by arterials");
        println!();
        println!("Default node_count: 2000");
        println!("Config is read from CYCLENET_* environment variables.");
        return;
    }

    let config = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };

    println!("cyclenet-bench");
    println!("==============");
    println!();

    let generators: Vec<(&str, fn(usize) -> RawGraph)> = match mode {
        "grid" => vec![("Street grid", gen_grid)],
        "ring" => vec![("Ring with shortcuts", gen_ring)],
        "districts" => vec![("Hub-and-spoke districts", gen_districts)],
        "all" => vec![
            ("Street grid", gen_grid as fn(usize) -> RawGraph),
            ("Ring with shortcuts", gen_ring),
            ("Hub-and-spoke districts", gen_districts),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, node_count, &config);
    }
}

fn run_benchmark(name: &str, generator: fn(usize) -> RawGraph, node_count: usize, config: &EngineConfig) {
    println!("--- {} ---", name);
    println!("Target: {} nodes", node_count);

    let t = Instant::now();
    let graph = match Graph::load(generator(node_count)) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Generator produced a malformed graph: {}", e);
            return;
        }
    };
    println!(
        "Loaded in {:.1}ms: {} nodes, {} edges, ~{:.1}MB",
        t.elapsed().as_secs_f64() * 1000.0,
        graph.node_count(),
        graph.edge_count(),
        graph.memory_usage() as f64 / 1_048_576.0
    );

    // Filters
    println!();
    println!("{:>20} {:>10} {:>10} {:>12} {:>10}", "filter", "nodes", "edges", "components", "time");
    println!("{:->20} {:->10} {:->10} {:->12} {:->10}", "", "", "", "", "");

    let filters = [
        ("none", FilterCriteria::new()),
        ("local only", FilterCriteria::new().with_way_type(WayTypeFilter::Only("Local".into()))),
        ("min 0.3 km", FilterCriteria::new().with_min_length(0.3)),
        ("district d0", FilterCriteria::new().with_districts(["d0"])),
    ];
    for (label, criteria) in &filters {
        let t = Instant::now();
        let view = apply_filters(&graph, criteria);
        let labels = label_components(&view);
        let elapsed = t.elapsed();
        println!(
            "{:>20} {:>10} {:>10} {:>12} {:>8.1}ms",
            label,
            view.node_count(),
            view.edge_count(),
            labels.component_count(),
            elapsed.as_secs_f64() * 1000.0
        );
    }

    // Route: first node to last node
    println!();
    if let (Some(first), Some(last)) = (graph.nodes().first(), graph.nodes().last()) {
        let t = Instant::now();
        let route = shortest_route(&graph, &first.id, &last.id, DEFAULT_AVERAGE_SPEED_KMH);
        let elapsed = t.elapsed().as_secs_f64() * 1000.0;
        match route {
            Ok(Some(r)) => println!(
                "Route {} → {}: {} hops, {:.2} km, {:.0} min in {:.2}ms",
                first.id,
                last.id,
                r.hop_count(),
                r.distance_km,
                r.duration_min,
                elapsed
            ),
            Ok(None) => println!("Route {} → {}: no path ({:.2}ms)", first.id, last.id, elapsed),
            Err(e) => println!("Route {} → {}: {}", first.id, last.id, e),
        }
    }

    // Centrality: exact vs sampled
    println!();
    println!("{:>12} {:>10} {:>10} {:>12} {:>12}", "strategy", "sources", "time", "top node", "top score");
    println!("{:->12} {:->10} {:->10} {:->12} {:->12}", "", "", "", "", "");

    for strategy in [SampleStrategy::Full, SampleStrategy::Random, SampleStrategy::HighDegree] {
        let options = config.centrality_options(strategy, None).with_seed(7);
        run_centrality(&graph, strategy, &options);
    }
    println!();
}

fn run_centrality(graph: &Graph, strategy: SampleStrategy, options: &CentralityOptions) {
    let t = Instant::now();
    let result = betweenness(graph, options, &CancelToken::new());
    let elapsed = t.elapsed().as_secs_f64() * 1000.0;
    match result {
        Ok(scores) => {
            let top = scores.top(1);
            let (id, score) = top
                .first()
                .map_or(("-", 0.0), |c| (c.id.as_str(), c.score));
            println!(
                "{:>12} {:>10} {:>8.1}ms {:>12} {:>12.1}",
                strategy.to_string(),
                scores.sources_used,
                elapsed,
                id,
                score
            );
        }
        Err(e) => println!("{:>12} {}", strategy.to_string(), e),
    }
}

// ---------------------------------------------------------------------------
// Generators: deterministic, single-threaded, O(n + edges)
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
    /// Block length between 0.1 and 0.6 km.
    fn block_km(&mut self) -> f64 {
        0.1 + self.next_f64() * 0.5
    }
}

const WAY_TYPES: [&str; 3] = ["Local", "Collector", "Arterial"];

fn node_id(i: usize) -> String {
    format!("n{i}")
}

/// Square grid split into four districts by quadrant.
///
/// Every fourth row and column is arterial. Tests long routes with many
/// equal-length alternatives.
fn gen_grid(node_count: usize) -> RawGraph {
    let side = ((node_count as f64).sqrt().ceil() as usize).max(2);
    let n = side * side;
    let mut raw = RawGraph::with_capacity(n, 2 * n);
    let mut rng = FastRng::new(42);

    for i in 0..n {
        let (row, col) = (i / side, i % side);
        let quadrant = (row * 2 / side) * 2 + col * 2 / side;
        raw.push_node(NodeRecord::new(node_id(i)).with_district(format!("d{quadrant}")));
    }
    for i in 0..n {
        let (row, col) = (i / side, i % side);
        if col + 1 < side {
            let way = if row % 4 == 0 { "Arterial" } else { "Local" };
            raw.push_edge(EdgeRecord::new(node_id(i), node_id(i + 1), rng.block_km(), way));
        }
        if row + 1 < side {
            let way = if col % 4 == 0 { "Arterial" } else { "Local" };
            raw.push_edge(EdgeRecord::new(node_id(i), node_id(i + side), rng.block_km(), way));
        }
    }
    raw
}

/// Ring road with random chords (Watts-Strogatz style).
///
/// Each node links to its two clockwise neighbors; about 5% of nodes get a
/// long shortcut. Tests sampled centrality on a graph with no natural hubs.
fn gen_ring(node_count: usize) -> RawGraph {
    let n = node_count.max(3);
    let mut raw = RawGraph::with_capacity(n, 2 * n + n / 20);
    let mut rng = FastRng::new(1337);

    for i in 0..n {
        raw.push_node(NodeRecord::new(node_id(i)).with_district(format!("d{}", i * 8 / n)));
    }
    for i in 0..n {
        raw.push_edge(EdgeRecord::new(node_id(i), node_id((i + 1) % n), rng.block_km(), "Local"));
        raw.push_edge(EdgeRecord::new(
            node_id(i),
            node_id((i + 2) % n),
            rng.block_km() * 2.0,
            "Collector",
        ));
    }
    for i in 0..n {
        if rng.next(20) == 0 {
            let j = rng.next(n as u64) as usize;
            if j != i {
                raw.push_edge(EdgeRecord::new(node_id(i), node_id(j), 1.0 + rng.next_f64() * 4.0, "Arterial"));
            }
        }
    }
    raw
}

/// Districts of 50 nodes around a hub; hubs form a chain of arterials.
///
/// Produces a few very high-degree nodes, which is where the high-degree
/// sampling strategy should do well.
fn gen_districts(node_count: usize) -> RawGraph {
    const DISTRICT_SIZE: usize = 50;
    let n = node_count.max(DISTRICT_SIZE);
    let districts = n.div_ceil(DISTRICT_SIZE);
    let mut raw = RawGraph::with_capacity(n, 2 * n);
    let mut rng = FastRng::new(7);

    for i in 0..n {
        raw.push_node(NodeRecord::new(node_id(i)).with_district(format!("d{}", i / DISTRICT_SIZE)));
    }
    for d in 0..districts {
        let hub = d * DISTRICT_SIZE;
        let end = ((d + 1) * DISTRICT_SIZE).min(n);
        for i in hub + 1..end {
            let way = WAY_TYPES[rng.next(2) as usize];
            raw.push_edge(EdgeRecord::new(node_id(hub), node_id(i), rng.block_km(), way));
            // occasional side street between spokes
            if i + 1 < end && rng.next(4) == 0 {
                raw.push_edge(EdgeRecord::new(node_id(i), node_id(i + 1), rng.block_km(), "Local"));
            }
        }
        if d + 1 < districts {
            let next_hub = (d + 1) * DISTRICT_SIZE;
            raw.push_edge(EdgeRecord::new(node_id(hub), node_id(next_hub), 1.0 + rng.next_f64() * 2.0, "Arterial"));
        }
    }
    raw
}
