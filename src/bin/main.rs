use std::env;
use std::sync::Arc;

use log::info;
use rand::Rng;

use ch_graph::{prepare, CHQuery, InputGraph, ShortestWeighting};

/// Reads a DIMACS-format graph file, builds a contraction hierarchy for it,
/// and runs a handful of random shortest-path queries, logging timings.
///
/// Run like: cargo run --release --bin main -- path/to/graph.gr
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        panic!("usage: main <path-to-dimacs-graph-file>");
    }
    let filename = &args[1];

    let input_graph = InputGraph::from_dimacs_file(filename).expect("failed to read graph file");
    info!(
        "loaded graph: {} nodes, {} edges",
        input_graph.get_num_nodes(),
        input_graph.get_num_edges()
    );

    let started = std::time::Instant::now();
    let graph = prepare(&input_graph, &ShortestWeighting).expect("preparation failed");
    info!("preparation took {:?}", started.elapsed());

    let mut query = CHQuery::new(Arc::new(graph), Box::new(ShortestWeighting));
    let num_nodes = input_graph.get_num_nodes();
    let mut rng: rand::rngs::StdRng = rand::SeedableRng::seed_from_u64(42);

    let num_queries = 1000;
    let mut not_found = 0;
    let started = std::time::Instant::now();
    for _ in 0..num_queries {
        let source = rng.gen_range(0..num_nodes);
        let target = rng.gen_range(0..num_nodes);
        let path = query.calc_path(source, target);
        if !path.is_found() {
            not_found += 1;
        }
    }
    info!(
        "ran {} queries in {:?} ({} not found)",
        num_queries,
        started.elapsed(),
        not_found
    );
}
