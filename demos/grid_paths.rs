use clap::Parser;

use setset_rs::family::Family;
use setset_rs::graph::SubgraphSpec;
use setset_rs::range::Range;
use setset_rs::zdd::ZddManager;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of vertices along each side of the grid.
    #[arg(value_name = "INT", default_value = "4")]
    n: u32,

    /// Number of random paths to print.
    #[clap(long, value_name = "INT", default_value = "3")]
    samples: usize,

    /// Seed for the random sampler.
    #[clap(long, value_name = "INT", default_value = "42")]
    seed: u64,
}

type Vertex = (u32, u32);

/// Edges of the `n x n` grid graph, row by row.
fn grid(n: u32) -> Vec<(Vertex, Vertex)> {
    let mut edges = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if j + 1 < n {
                edges.push(((i, j), (i, j + 1)));
            }
            if i + 1 < n {
                edges.push(((i, j), (i + 1, j)));
            }
        }
    }
    edges
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let mgr = ZddManager::new();
    let edges = grid(args.n);
    println!("Grid {}x{} with {} edges", args.n, args.n, edges.len());

    let start = (0, 0);
    let goal = (args.n - 1, args.n - 1);

    // Simple paths from corner to corner
    let mut spec = SubgraphSpec::new(edges.clone())
        .vertex_groups([vec![start, goal]])
        .no_loop(true);
    for vertex in spec.vertices() {
        let range = if vertex == start || vertex == goal {
            Range::exactly(1)
        } else {
            Range::new(0, 2, 2)?
        };
        spec = spec.degree(vertex, range);
    }
    let paths = Family::subgraphs(&mgr, &spec)?;
    println!("paths: {} (ZDD of {} nodes)", paths.size(), mgr.node_count(paths.root()));

    let spanning = SubgraphSpec::new(edges).no_loop(true).num_comps(1);
    let trees = Family::subgraphs(&mgr, &spanning)?;
    println!("spanning trees: {} (ZDD of {} nodes)", trees.size(), mgr.node_count(trees.root()));

    if let Some(shortest) = paths.minimize(&vec![1.0; spec.edges().len()]).next() {
        println!("shortest path uses {} edges: {:?}", shortest.len(), shortest);
    }
    for path in paths.iter_random(args.seed).take(args.samples) {
        let route: Vec<_> = path.iter().map(|e| spec.edges()[e.index()]).collect();
        println!("random path: {:?}", route);
    }

    println!("mgr = {:?}", mgr);
    println!("Total time: {:?}", time_total.elapsed());

    Ok(())
}
