//! Synthetic graph generator; writes the `u v w` text edge-list format.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use delta_stepping::generators::{self, WeightDistribution};
use delta_stepping::io::save_graph;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Family {
    Random,
    Dense,
    Complete,
    Grid,
    Path,
    Rmat,
    ScaleFree,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, value_enum)]
    family: Family,

    /// Number of vertices (the grid family uses --rows/--cols instead)
    #[arg(short = 'n', long, default_value_t = 1000)]
    vertices: usize,

    /// Edge count for random/dense/rmat, edges per new vertex for scale-free
    #[arg(short = 'm', long, default_value_t = 4000)]
    edges: usize,

    #[arg(long, default_value_t = 32)]
    rows: usize,

    #[arg(long, default_value_t = 32)]
    cols: usize,

    #[arg(long, default_value_t = 0.0)]
    min_weight: f64,

    #[arg(long, default_value_t = 1.0)]
    max_weight: f64,

    /// Draw weights from a power-law tail instead of the uniform range
    #[arg(long)]
    power_law: bool,

    /// Shape of the power-law tail
    #[arg(long, default_value_t = 1.287)]
    alpha: f64,

    /// Emit both directions of every edge
    #[arg(short, long)]
    undirected: bool,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(short, long)]
    output: PathBuf,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("graph_gen: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let weights = if cli.power_law {
        WeightDistribution::PowerLaw { alpha: cli.alpha }
    } else {
        WeightDistribution::Uniform {
            lo: cli.min_weight,
            hi: cli.max_weight,
        }
    };

    let graph = match cli.family {
        Family::Random | Family::Dense => {
            generators::random_graph(cli.vertices, cli.edges, weights, cli.undirected, cli.seed)
        }
        Family::Complete => generators::complete_graph(cli.vertices, weights, cli.seed),
        Family::Grid => generators::grid_graph(cli.rows, cli.cols, weights, cli.undirected, cli.seed),
        Family::Path => generators::path_graph(cli.vertices, weights, cli.undirected, cli.seed),
        Family::Rmat => {
            generators::rmat_graph(cli.vertices, cli.edges, weights, cli.undirected, cli.seed)
        }
        Family::ScaleFree => {
            generators::scale_free_graph(cli.vertices, cli.edges, weights, cli.undirected, cli.seed)
        }
    };

    save_graph(&graph, &cli.output)?;
    println!(
        "{:?}: {} vertices, {} edges -> {}",
        cli.family,
        graph.num_vertices(),
        graph.num_edges(),
        cli.output.display()
    );
    Ok(())
}
