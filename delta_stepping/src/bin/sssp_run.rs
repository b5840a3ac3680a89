//! Loads a graph, runs one solver, and emits the distance vector, one
//! value per vertex per line (`inf` for unreachable vertices).

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use delta_stepping::io::{load_graph, write_distances};
use delta_stepping::{DeltaStepping, DeltaSteppingSequential, Dijkstra, ShortestPathSolver};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SolverKind {
    Dijkstra,
    Sequential,
    Parallel,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Edge-list file, one `u v w` line per edge
    #[arg(short, long)]
    graph: PathBuf,

    /// Source vertex, in the densely remapped id space
    #[arg(short, long, default_value_t = 0)]
    source: usize,

    #[arg(long, value_enum, default_value_t = SolverKind::Parallel)]
    solver: SolverKind,

    /// Bucket width for the delta-stepping solvers
    #[arg(short, long, default_value_t = 0.1)]
    delta: f64,

    /// Worker threads for the parallel solver
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Divide every weight by the maximum weight in the file
    #[arg(long)]
    normalize: bool,

    /// Write the distances to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also dump the distance vector as JSON
    #[arg(long)]
    write_json: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("sssp_run: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(&cli.graph, cli.normalize)?;

    let solver: Box<dyn ShortestPathSolver> = match cli.solver {
        SolverKind::Dijkstra => Box::new(Dijkstra),
        SolverKind::Sequential => Box::new(DeltaSteppingSequential::new(cli.delta)?),
        SolverKind::Parallel => Box::new(DeltaStepping::new(cli.delta, cli.threads)?),
    };

    let distances = solver.compute(&graph, cli.source)?;

    match &cli.output {
        Some(path) => write_distances(&distances, File::create(path)?)?,
        None => write_distances(&distances, io::stdout().lock())?,
    }

    if let Some(path) = &cli.write_json {
        serde_json::to_writer(File::create(path)?, &distances)?;
    }

    Ok(())
}
