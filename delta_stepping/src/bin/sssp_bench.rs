//! Benchmark driver: sweeps the solvers over graphs, bucket widths, and
//! worker counts, verifies every run against the Dijkstra reference, and
//! reports a summary table, a CSV file, and an optional provenance
//! record.

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use delta_stepping::generators::{self, WeightDistribution};
use delta_stepping::io::load_graph;
use delta_stepping::{
    distances_match, DeltaStepping, DeltaSteppingSequential, Dijkstra, Graph, ShortestPathSolver,
};
use run_record::RunRecord;

const VERIFY_EPSILON: f64 = 1e-9;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Graph files to benchmark; a generated suite is used when empty
    #[arg(short, long)]
    graph_file: Vec<PathBuf>,

    /// Divide loaded weights by the maximum weight per file
    #[arg(long)]
    normalize: bool,

    #[arg(short, long, default_value_t = 0)]
    source: usize,

    /// Bucket widths to sweep
    #[arg(short, long, value_delimiter = ',', default_values_t = vec![0.01, 0.2, 0.6])]
    deltas: Vec<f64>,

    /// Worker counts to sweep
    #[arg(short, long, value_delimiter = ',', default_values_t = vec![2, 4, 8, 16])]
    threads: Vec<usize>,

    /// Timed repetitions per configuration; the best time is kept
    #[arg(short, long, default_value_t = 3)]
    iterations: usize,

    /// Vertex count for the generated suite
    #[arg(long, default_value_t = 1000)]
    gen_vertices: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "benchmark_results.csv")]
    csv: PathBuf,

    /// Append a JSON-lines provenance record here
    #[arg(long)]
    record: Option<PathBuf>,
}

impl Cli {
    fn describe(&self) {
        if self.graph_file.is_empty() {
            println!("graphs:     generated suite ({} vertices)", self.gen_vertices);
        } else {
            println!("graphs:     {} file(s)", self.graph_file.len());
        }
        println!("deltas:     {:?}", self.deltas);
        println!("threads:    {:?}", self.threads);
        println!("iterations: {}", self.iterations);
        println!("seed:       {}", self.seed);
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct BenchRow {
    graph: String,
    algorithm: String,
    vertices: usize,
    edges: usize,
    delta: f64,
    threads: usize,
    time_ms: f64,
    speedup: f64,
    efficiency: f64,
    correct: bool,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("sssp_bench: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    cli.describe();

    let graphs: Vec<(String, Graph)> = if cli.graph_file.is_empty() {
        generated_suite(cli.gen_vertices, cli.seed)
    } else {
        let mut graphs = Vec::new();
        for path in &cli.graph_file {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            graphs.push((name, load_graph(path, cli.normalize)?));
        }
        graphs
    };

    let mut rows = Vec::new();
    for (name, graph) in &graphs {
        rows.extend(bench_graph(&cli, name, graph)?);
    }

    let mut table = Table::new(&rows);
    table.with(Style::psql());
    println!("\n{table}");

    let failures = rows.iter().filter(|row| !row.correct).count();
    if failures > 0 {
        println!("WARNING: {failures} configuration(s) diverged from the reference");
    }

    write_csv(&rows, &cli.csv)?;
    println!("results written to {}", cli.csv.display());

    if let Some(path) = &cli.record {
        let mut record = RunRecord::with_name("sssp_bench");
        record.insert_output("graphs", graphs.len().to_string());
        record.insert_output("configurations", rows.len().to_string());
        record.insert_output("verification_failures", failures.to_string());
        record.append(path)?;
        println!("run record appended to {}", path.display());
    }

    Ok(())
}

fn generated_suite(n: usize, seed: u64) -> Vec<(String, Graph)> {
    let uniform = WeightDistribution::Uniform { lo: 0.0, hi: 1.0 };
    let side = (n as f64).sqrt() as usize;
    vec![
        (
            "random_sparse".to_string(),
            generators::random_graph(n, n.saturating_mul(7), uniform, true, seed),
        ),
        (
            "grid".to_string(),
            generators::grid_graph(side.max(2), side.max(2), uniform, true, seed),
        ),
        (
            "scale_free".to_string(),
            generators::scale_free_graph(n, 8, uniform, true, seed),
        ),
        (
            "rmat".to_string(),
            generators::rmat_graph(n, n.saturating_mul(8), uniform, false, seed),
        ),
    ]
}

fn bench_graph(cli: &Cli, name: &str, graph: &Graph) -> Result<Vec<BenchRow>, Box<dyn Error>> {
    let vertices = graph.num_vertices();
    let edges = graph.num_edges();
    let source = cli.source.min(vertices.saturating_sub(1));

    println!("\n=== {name}: {vertices} vertices, {edges} edges, source {source} ===");

    let started = Instant::now();
    let reference = Dijkstra.compute(graph, source)?;
    let reference_ms = started.elapsed().as_secs_f64() * 1e3;
    let reachable = reference.iter().filter(|d| d.is_finite()).count();
    println!("dijkstra reference: {reference_ms:.3} ms, {reachable}/{vertices} reachable");

    let mut rows = vec![BenchRow {
        graph: name.to_string(),
        algorithm: "dijkstra".to_string(),
        vertices,
        edges,
        delta: 0.0,
        threads: 1,
        time_ms: reference_ms,
        speedup: 1.0,
        efficiency: 1.0,
        correct: true,
    }];

    for &delta in &cli.deltas {
        let sequential = DeltaSteppingSequential::new(delta)?;
        let (time_ms, distances) = time_best(&sequential, graph, source, cli.iterations)?;
        let correct = distances_match(&reference, &distances, VERIFY_EPSILON);
        let speedup = reference_ms / time_ms;
        println!(
            "{} delta={delta}: {time_ms:.3} ms ({})",
            sequential.name(),
            if correct { "ok" } else { "MISMATCH" }
        );
        rows.push(BenchRow {
            graph: name.to_string(),
            algorithm: sequential.name().to_string(),
            vertices,
            edges,
            delta,
            threads: 1,
            time_ms,
            speedup,
            efficiency: speedup,
            correct,
        });

        for &threads in &cli.threads {
            let parallel = DeltaStepping::new(delta, threads)?;
            let (time_ms, distances) = time_best(&parallel, graph, source, cli.iterations)?;
            let correct = distances_match(&reference, &distances, VERIFY_EPSILON);
            let speedup = reference_ms / time_ms;
            println!(
                "{} delta={delta} threads={threads}: {time_ms:.3} ms ({})",
                parallel.name(),
                if correct { "ok" } else { "MISMATCH" }
            );
            rows.push(BenchRow {
                graph: name.to_string(),
                algorithm: parallel.name().to_string(),
                vertices,
                edges,
                delta,
                threads,
                time_ms,
                speedup,
                efficiency: speedup / threads as f64,
                correct,
            });
        }
    }

    Ok(rows)
}

fn time_best(
    solver: &dyn ShortestPathSolver,
    graph: &Graph,
    source: usize,
    iterations: usize,
) -> Result<(f64, Vec<f64>), Box<dyn Error>> {
    let mut best = f64::INFINITY;
    let mut result = Vec::new();
    for _ in 0..iterations.max(1) {
        let started = Instant::now();
        result = solver.compute(graph, source)?;
        best = best.min(started.elapsed().as_secs_f64() * 1e3);
    }
    Ok((best, result))
}

fn write_csv(rows: &[BenchRow], path: &PathBuf) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
