//! Text edge-list I/O.
//!
//! One directed edge per line: `<u> <v> <w>`, space separated. Vertex ids
//! are arbitrary integers and are remapped to a dense `0..n` range in
//! order of first appearance. Blank and malformed lines are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Deserialize;

use crate::graph::{Edge, Graph};
use crate::GraphError;

#[derive(Debug, Deserialize)]
struct EdgeRow {
    u: i64,
    v: i64,
    w: f64,
}

/// Loads a graph from the text edge-list format. With `normalize_weights`
/// every weight is divided by the maximum weight observed in the file.
pub fn load_graph(path: &Path, normalize_weights: bool) -> Result<Graph, GraphError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut index_map: HashMap<i64, usize> = HashMap::new();
    let mut edges: Vec<Edge> = Vec::new();
    let mut max_weight = 0.0_f64;

    for row in reader.deserialize() {
        let row: EdgeRow = match row {
            Ok(row) => row,
            Err(_) => continue,
        };
        let next = index_map.len();
        let u = *index_map.entry(row.u).or_insert(next);
        let next = index_map.len();
        let v = *index_map.entry(row.v).or_insert(next);
        max_weight = max_weight.max(row.w);
        edges.push(Edge::new(u, v, row.w));
    }

    if edges.is_empty() {
        return Err(GraphError::Empty {
            path: path.display().to_string(),
        });
    }

    if normalize_weights && max_weight > 0.0 {
        let inv = 1.0 / max_weight;
        for edge in &mut edges {
            edge.w *= inv;
        }
    }

    Graph::from_edges(index_map.len(), &edges)
}

/// Writes a graph in the text edge-list format, grouped by source vertex.
pub fn save_graph(graph: &Graph, path: &Path) -> Result<(), GraphError> {
    let mut out = BufWriter::new(File::create(path)?);
    for edge in graph.edges() {
        writeln!(out, "{} {} {}", edge.u, edge.v, edge.w)?;
    }
    out.flush()?;
    Ok(())
}

/// Renders one distance for the output format; +inf prints as `inf`.
pub fn format_distance(d: f64) -> String {
    if d.is_infinite() {
        "inf".to_string()
    } else {
        format!("{d}")
    }
}

/// Emits the distance vector, one value per vertex per line in dense
/// remapped order.
pub fn write_distances<W: Write>(distances: &[f64], out: W) -> io::Result<()> {
    let mut out = BufWriter::new(out);
    for &d in distances {
        writeln!(out, "{}", format_distance(d))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_file(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("delta_stepping_io_{}_{}", std::process::id(), name));
        path
    }

    #[test]
    fn save_then_load_round_trips() {
        let edges = [
            Edge::new(0, 1, 0.25),
            Edge::new(1, 2, 0.5),
            Edge::new(2, 0, 0.75),
        ];
        let graph = Graph::from_edges(3, &edges).unwrap();
        let path = scratch_file("round_trip");
        save_graph(&graph, &path).unwrap();

        let loaded = load_graph(&path, false).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.num_vertices(), 3);
        assert_eq!(loaded.num_edges(), 3);
        assert_eq!(loaded.adj(0).collect::<Vec<_>>(), vec![(1, 0.25)]);
        assert_eq!(loaded.max_edge_weight(), 0.75);
    }

    #[test]
    fn ids_are_remapped_in_first_appearance_order() {
        let path = scratch_file("remap");
        fs::write(&path, "10 7 0.5\n7 42 1.5\n").unwrap();
        let graph = load_graph(&path, false).unwrap();
        fs::remove_file(&path).unwrap();

        // 10 -> 0, 7 -> 1, 42 -> 2
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.adj(0).collect::<Vec<_>>(), vec![(1, 0.5)]);
        assert_eq!(graph.adj(1).collect::<Vec<_>>(), vec![(2, 1.5)]);
    }

    #[test]
    fn blank_and_malformed_lines_are_skipped() {
        let path = scratch_file("malformed");
        fs::write(
            &path,
            "0 1 0.5\n\nnot an edge\n1 2\n2 three 0.5\n1 2 0.25\n",
        )
        .unwrap();
        let graph = load_graph(&path, false).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn normalization_divides_by_max_weight() {
        let path = scratch_file("normalize");
        fs::write(&path, "0 1 2.0\n1 2 4.0\n").unwrap();
        let graph = load_graph(&path, true).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(graph.max_edge_weight(), 1.0);
        assert_eq!(graph.adj(0).collect::<Vec<_>>(), vec![(1, 0.5)]);
    }

    #[test]
    fn empty_file_is_rejected() {
        let path = scratch_file("empty");
        fs::write(&path, "").unwrap();
        let err = load_graph(&path, false).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, GraphError::Empty { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = scratch_file("does_not_exist");
        assert!(load_graph(&path, false).is_err());
    }

    #[test]
    fn distances_render_inf_as_text() {
        let mut buffer = Vec::new();
        write_distances(&[0.0, 1.5, f64::INFINITY], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "0\n1.5\ninf\n");
    }
}
