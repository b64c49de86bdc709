//! Graph input parsing: a DIMACS-like edge-list format, or JSON
//! `{"n": <count>, "edges": [[u, v, weight], ...]}`.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use troika::graph::WorkingGraph;

pub fn load(path: &Path) -> Result<WorkingGraph> {
    let content = read_input(path)?;
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') {
        parse_json(&content)
    } else {
        parse_edge_list(&content)
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read graph from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[derive(serde::Deserialize)]
struct JsonGraph {
    n: usize,
    edges: Vec<(usize, usize, f64)>,
}

fn parse_json(content: &str) -> Result<WorkingGraph> {
    let parsed: JsonGraph = serde_json::from_str(content).context("Failed to parse graph JSON")?;
    Ok(WorkingGraph::new(parsed.n, parsed.edges)?)
}

/// One edge per non-empty, non-comment line: `u v weight`. The vertex count
/// is the highest index seen, plus one.
fn parse_edge_list(content: &str) -> Result<WorkingGraph> {
    let mut edges = Vec::new();
    let mut max_vertex = None;
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            bail!("line {}: expected `u v weight`, got `{}`", lineno + 1, line);
        }
        let u: usize = fields[0]
            .parse()
            .with_context(|| format!("line {}: bad vertex id `{}`", lineno + 1, fields[0]))?;
        let v: usize = fields[1]
            .parse()
            .with_context(|| format!("line {}: bad vertex id `{}`", lineno + 1, fields[1]))?;
        let w: f64 = fields[2]
            .parse()
            .with_context(|| format!("line {}: bad weight `{}`", lineno + 1, fields[2]))?;
        max_vertex = Some(max_vertex.map_or(u.max(v), |m: usize| m.max(u).max(v)));
        edges.push((u, v, w));
    }
    let n = max_vertex.map(|m| m + 1).unwrap_or(0);
    Ok(WorkingGraph::new(n, edges)?)
}
