use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;

use crate::domain::VertexId;

/// Arc list read from a graph file; `n` is the largest id seen
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeList {
    pub n: usize,
    pub edges: Vec<(VertexId, VertexId)>,
}

/// Read `x,y` lines, one directed arc per line
pub fn read_graph(path: &Path) -> Result<EdgeList> {
    parse_graph(super::open(path)?).with_context(|| format!("invalid graph file {}", path.display()))
}

pub fn parse_graph(reader: impl BufRead) -> Result<EdgeList> {
    let mut n = 0;
    let mut edges = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let [x, y] = super::fields::<2>(&line, line_no, "x,y")?;
        let x: VertexId = x.parse().with_context(|| format!("line {line_no}: bad vertex `{x}`"))?;
        let y: VertexId = y.parse().with_context(|| format!("line {line_no}: bad vertex `{y}`"))?;
        n = n.max(x).max(y);
        edges.push((x, y));
    }
    Ok(EdgeList { n, edges })
}
