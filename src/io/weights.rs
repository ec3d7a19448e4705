use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use crate::domain::VertexId;

/// Per-vertex cost and utility overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexWeights {
    pub cost: BTreeMap<VertexId, f64>,
    pub utility: BTreeMap<VertexId, f64>,
}

impl VertexWeights {
    /// Dense maps over `1..=n`, falling back to the defaults for unlisted vertices
    pub fn resolve(
        &self,
        n: usize,
        default_cost: f64,
        default_utility: f64,
    ) -> (BTreeMap<VertexId, f64>, BTreeMap<VertexId, f64>) {
        let mut cost: BTreeMap<VertexId, f64> = (1..=n).map(|v| (v, default_cost)).collect();
        let mut utility: BTreeMap<VertexId, f64> = (1..=n).map(|v| (v, default_utility)).collect();
        cost.extend(&self.cost);
        utility.extend(&self.utility);
        (cost, utility)
    }
}

/// Read a header line followed by `v,cost,utility` lines
pub fn read_weights(path: &Path) -> Result<VertexWeights> {
    parse_weights(super::open(path)?)
        .with_context(|| format!("invalid weights file {}", path.display()))
}

pub fn parse_weights(reader: impl BufRead) -> Result<VertexWeights> {
    let mut weights = VertexWeights::default();
    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let [v, cost, utility] = super::fields::<3>(&line, line_no, "v,cost,utility")?;
        let vertex: VertexId = v.parse().with_context(|| format!("line {line_no}: bad vertex `{v}`"))?;
        let cost: f64 = cost.parse().with_context(|| format!("line {line_no}: bad cost `{cost}`"))?;
        let utility: f64 = utility
            .parse()
            .with_context(|| format!("line {line_no}: bad utility `{utility}`"))?;
        weights.cost.insert(vertex, cost);
        weights.utility.insert(vertex, utility);
    }
    Ok(weights)
}
