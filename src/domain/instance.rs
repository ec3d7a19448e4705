use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{VertexId, VIRTUAL_SOURCE};

/// Plain instance data bound to the flow model at solve time.
///
/// Field names on the wire follow the model's notation: `n`, `E` (arcs,
/// including the source arc), `cost`, `utility`, `T` (terminals), `C` (budget).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceData {
    pub n: usize,
    #[serde(rename = "E")]
    pub arcs: Vec<(VertexId, VertexId)>,
    pub cost: BTreeMap<VertexId, f64>,
    pub utility: BTreeMap<VertexId, f64>,
    #[serde(rename = "T")]
    pub terminals: Vec<VertexId>,
    #[serde(rename = "C")]
    pub budget: f64,
}

impl InstanceData {
    /// Assemble instance data from a plain edge list, appending the arc from
    /// the virtual source to the first terminal.
    pub fn from_edges(
        n: usize,
        mut edges: Vec<(VertexId, VertexId)>,
        cost: BTreeMap<VertexId, f64>,
        utility: BTreeMap<VertexId, f64>,
        terminals: Vec<VertexId>,
        budget: f64,
    ) -> Self {
        if let Some(&root) = terminals.first() {
            edges.push((VIRTUAL_SOURCE, root));
        }
        Self {
            n,
            arcs: edges,
            cost,
            utility,
            terminals,
            budget,
        }
    }

    /// Same cost and utility for every vertex in `1..=n`
    pub fn uniform_weights(n: usize, value: f64) -> BTreeMap<VertexId, f64> {
        (1..=n).map(|v| (v, value)).collect()
    }
}
