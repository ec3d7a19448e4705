//! Graph data model
//!
//! A validated, immutable description of one selection problem: vertices
//! `1..=n` with cost and utility, directed arcs (including the single arc
//! leaving the virtual source), the terminal set and the budget.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::ops::RangeInclusive;
use tracing::warn;

use super::{InstanceData, MalformedGraphError, WeightField};

/// Vertex identifier. Real vertices are `1..=n`; `0` is the virtual source.
pub type VertexId = usize;

/// Synthetic vertex that seeds flow into the selection through the root terminal
pub const VIRTUAL_SOURCE: VertexId = 0;

/// Directed arc `(tail, head)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Arc {
    pub tail: VertexId,
    pub head: VertexId,
}

impl Arc {
    pub fn new(tail: VertexId, head: VertexId) -> Self {
        Self { tail, head }
    }

    /// True for the arc leaving the virtual source
    pub fn is_source_arc(&self) -> bool {
        self.tail == VIRTUAL_SOURCE
    }
}

impl From<(VertexId, VertexId)> for Arc {
    fn from((tail, head): (VertexId, VertexId)) -> Self {
        Self::new(tail, head)
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.tail, self.head)
    }
}

/// Validated graph instance
#[derive(Debug, Clone)]
pub struct GraphModel {
    n: usize,
    arcs: Vec<Arc>,
    costs: Vec<f64>,
    utilities: Vec<f64>,
    terminals: Vec<VertexId>,
    budget: f64,
    /// Arc indices entering each id in `0..=n`
    incoming: Vec<Vec<usize>>,
    /// Arc indices leaving each id in `0..=n`
    outgoing: Vec<Vec<usize>>,
}

impl GraphModel {
    /// Validate raw instance data and build the model.
    ///
    /// Terminals are deduplicated keeping input order, so the root is always
    /// the first terminal the caller listed.
    pub fn from_instance(data: &InstanceData) -> Result<Self, MalformedGraphError> {
        let n = data.n;
        if n == 0 {
            return Err(MalformedGraphError::NoVertices);
        }
        if !data.budget.is_finite() {
            return Err(MalformedGraphError::InvalidBudget(data.budget));
        }

        let costs = dense_weights(&data.cost, n, WeightField::Cost)?;
        let utilities = dense_weights(&data.utility, n, WeightField::Utility)?;

        let mut terminals = Vec::with_capacity(data.terminals.len());
        let mut seen = HashSet::new();
        for &terminal in &data.terminals {
            if terminal == VIRTUAL_SOURCE || terminal > n {
                return Err(MalformedGraphError::TerminalOutOfRange { terminal, n });
            }
            if seen.insert(terminal) {
                terminals.push(terminal);
            }
        }
        let root = *terminals.first().ok_or(MalformedGraphError::EmptyTerminalSet)?;

        let mut arcs = Vec::with_capacity(data.arcs.len());
        let mut unique = HashSet::with_capacity(data.arcs.len());
        for &pair in &data.arcs {
            let arc = Arc::from(pair);
            if arc.tail > n || arc.head > n {
                return Err(MalformedGraphError::ArcOutOfRange { arc, n });
            }
            if arc.head == VIRTUAL_SOURCE {
                return Err(MalformedGraphError::ArcIntoSource { arc });
            }
            // self-loops and repeats add no flow paths
            if arc.tail == arc.head {
                warn!(%arc, "ignoring self-loop");
                continue;
            }
            if !unique.insert(arc) {
                warn!(%arc, "ignoring repeated arc");
                continue;
            }
            arcs.push(arc);
        }

        let source_arcs: Vec<&Arc> = arcs.iter().filter(|a| a.is_source_arc()).collect();
        match source_arcs.as_slice() {
            [] => return Err(MalformedGraphError::MissingSourceArc { t0: root }),
            [arc] if arc.head != root => {
                return Err(MalformedGraphError::SourceArcMismatch {
                    head: arc.head,
                    t0: root,
                })
            }
            [_] => {}
            many => {
                return Err(MalformedGraphError::MultipleSourceArcs { count: many.len() })
            }
        }

        let mut incoming = vec![Vec::new(); n + 1];
        let mut outgoing = vec![Vec::new(); n + 1];
        for (idx, arc) in arcs.iter().enumerate() {
            outgoing[arc.tail].push(idx);
            incoming[arc.head].push(idx);
        }

        Ok(Self {
            n,
            arcs,
            costs,
            utilities,
            terminals,
            budget: data.budget,
            incoming,
            outgoing,
        })
    }

    /// Number of real vertices
    pub fn n(&self) -> usize {
        self.n
    }

    /// Real vertex ids, `1..=n`
    pub fn vertices(&self) -> RangeInclusive<VertexId> {
        1..=self.n
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn terminals(&self) -> &[VertexId] {
        &self.terminals
    }

    /// The terminal anchored to the virtual source (t0)
    pub fn root(&self) -> VertexId {
        self.terminals[0]
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Cost of a real vertex. Panics for ids outside `1..=n`.
    pub fn cost(&self, vertex: VertexId) -> f64 {
        self.costs[vertex - 1]
    }

    /// Utility of a real vertex. Panics for ids outside `1..=n`.
    pub fn utility(&self, vertex: VertexId) -> f64 {
        self.utilities[vertex - 1]
    }

    /// Indices (into [`arcs`](Self::arcs)) of arcs entering `vertex`
    pub fn incoming(&self, vertex: VertexId) -> &[usize] {
        &self.incoming[vertex]
    }

    /// Indices (into [`arcs`](Self::arcs)) of arcs leaving `vertex`
    pub fn outgoing(&self, vertex: VertexId) -> &[usize] {
        &self.outgoing[vertex]
    }

    pub fn is_terminal(&self, vertex: VertexId) -> bool {
        self.terminals.contains(&vertex)
    }

    /// Cost of selecting every terminal, the least any feasible selection spends
    pub fn terminal_cost(&self) -> f64 {
        self.terminals.iter().map(|&t| self.cost(t)).sum()
    }

    /// Total cost of a set of vertices
    pub fn cost_of<'a>(&self, vertices: impl IntoIterator<Item = &'a VertexId>) -> f64 {
        vertices.into_iter().map(|&v| self.cost(v)).sum()
    }

    /// Total utility of a set of vertices
    pub fn utility_of<'a>(&self, vertices: impl IntoIterator<Item = &'a VertexId>) -> f64 {
        vertices.into_iter().map(|&v| self.utility(v)).sum()
    }

    /// Largest number of vertices whose combined cost fits in the budget.
    ///
    /// Taking vertices cheapest-first maximizes the count, so no selection
    /// within budget can contain more vertices than this.
    pub fn max_affordable_vertices(&self, tolerance: f64) -> usize {
        let mut sorted = self.costs.clone();
        sorted.sort_by(f64::total_cmp);

        let mut spent = 0.0;
        let mut count = 0;
        for cost in sorted {
            if spent + cost > self.budget + tolerance {
                break;
            }
            spent += cost;
            count += 1;
        }
        count
    }

    /// Arcs whose endpoints are both in `selected`, the subgraph the selection induces
    pub fn induced_arcs(&self, selected: &BTreeSet<VertexId>) -> Vec<Arc> {
        self.arcs
            .iter()
            .filter(|a| !a.is_source_arc())
            .filter(|a| selected.contains(&a.tail) && selected.contains(&a.head))
            .copied()
            .collect()
    }
}

impl TryFrom<&InstanceData> for GraphModel {
    type Error = MalformedGraphError;

    fn try_from(data: &InstanceData) -> Result<Self, Self::Error> {
        Self::from_instance(data)
    }
}

fn dense_weights(
    weights: &BTreeMap<VertexId, f64>,
    n: usize,
    field: WeightField,
) -> Result<Vec<f64>, MalformedGraphError> {
    if let Some((&vertex, _)) = weights
        .iter()
        .find(|&(&v, _)| v == VIRTUAL_SOURCE || v > n)
    {
        return Err(MalformedGraphError::UnknownWeightVertex { vertex, field, n });
    }

    (1..=n)
        .map(|vertex| {
            let value = *weights
                .get(&vertex)
                .ok_or(MalformedGraphError::MissingWeight { vertex, field })?;
            if !value.is_finite() || value < 0.0 {
                return Err(MalformedGraphError::InvalidWeight {
                    vertex,
                    field,
                    value,
                });
            }
            Ok(value)
        })
        .collect()
}
