//! Constraint families of the flow-based connectivity model
//!
//! With `x[j]` the selection binaries and `y[i,j]` the arc flows:
//!
//! 1. budget: `Σ cost[j]·x[j] <= C`
//! 2. terminal forcing: `x[t] = 1` for every terminal
//! 3. flow capacity: `y[i,j] <= M·x[j]` for every arc
//! 4. flow balance: `Σ_i y[i,j] = x[j] + Σ_l y[j,l]` for every vertex
//! 5. source flow: `Σ_j y[t0,j] = Σ_j x[j] - 1`
//!
//! Every selected vertex consumes one unit of flow and flow can only enter
//! selected vertices, so a feasible flow exists exactly when every selected
//! vertex is reachable from the root through selected vertices.

use serde::{Deserialize, Serialize};

use super::{Constraint, LinearExpr, Relation, VarId};
use crate::domain::{GraphModel, VertexId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ConstraintFamily {
    Budget,
    TerminalForcing,
    FlowCapacity,
    FlowBalance,
    SourceFlow,
}

/// Big-M used in the flow capacity constraints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BigM {
    /// `M = n`; no arc can carry more than one unit per vertex
    #[default]
    VertexCount,
    /// `M = min(n, vertices affordable within budget)`
    BudgetTightened,
}

impl BigM {
    pub fn value(&self, graph: &GraphModel, tolerance: f64) -> f64 {
        let n = graph.n();
        match self {
            BigM::VertexCount => n as f64,
            BigM::BudgetTightened => graph.max_affordable_vertices(tolerance).clamp(1, n) as f64,
        }
    }
}

/// Variable handles created by the builder
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionVars {
    /// `x[j]`, stored at `j - 1`
    pub(crate) selected: Vec<VarId>,
    /// `y[i,j]`, stored at the arc's index in the graph
    pub(crate) flow: Vec<VarId>,
}

impl DecisionVars {
    pub fn selected(&self, vertex: VertexId) -> VarId {
        self.selected[vertex - 1]
    }

    pub fn flow(&self, arc_index: usize) -> VarId {
        self.flow[arc_index]
    }
}

pub fn budget(graph: &GraphModel, vars: &DecisionVars) -> Constraint {
    let lhs = graph
        .vertices()
        .map(|j| (vars.selected(j), graph.cost(j)))
        .collect();
    Constraint::new(
        ConstraintFamily::Budget,
        "budget",
        lhs,
        Relation::LessEq,
        graph.budget(),
    )
}

pub fn terminal_forcing(graph: &GraphModel, vars: &DecisionVars) -> Vec<Constraint> {
    graph
        .terminals()
        .iter()
        .map(|&t| {
            Constraint::new(
                ConstraintFamily::TerminalForcing,
                format!("terminal_{t}"),
                [(vars.selected(t), 1.0)].into_iter().collect(),
                Relation::Eq,
                1.0,
            )
        })
        .collect()
}

pub fn flow_capacity(graph: &GraphModel, vars: &DecisionVars, big_m: f64) -> Vec<Constraint> {
    graph
        .arcs()
        .iter()
        .enumerate()
        .map(|(idx, arc)| {
            Constraint::new(
                ConstraintFamily::FlowCapacity,
                format!("capacity_{}_{}", arc.tail, arc.head),
                [(vars.flow(idx), 1.0), (vars.selected(arc.head), -big_m)]
                    .into_iter()
                    .collect(),
                Relation::LessEq,
                0.0,
            )
        })
        .collect()
}

pub fn flow_balance(graph: &GraphModel, vars: &DecisionVars) -> Vec<Constraint> {
    graph
        .vertices()
        .map(|j| {
            let mut lhs = LinearExpr::new();
            for &idx in graph.incoming(j) {
                lhs.add_term(vars.flow(idx), 1.0);
            }
            lhs.add_term(vars.selected(j), -1.0);
            for &idx in graph.outgoing(j) {
                lhs.add_term(vars.flow(idx), -1.0);
            }
            Constraint::new(
                ConstraintFamily::FlowBalance,
                format!("balance_{j}"),
                lhs,
                Relation::Eq,
                0.0,
            )
        })
        .collect()
}

pub fn source_flow(graph: &GraphModel, vars: &DecisionVars) -> Constraint {
    let root = graph.root();
    let mut lhs = LinearExpr::new();
    for &idx in graph.outgoing(root) {
        lhs.add_term(vars.flow(idx), 1.0);
    }
    for j in graph.vertices() {
        lhs.add_term(vars.selected(j), -1.0);
    }
    Constraint::new(
        ConstraintFamily::SourceFlow,
        "source_flow",
        lhs,
        Relation::Eq,
        -1.0,
    )
}

/// `Σ utility[j]·x[j]`, to be maximized
pub fn objective(graph: &GraphModel, vars: &DecisionVars) -> LinearExpr {
    graph
        .vertices()
        .map(|j| (vars.selected(j), graph.utility(j)))
        .collect()
}
