//! Reads a solver assignment back into a vertex selection and checks it
//! against the graph rather than trusting the solver.

use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use thiserror::Error;

use crate::domain::{Arc, GraphModel, VertexId};
use crate::optimizer::FlowModel;

/// A binary counts as selected above this value
pub const SELECTION_THRESHOLD: f64 = 0.5;

/// Disagreement between the solver's answer and the graph it was solving
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverInconsistencyError {
    #[error("Assignment has {actual} values but the model has {expected} variables")]
    AssignmentLength { expected: usize, actual: usize },

    #[error("Solver reported objective {reported} but the selection yields utility {recomputed}")]
    ObjectiveMismatch { reported: f64, recomputed: f64 },

    #[error("Terminal {terminal} is not selected (constraint terminal_{terminal})")]
    TerminalNotSelected { terminal: VertexId },

    #[error("Selected cost {cost} exceeds budget {budget} (constraint budget)")]
    BudgetExceeded { cost: f64, budget: f64 },

    #[error("Selected vertices {unreachable:?} are not reachable from root {root}")]
    Disconnected {
        root: VertexId,
        unreachable: Vec<VertexId>,
    },
}

/// Selected vertices with cost and utility recomputed from the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub vertices: BTreeSet<VertexId>,
    pub total_cost: f64,
    pub total_utility: f64,
}

impl Selection {
    pub fn from_vertices(graph: &GraphModel, vertices: BTreeSet<VertexId>) -> Self {
        Self {
            total_cost: graph.cost_of(&vertices),
            total_utility: graph.utility_of(&vertices),
            vertices,
        }
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

pub struct SolutionInterpreter<'a> {
    graph: &'a GraphModel,
    model: &'a FlowModel,
    tolerance: f64,
    verify_connectivity: bool,
}

impl<'a> SolutionInterpreter<'a> {
    pub fn new(graph: &'a GraphModel, model: &'a FlowModel) -> Self {
        Self {
            graph,
            model,
            tolerance: 1e-6,
            verify_connectivity: true,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_connectivity_check(mut self, enabled: bool) -> Self {
        self.verify_connectivity = enabled;
        self
    }

    /// Turn an assignment and the solver's objective into a checked selection
    pub fn interpret(
        &self,
        assignment: &[f64],
        reported_objective: f64,
    ) -> Result<Selection, SolverInconsistencyError> {
        let expected = self.model.program().variables().len();
        if assignment.len() != expected {
            return Err(SolverInconsistencyError::AssignmentLength {
                expected,
                actual: assignment.len(),
            });
        }

        let vertices: BTreeSet<VertexId> = self
            .graph
            .vertices()
            .filter(|&j| assignment[self.model.vars().selected(j).index()] > SELECTION_THRESHOLD)
            .collect();
        let selection = Selection::from_vertices(self.graph, vertices);

        let scale = reported_objective.abs().max(1.0);
        if (reported_objective - selection.total_utility).abs() > self.tolerance * scale {
            return Err(SolverInconsistencyError::ObjectiveMismatch {
                reported: reported_objective,
                recomputed: selection.total_utility,
            });
        }

        self.check_invariants(&selection)?;
        Ok(selection)
    }

    /// Terminal inclusion, budget and (if enabled) connectivity
    pub fn check_invariants(&self, selection: &Selection) -> Result<(), SolverInconsistencyError> {
        if let Some(&terminal) = self
            .graph
            .terminals()
            .iter()
            .find(|&&t| !selection.contains(t))
        {
            return Err(SolverInconsistencyError::TerminalNotSelected { terminal });
        }

        if selection.total_cost > self.graph.budget() + self.tolerance {
            return Err(SolverInconsistencyError::BudgetExceeded {
                cost: selection.total_cost,
                budget: self.graph.budget(),
            });
        }

        if self.verify_connectivity {
            let unreachable = unreachable_from_root(self.graph, &selection.vertices);
            if !unreachable.is_empty() {
                return Err(SolverInconsistencyError::Disconnected {
                    root: self.graph.root(),
                    unreachable,
                });
            }
        }

        Ok(())
    }
}

/// Selected vertices a breadth-first search from the root cannot reach using
/// only arcs whose both endpoints are selected
pub fn unreachable_from_root(graph: &GraphModel, selected: &BTreeSet<VertexId>) -> Vec<VertexId> {
    let root = graph.root();
    if !selected.contains(&root) {
        return selected.iter().copied().collect();
    }

    let mut reached = BTreeSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(vertex) = queue.pop_front() {
        for &idx in graph.outgoing(vertex) {
            let Arc { head, .. } = graph.arcs()[idx];
            if selected.contains(&head) && reached.insert(head) {
                queue.push_back(head);
            }
        }
    }

    selected.difference(&reached).copied().collect()
}
