//! Selection pipeline: graph → flow model → solver → checked selection.

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use super::{SolutionInterpreter, Selection, SolverInconsistencyError};
use crate::domain::{Arc, GraphModel, InstanceData, MalformedGraphError};
use crate::optimizer::{
    BigM, FlowModel, ModelBuilder, SolveOptions, SolveOutcome, SolverBackend, SolverError,
};

#[derive(Debug, Clone)]
pub struct SelectorOptions {
    pub time_limit: Option<Duration>,
    pub verify_connectivity: bool,
    pub tolerance: f64,
    /// Report infeasibility without solving when the terminals alone exceed the budget
    pub presolve_screen: bool,
    pub big_m: BigM,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            time_limit: None,
            verify_connectivity: true,
            tolerance: 1e-6,
            presolve_screen: true,
            big_m: BigM::VertexCount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InfeasibleReason {
    TerminalsExceedBudget { terminal_cost: f64, budget: f64 },
    SolverProvedInfeasible,
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfeasibleReason::TerminalsExceedBudget {
                terminal_cost,
                budget,
            } => write!(
                f,
                "selecting the terminals costs {terminal_cost}, more than the budget {budget}"
            ),
            InfeasibleReason::SolverProvedInfeasible => {
                write!(f, "the terminals cannot be connected within the budget")
            }
        }
    }
}

/// No selection satisfies the terminals, budget and connectivity together
#[derive(Debug, Clone, PartialEq, Error)]
#[error("No feasible selection: {reason}")]
pub struct InfeasibleModelError {
    pub reason: InfeasibleReason,
}

/// The time limit expired before any feasible selection was found
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Time limit of {limit:?} reached without a feasible selection (objective bound {bound})")]
pub struct TimeLimitError {
    pub limit: Option<Duration>,
    pub bound: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Optimality {
    Proven,
    /// Best incumbent at the time limit; `bound` caps the achievable utility
    TimeLimited { bound: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReport {
    pub selection: Selection,
    pub optimality: Optimality,
    pub solve_time: Duration,
    /// Arcs of the subgraph induced by the selection
    pub selected_arcs: Vec<Arc>,
}

impl SelectionReport {
    pub fn is_optimal(&self) -> bool {
        self.optimality == Optimality::Proven
    }
}

/// Result of a solve that did not fail outright
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Selected(SelectionReport),
    Infeasible(InfeasibleModelError),
    Unbounded,
    TimedOut(TimeLimitError),
}

impl SelectionOutcome {
    pub fn report(&self) -> Option<&SelectionReport> {
        match self {
            SelectionOutcome::Selected(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    Malformed(#[from] MalformedGraphError),

    #[error(transparent)]
    Inconsistent(#[from] SolverInconsistencyError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub struct SubgraphSelector {
    backend: Box<dyn SolverBackend>,
    options: SelectorOptions,
}

impl SubgraphSelector {
    pub fn new(backend: Box<dyn SolverBackend>, options: SelectorOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &SelectorOptions {
        &self.options
    }

    pub fn build_model(&self, graph: &GraphModel) -> FlowModel {
        ModelBuilder::new(self.options.big_m).build(graph)
    }

    /// Validate raw instance data, then select
    pub async fn select_instance(&self, data: &InstanceData) -> Result<SelectionOutcome, SelectError> {
        let graph = GraphModel::from_instance(data)?;
        self.select(&graph).await
    }

    pub async fn select(&self, graph: &GraphModel) -> Result<SelectionOutcome, SelectError> {
        let terminal_cost = graph.terminal_cost();
        if self.options.presolve_screen && terminal_cost > graph.budget() + self.options.tolerance {
            warn!(terminal_cost, budget = graph.budget(), "terminals exceed budget, skipping solve");
            return Ok(SelectionOutcome::Infeasible(InfeasibleModelError {
                reason: InfeasibleReason::TerminalsExceedBudget {
                    terminal_cost,
                    budget: graph.budget(),
                },
            }));
        }

        let model = self.build_model(graph);
        info!(
            vertices = graph.n(),
            arcs = graph.arcs().len(),
            terminals = graph.terminals().len(),
            constraints = model.program().constraints().len(),
            "solving flow model"
        );

        let solve_options = SolveOptions {
            time_limit: self.options.time_limit,
        };
        let started = Instant::now();
        let outcome = self.backend.solve(model.program(), &solve_options).await?;
        let solve_time = started.elapsed();

        let interpreter = SolutionInterpreter::new(graph, &model)
            .with_tolerance(self.options.tolerance)
            .with_connectivity_check(self.options.verify_connectivity);

        let (assignment, objective, optimality) = match outcome {
            SolveOutcome::Optimal {
                assignment,
                objective,
            } => (assignment, objective, Optimality::Proven),
            SolveOutcome::TimeLimitReached {
                best: Some(incumbent),
                bound,
            } => {
                warn!(bound, "time limit reached, returning best incumbent");
                (
                    incumbent.assignment,
                    incumbent.objective,
                    Optimality::TimeLimited { bound },
                )
            }
            SolveOutcome::TimeLimitReached { best: None, bound } => {
                warn!(bound, "time limit reached without incumbent");
                return Ok(SelectionOutcome::TimedOut(TimeLimitError {
                    limit: self.options.time_limit,
                    bound,
                }));
            }
            SolveOutcome::Infeasible => {
                info!("solver proved the model infeasible");
                return Ok(SelectionOutcome::Infeasible(InfeasibleModelError {
                    reason: InfeasibleReason::SolverProvedInfeasible,
                }));
            }
            SolveOutcome::Unbounded => {
                warn!("solver reported an unbounded model");
                return Ok(SelectionOutcome::Unbounded);
            }
        };

        let selection = interpreter.interpret(&assignment, objective)?;
        let selected_arcs = graph.induced_arcs(&selection.vertices);
        info!(
            selected = selection.len(),
            total_cost = selection.total_cost,
            total_utility = selection.total_utility,
            solve_ms = solve_time.as_millis() as u64,
            optimal = optimality == Optimality::Proven,
            "selection complete"
        );

        Ok(SelectionOutcome::Selected(SelectionReport {
            selection,
            optimality,
            solve_time,
            selected_arcs,
        }))
    }
}
