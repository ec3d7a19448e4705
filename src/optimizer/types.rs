use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use super::LinearProgram;

/// Variable values indexed by [`VarId::index`](super::VarId::index)
pub type Assignment = Vec<f64>;

/// Best feasible point found before the solver stopped
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    pub assignment: Assignment,
    pub objective: f64,
}

/// What a backend reports for one solve
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Optimal { assignment: Assignment, objective: f64 },
    Infeasible,
    Unbounded,
    /// Stopped on the time limit; `bound` is the best proven objective bound
    TimeLimitReached { best: Option<Incumbent>, bound: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// `None` lets the solver run to completion
    pub time_limit: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver backend failed: {0}")]
    Backend(String),

    #[error("Solver task did not complete: {0}")]
    Aborted(String),
}

/// Entry point to an external MILP engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SolverBackend: Send + Sync {
    async fn solve(
        &self,
        program: &LinearProgram,
        options: &SolveOptions,
    ) -> Result<SolveOutcome, SolverError>;
}
