//! MILP backend built on `good_lp`
//!
//! The solver-agnostic program is translated variable by variable into a
//! `good_lp` problem and handed to whichever engine the crate was built with
//! (`microlp` by default, CBC with the `cbc` feature).
//!
//! Time limits go to the engine through `WithTimeLimit`, so an expired solve
//! returns on its own: with an incumbent (`SolutionStatus::TimeLimit`) or
//! with an error when no feasible point was found yet. The blocking solve
//! runs on `spawn_blocking` to keep the async runtime responsive.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use good_lp::{
    default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, WithTimeLimit,
};

use crate::optimizer::{
    Incumbent, LinearExpr, LinearProgram, Relation, Sense, SolveOptions, SolveOutcome,
    SolverBackend, SolverError, VarDomain,
};

/// Row slack accepted when checking an incumbent returned at the time limit
const INCUMBENT_TOLERANCE: f64 = 1e-6;

/// Backend that solves with the default `good_lp` engine
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend;

impl GoodLpBackend {
    pub fn new() -> Self {
        Self
    }

    /// Run the solve to completion, or until `time_limit`, on the current thread
    pub fn solve_blocking(
        program: &LinearProgram,
        time_limit: Option<Duration>,
    ) -> Result<SolveOutcome, SolverError> {
        let mut vars = ProblemVariables::new();
        let handles: Vec<good_lp::Variable> = program
            .variables()
            .iter()
            .map(|v| {
                let definition = match v.domain {
                    VarDomain::Binary => variable().binary(),
                    VarDomain::NonNegative => variable().min(0.0),
                };
                vars.add(definition.name(v.name.clone()))
            })
            .collect();

        let objective = to_expression(program.objective(), &handles);
        let unsolved = match program.sense() {
            Sense::Maximize => vars.maximise(objective),
            Sense::Minimize => vars.minimise(objective),
        };
        let mut problem = unsolved.using(default_solver);
        if let Some(limit) = time_limit {
            problem = problem.with_time_limit(limit.as_secs_f64());
        }

        for constraint in program.constraints() {
            let lhs = to_expression(&constraint.lhs, &handles);
            let row = match constraint.relation {
                Relation::LessEq => lhs.leq(constraint.rhs),
                Relation::Eq => lhs.eq(constraint.rhs),
                Relation::GreaterEq => lhs.geq(constraint.rhs),
            };
            problem = problem.with(row);
        }

        let started = Instant::now();
        let result = problem.solve();
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "good_lp solve returned");

        match result {
            Ok(solution) => {
                let assignment: Vec<f64> = handles.iter().map(|&h| solution.value(h)).collect();
                Ok(classify(program, solution.status(), assignment))
            }
            Err(ResolutionError::Infeasible) => Ok(SolveOutcome::Infeasible),
            Err(ResolutionError::Unbounded) => Ok(SolveOutcome::Unbounded),
            Err(other) if time_limit.is_some() && is_time_limit_error(&other) => {
                warn!(?time_limit, "time limit reached before any feasible selection");
                Ok(SolveOutcome::TimeLimitReached {
                    best: None,
                    bound: program.trivial_bound(),
                })
            }
            Err(other) => Err(SolverError::Backend(other.to_string())),
        }
    }
}

#[async_trait]
impl SolverBackend for GoodLpBackend {
    async fn solve(
        &self,
        program: &LinearProgram,
        options: &SolveOptions,
    ) -> Result<SolveOutcome, SolverError> {
        let owned = program.clone();
        let time_limit = options.time_limit;
        tokio::task::spawn_blocking(move || Self::solve_blocking(&owned, time_limit))
            .await
            .map_err(|e| SolverError::Aborted(e.to_string()))?
    }
}

/// Map a returned point and its engine status onto an outcome. A point
/// returned at a limit only counts as an incumbent if it satisfies every row.
fn classify(program: &LinearProgram, status: SolutionStatus, assignment: Vec<f64>) -> SolveOutcome {
    let objective = program.evaluate_objective(&assignment);
    match status {
        SolutionStatus::Optimal => SolveOutcome::Optimal {
            assignment,
            objective,
        },
        SolutionStatus::TimeLimit | SolutionStatus::GapLimit => {
            let violated = program.violations(&assignment, INCUMBENT_TOLERANCE).len();
            let best = if violated == 0 {
                warn!(objective, ?status, "solver stopped early with an incumbent");
                Some(Incumbent {
                    assignment,
                    objective,
                })
            } else {
                warn!(violated, ?status, "solver stopped early without a feasible point");
                None
            };
            SolveOutcome::TimeLimitReached {
                best,
                bound: program.trivial_bound(),
            }
        }
    }
}

fn is_time_limit_error(err: &ResolutionError) -> bool {
    let message = match err {
        ResolutionError::Other(message) => *message,
        ResolutionError::Str(message) => message.as_str(),
        _ => return false,
    };
    message.to_ascii_lowercase().contains("time limit")
}

fn to_expression(expr: &LinearExpr, handles: &[good_lp::Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms().len());
    for &(var, coefficient) in expr.terms() {
        out.add_mul(coefficient, handles[var.index()]);
    }
    out += expr.constant();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GraphModel, InstanceData};
    use crate::optimizer::{Constraint, ConstraintFamily, ModelBuilder, VarId};

    /// max a + 2b  s.t.  a + b <= 1, binaries
    fn pick_one() -> (LinearProgram, VarId) {
        let mut lp = LinearProgram::new(Sense::Maximize);
        let a = lp.add_variable("a", VarDomain::Binary);
        let b = lp.add_variable("b", VarDomain::Binary);
        lp.add_constraint(Constraint::new(
            ConstraintFamily::Budget,
            "budget",
            [(a, 1.0), (b, 1.0)].into_iter().collect(),
            Relation::LessEq,
            1.0,
        ));
        lp.set_objective([(a, 1.0), (b, 2.0)].into_iter().collect());
        (lp, a)
    }

    /// Flow model of a `side` x `side` grid with uneven utilities, rooted in a corner
    fn grid_program(side: usize) -> LinearProgram {
        let id = |r: usize, c: usize| r * side + c + 1;
        let mut edges = Vec::new();
        for r in 0..side {
            for c in 0..side {
                if c + 1 < side {
                    edges.extend([(id(r, c), id(r, c + 1)), (id(r, c + 1), id(r, c))]);
                }
                if r + 1 < side {
                    edges.extend([(id(r, c), id(r + 1, c)), (id(r + 1, c), id(r, c))]);
                }
            }
        }
        let n = side * side;
        let utility = (1..=n).map(|v| (v, ((v * 7) % 11) as f64 / 10.0 + 0.01)).collect();
        let data = InstanceData::from_edges(
            n,
            edges,
            InstanceData::uniform_weights(n, 1.0),
            utility,
            vec![1],
            (n / 3) as f64,
        );
        let graph = GraphModel::from_instance(&data).unwrap();
        ModelBuilder::default().build(&graph).program().clone()
    }

    #[test]
    fn test_solve_blocking_finds_optimum() {
        let (lp, _) = pick_one();
        let outcome = GoodLpBackend::solve_blocking(&lp, None).unwrap();
        match outcome {
            SolveOutcome::Optimal { assignment, objective } => {
                assert!((objective - 2.0).abs() < 1e-6);
                assert!(assignment[0] < 0.5);
                assert!(assignment[1] > 0.5);
            }
            other => panic!("expected optimal outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_infeasible_program_reported() {
        let (mut lp, a) = pick_one();
        lp.add_constraint(Constraint::new(
            ConstraintFamily::TerminalForcing,
            "force_a",
            [(a, 1.0)].into_iter().collect(),
            Relation::GreaterEq,
            2.0,
        ));
        assert_eq!(GoodLpBackend::solve_blocking(&lp, None).unwrap(), SolveOutcome::Infeasible);
    }

    #[tokio::test]
    async fn test_async_solve_with_generous_time_limit() {
        let options = SolveOptions {
            time_limit: Some(Duration::from_secs(30)),
        };
        let (lp, _) = pick_one();
        let outcome = GoodLpBackend::new().solve(&lp, &options).await.unwrap();
        assert!(matches!(outcome, SolveOutcome::Optimal { .. }));
    }

    #[test]
    fn test_feasible_point_at_time_limit_is_incumbent() {
        let (lp, _) = pick_one();
        let outcome = classify(&lp, SolutionStatus::TimeLimit, vec![1.0, 0.0]);
        assert_eq!(
            outcome,
            SolveOutcome::TimeLimitReached {
                best: Some(Incumbent {
                    assignment: vec![1.0, 0.0],
                    objective: 1.0,
                }),
                bound: 3.0,
            }
        );
    }

    #[test]
    fn test_infeasible_point_at_time_limit_is_dropped() {
        let (lp, _) = pick_one();
        let outcome = classify(&lp, SolutionStatus::GapLimit, vec![1.0, 1.0]);
        assert_eq!(outcome, SolveOutcome::TimeLimitReached { best: None, bound: 3.0 });
    }

    #[test]
    fn test_time_limit_error_recognised() {
        assert!(is_time_limit_error(&ResolutionError::Other(
            "Time limit reached before finding a feasible solution"
        )));
        assert!(!is_time_limit_error(&ResolutionError::Other("Abandoned")));
        assert!(!is_time_limit_error(&ResolutionError::Infeasible));
    }

    #[tokio::test]
    async fn test_engine_honours_short_time_limit() {
        let program = grid_program(9);
        let options = SolveOptions {
            time_limit: Some(Duration::from_millis(200)),
        };

        let started = Instant::now();
        let outcome = GoodLpBackend::new().solve(&program, &options).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(20));

        match outcome {
            SolveOutcome::Optimal { .. } => {}
            SolveOutcome::TimeLimitReached { best, bound } => {
                assert!(bound >= 0.0);
                if let Some(incumbent) = best {
                    assert!(program.violations(&incumbent.assignment, 1e-6).is_empty());
                    assert!(incumbent.objective <= bound + 1e-6);
                }
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
