//! Run summaries printed by the command line driver.

use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::domain::VertexId;
use crate::io::Coordinates;
use crate::selection::{Optimality, SelectionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Optimal,
    TimeLimited,
    Infeasible,
    Unbounded,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub selected: Vec<VertexId>,
    pub total_cost: Option<f64>,
    pub total_utility: Option<f64>,
    pub objective_bound: Option<f64>,
    pub solve_seconds: Option<f64>,
    pub selected_arcs: Vec<(VertexId, VertexId)>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub layout: BTreeMap<VertexId, (i64, i64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RunSummary {
    pub fn from_outcome(outcome: &SelectionOutcome, coordinates: Option<&Coordinates>) -> Self {
        let empty = |status, message: Option<String>, bound| Self {
            status,
            selected: Vec::new(),
            total_cost: None,
            total_utility: None,
            objective_bound: bound,
            solve_seconds: None,
            selected_arcs: Vec::new(),
            layout: BTreeMap::new(),
            message,
        };

        match outcome {
            SelectionOutcome::Selected(report) => {
                let (status, bound) = match report.optimality {
                    Optimality::Proven => (RunStatus::Optimal, None),
                    Optimality::TimeLimited { bound } => (RunStatus::TimeLimited, Some(bound)),
                };
                let selected: Vec<VertexId> = report.selection.vertices.iter().copied().collect();
                let layout = coordinates
                    .map(|coords| {
                        selected
                            .iter()
                            .filter_map(|v| coords.get(v).map(|&xy| (*v, xy)))
                            .collect()
                    })
                    .unwrap_or_default();
                Self {
                    status,
                    total_cost: Some(report.selection.total_cost),
                    total_utility: Some(report.selection.total_utility),
                    objective_bound: bound,
                    solve_seconds: Some(report.solve_time.as_secs_f64()),
                    selected_arcs: report.selected_arcs.iter().map(|a| (a.tail, a.head)).collect(),
                    layout,
                    selected,
                    message: None,
                }
            }
            SelectionOutcome::Infeasible(err) => {
                empty(RunStatus::Infeasible, Some(err.to_string()), None)
            }
            SelectionOutcome::Unbounded => empty(
                RunStatus::Unbounded,
                Some("Solver reported the model as unbounded".to_string()),
                None,
            ),
            SelectionOutcome::TimedOut(err) => {
                empty(RunStatus::TimedOut, Some(err.to_string()), Some(err.bound))
            }
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Status: {}", self.status);
        if let Some(message) = &self.message {
            let _ = writeln!(out, "{message}");
        }
        for v in &self.selected {
            match self.layout.get(v) {
                Some((x, y)) => {
                    let _ = writeln!(out, "Vertex {v} is selected at ({x}, {y})");
                }
                None => {
                    let _ = writeln!(out, "Vertex {v} is selected");
                }
            }
        }
        if !self.selected_arcs.is_empty() {
            let arcs = self
                .selected_arcs
                .iter()
                .map(|(tail, head)| format!("{tail}->{head}"))
                .join(", ");
            let _ = writeln!(out, "Selected arcs: {arcs}");
        }
        if let Some(cost) = self.total_cost {
            let _ = writeln!(out, "Total cost: {cost}");
        }
        if let Some(utility) = self.total_utility {
            let _ = writeln!(out, "Total utility: {utility}");
        }
        if let Some(bound) = self.objective_bound {
            let _ = writeln!(out, "Objective bound: {bound}");
        }
        if let Some(seconds) = self.solve_seconds {
            let _ = writeln!(out, "Computation time: {seconds:.3} seconds");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Arc;
    use crate::selection::{
        InfeasibleModelError, InfeasibleReason, Selection, SelectionReport,
    };
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn selected_outcome() -> SelectionOutcome {
        SelectionOutcome::Selected(SelectionReport {
            selection: Selection {
                vertices: BTreeSet::from([2, 3]),
                total_cost: 2.0,
                total_utility: 1.0,
            },
            optimality: Optimality::Proven,
            solve_time: Duration::from_millis(1500),
            selected_arcs: vec![Arc::new(2, 3), Arc::new(3, 2)],
        })
    }

    #[test]
    fn test_text_summary() {
        let coords = Coordinates::from([(2, (5, 7)), (9, (0, 0))]);
        let summary = RunSummary::from_outcome(&selected_outcome(), Some(&coords));
        let text = summary.render_text();

        assert!(text.starts_with("Status: optimal\n"));
        assert!(text.contains("Vertex 2 is selected at (5, 7)\n"));
        assert!(text.contains("Vertex 3 is selected\n"));
        assert!(text.contains("Selected arcs: 2->3, 3->2\n"));
        assert!(text.contains("Total cost: 2\n"));
        assert!(text.contains("Total utility: 1\n"));
        assert!(text.contains("Computation time: 1.500 seconds\n"));
        assert_eq!(summary.layout.len(), 1);
    }

    #[test]
    fn test_json_summary_for_infeasible() {
        let outcome = SelectionOutcome::Infeasible(InfeasibleModelError {
            reason: InfeasibleReason::SolverProvedInfeasible,
        });
        let summary = RunSummary::from_outcome(&outcome, None);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["status"], "infeasible");
        assert_eq!(json["selected"], serde_json::json!([]));
        assert!(json["message"].as_str().unwrap().starts_with("No feasible selection"));
        assert!(json.get("layout").is_none());
    }
}
