//! End-to-end selections solved with the bundled MILP engine.

use rstest::rstest;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use subgraph_select::domain::{GraphModel, InstanceData, VertexId};
use subgraph_select::optimizer::{BigM, GoodLpBackend};
use subgraph_select::selection::{
    unreachable_from_root, InfeasibleReason, Optimality, SelectionOutcome, SelectorOptions,
    SubgraphSelector,
};

/// Undirected path 1-2-...-n given as arcs in both directions
fn path_edges(n: usize) -> Vec<(VertexId, VertexId)> {
    (1..n).flat_map(|v| [(v, v + 1), (v + 1, v)]).collect()
}

fn weights(values: &[f64]) -> BTreeMap<VertexId, f64> {
    values.iter().enumerate().map(|(i, &w)| (i + 1, w)).collect()
}

/// Path of four unit-cost vertices, terminal 3
fn path_instance(budget: f64) -> InstanceData {
    InstanceData::from_edges(
        4,
        path_edges(4),
        weights(&[1.0; 4]),
        weights(&[0.02, 0.1, 0.9, 0.05]),
        vec![3],
        budget,
    )
}

fn selector(options: SelectorOptions) -> SubgraphSelector {
    SubgraphSelector::new(Box::new(GoodLpBackend::new()), options)
}

async fn selected(data: &InstanceData, options: SelectorOptions) -> (BTreeSet<VertexId>, f64) {
    let outcome = selector(options).select_instance(data).await.unwrap();
    let report = outcome.report().expect("expected a selection").clone();
    assert!(report.is_optimal());
    (report.selection.vertices, report.selection.total_utility)
}

#[rstest]
#[case::two_vertices(2.0, &[2, 3], 1.0)]
#[case::terminal_only(1.0, &[3], 0.9)]
#[case::whole_path(4.0, &[1, 2, 3, 4], 1.07)]
#[tokio::test]
async fn test_path_selection_by_budget(
    #[case] budget: f64,
    #[case] expected: &[VertexId],
    #[case] utility: f64,
) {
    let (vertices, total) = selected(&path_instance(budget), SelectorOptions::default()).await;
    assert_eq!(vertices, expected.iter().copied().collect::<BTreeSet<_>>());
    assert!((total - utility).abs() < 1e-6);
}

#[rstest]
#[case::vertex_count(BigM::VertexCount)]
#[case::budget_tightened(BigM::BudgetTightened)]
#[tokio::test]
async fn test_big_m_choice_does_not_change_optimum(#[case] big_m: BigM) {
    let options = SelectorOptions {
        big_m,
        ..SelectorOptions::default()
    };
    let (vertices, total) = selected(&path_instance(2.0), options).await;
    assert_eq!(vertices, BTreeSet::from([2, 3]));
    assert!((total - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_budget_below_terminal_cost_is_screened() {
    let outcome = selector(SelectorOptions::default())
        .select_instance(&path_instance(0.5))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        SelectionOutcome::Infeasible(ref err)
            if matches!(err.reason, InfeasibleReason::TerminalsExceedBudget { .. })
    ));
}

#[tokio::test]
async fn test_budget_below_terminal_cost_is_proved_by_solver() {
    let options = SelectorOptions {
        presolve_screen: false,
        ..SelectorOptions::default()
    };
    let outcome = selector(options).select_instance(&path_instance(0.5)).await.unwrap();
    assert!(matches!(
        outcome,
        SelectionOutcome::Infeasible(ref err)
            if err.reason == InfeasibleReason::SolverProvedInfeasible
    ));
}

#[rstest]
#[case::enough_for_the_path(4.0, true)]
#[case::cannot_bridge(3.0, false)]
#[tokio::test]
async fn test_two_terminals_at_path_ends(#[case] budget: f64, #[case] feasible: bool) {
    let data = InstanceData::from_edges(
        4,
        path_edges(4),
        weights(&[1.0; 4]),
        weights(&[0.0; 4]),
        vec![1, 4],
        budget,
    );
    let outcome = selector(SelectorOptions::default())
        .select_instance(&data)
        .await
        .unwrap();

    match outcome {
        SelectionOutcome::Selected(report) => {
            assert!(feasible);
            assert_eq!(report.selection.vertices, BTreeSet::from([1, 2, 3, 4]));
        }
        SelectionOutcome::Infeasible(err) => {
            assert!(!feasible);
            assert_eq!(err.reason, InfeasibleReason::SolverProvedInfeasible);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn test_expensive_cut_vertex_blocks_valuable_leaf() {
    // 1-2-3-4 plus isolated 5; reaching 4 needs the unaffordable vertex 2
    let data = InstanceData::from_edges(
        5,
        path_edges(4),
        weights(&[1.0, 5.0, 1.0, 1.0, 1.0]),
        weights(&[0.0, 0.0, 0.0, 100.0, 50.0]),
        vec![1],
        3.0,
    );
    let (vertices, total) = selected(&data, SelectorOptions::default()).await;
    assert_eq!(vertices, BTreeSet::from([1]));
    assert!(total.abs() < 1e-9);
}

#[tokio::test]
async fn test_directed_arcs_limit_reach() {
    // only 1 -> 2 -> 3, the terminal is 3 so nothing upstream is reachable
    let data = InstanceData::from_edges(
        3,
        vec![(1, 2), (2, 3)],
        weights(&[1.0; 3]),
        weights(&[5.0, 5.0, 1.0]),
        vec![3],
        3.0,
    );
    let (vertices, _) = selected(&data, SelectorOptions::default()).await;
    assert_eq!(vertices, BTreeSet::from([3]));
}

#[tokio::test]
async fn test_selected_arcs_form_induced_subgraph() {
    let data = path_instance(2.0);
    let graph = GraphModel::from_instance(&data).unwrap();
    let outcome = selector(SelectorOptions::default()).select(&graph).await.unwrap();
    let report = outcome.report().unwrap();

    for arc in &report.selected_arcs {
        assert!(report.selection.contains(arc.tail));
        assert!(report.selection.contains(arc.head));
    }
    assert_eq!(report.selected_arcs.len(), 2);
}

/// `side` x `side` grid of unit-cost vertices with uneven utilities, terminal 1
fn grid_instance(side: usize) -> InstanceData {
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
    let utility: Vec<f64> = (1..=n).map(|v| ((v * 7) % 11) as f64 / 10.0 + 0.01).collect();
    InstanceData::from_edges(
        n,
        edges,
        weights(&vec![1.0; n]),
        weights(&utility),
        vec![1],
        (n / 3) as f64,
    )
}

#[tokio::test]
async fn test_time_limit_returns_promptly_with_checked_result() {
    let data = grid_instance(9);
    let graph = GraphModel::from_instance(&data).unwrap();
    let options = SelectorOptions {
        time_limit: Some(Duration::from_millis(300)),
        ..SelectorOptions::default()
    };

    let started = Instant::now();
    let outcome = selector(options).select(&graph).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(20));

    match outcome {
        SelectionOutcome::Selected(report) => {
            if let Optimality::TimeLimited { bound } = report.optimality {
                assert!(report.selection.total_utility <= bound + 1e-6);
            }
            assert!(report.selection.contains(1));
            assert!(report.selection.total_cost <= graph.budget() + 1e-6);
            assert!(unreachable_from_root(&graph, &report.selection.vertices).is_empty());
        }
        SelectionOutcome::TimedOut(err) => assert!(err.bound > 0.0),
        other => panic!("unexpected outcome {other:?}"),
    }
}
