//! Random small instances checked against exhaustive enumeration.

use proptest::prelude::*;
use std::collections::BTreeSet;

use subgraph_select::domain::{GraphModel, InstanceData, VertexId};
use subgraph_select::optimizer::GoodLpBackend;
use subgraph_select::selection::{
    unreachable_from_root, SelectionOutcome, SelectorOptions, SubgraphSelector,
};

fn instance() -> impl Strategy<Value = InstanceData> {
    (2usize..=5).prop_flat_map(|n| {
        let pairs: Vec<(VertexId, VertexId)> = (1..=n)
            .flat_map(|i| (1..=n).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();
        let max_arcs = pairs.len();
        (
            Just(n),
            proptest::sample::subsequence(pairs, 0..=max_arcs),
            proptest::collection::vec(0u8..3, n),
            proptest::collection::vec(0u8..5, n),
            proptest::sample::subsequence((1..=n).collect::<Vec<_>>(), 1..=2),
            0u8..8,
        )
            .prop_map(|(n, arcs, costs, utilities, terminals, budget)| {
                InstanceData::from_edges(
                    n,
                    arcs,
                    (1..=n).zip(costs.into_iter().map(f64::from)).collect(),
                    (1..=n).zip(utilities.into_iter().map(f64::from)).collect(),
                    terminals,
                    f64::from(budget),
                )
            })
    })
}

/// Best utility over every vertex subset that satisfies the constraints
fn brute_force(graph: &GraphModel) -> Option<f64> {
    let n = graph.n();
    (1u32..(1 << n))
        .map(|mask| -> BTreeSet<VertexId> {
            (1..=n).filter(|v| mask & (1 << (v - 1)) != 0).collect()
        })
        .filter(|set| graph.terminals().iter().all(|t| set.contains(t)))
        .filter(|set| graph.cost_of(set) <= graph.budget() + 1e-9)
        .filter(|set| unreachable_from_root(graph, set).is_empty())
        .map(|set| graph.utility_of(&set))
        .fold(None, |best: Option<f64>, u| Some(best.map_or(u, |b| b.max(u))))
}

fn solve(graph: &GraphModel) -> SelectionOutcome {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let selector = SubgraphSelector::new(
        Box::new(GoodLpBackend::new()),
        SelectorOptions {
            presolve_screen: false,
            ..SelectorOptions::default()
        },
    );
    runtime.block_on(selector.select(graph)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_solver_matches_enumeration(data in instance()) {
        let graph = GraphModel::from_instance(&data).unwrap();
        let expected = brute_force(&graph);

        match (solve(&graph), expected) {
            (SelectionOutcome::Selected(report), Some(best)) => {
                let selection = &report.selection;
                prop_assert!(report.is_optimal());
                prop_assert!((selection.total_utility - best).abs() < 1e-6);
                prop_assert!(graph.terminals().iter().all(|&t| selection.contains(t)));
                prop_assert!(selection.total_cost <= graph.budget() + 1e-6);
                prop_assert!(unreachable_from_root(&graph, &selection.vertices).is_empty());
                prop_assert_eq!(graph.utility_of(&selection.vertices), selection.total_utility);
            }
            (SelectionOutcome::Infeasible(_), None) => {}
            (outcome, expected) => {
                prop_assert!(false, "solver gave {:?}, enumeration gave {:?}", outcome, expected);
            }
        }
    }
}
