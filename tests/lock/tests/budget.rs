//! Node budget and depth cap enforcement.

use stackplan_harness::worlds::load_builtin;
use stackplan_search::graph::TerminationReason;
use stackplan_search::policy::SearchPolicy;
use stackplan_search::search::SearchEngine;

fn full_size(world: &str) -> usize {
    let scenario = load_builtin(world).unwrap();
    let engine = SearchEngine::new(&scenario.roster, scenario.policy.clone());
    engine
        .run(scenario.initial.clone(), &scenario.goal)
        .unwrap()
        .graph
        .len()
}

#[test]
fn graph_never_exceeds_the_budget() {
    for world in ["two_blocks", "tower_reversal", "ring_and_peg"] {
        let full = full_size(world);
        let mut scenario = load_builtin(world).unwrap();
        for budget in 1..=full + 2 {
            scenario.policy.max_nodes = budget;
            let engine = SearchEngine::new(&scenario.roster, scenario.policy.clone());
            let outcome = engine.run(scenario.initial.clone(), &scenario.goal).unwrap();
            let nodes = outcome.graph.len();
            assert!(nodes <= budget, "{world}: {nodes} nodes under budget {budget}");
            match outcome.termination() {
                TerminationReason::NodeBudgetExceeded => {
                    assert_eq!(nodes, budget, "{world}: budget {budget}");
                    assert!(!outcome.pending.is_empty() || nodes < full);
                }
                TerminationReason::FrontierExhausted => {
                    assert_eq!(nodes, full, "{world}: budget {budget}");
                    assert!(outcome.pending.is_empty());
                }
                other => panic!("{world}: unexpected termination {other}"),
            }
        }
    }
}

#[test]
fn budget_above_graph_size_changes_nothing() {
    let scenario = load_builtin("tower_reversal").unwrap();
    let unbounded = SearchEngine::new(&scenario.roster, SearchPolicy::default())
        .run(scenario.initial.clone(), &scenario.goal)
        .unwrap();
    let bounded = SearchEngine::new(
        &scenario.roster,
        SearchPolicy::with_max_nodes(unbounded.graph.len() + 1),
    )
    .run(scenario.initial.clone(), &scenario.goal)
    .unwrap();
    assert_eq!(bounded.termination(), TerminationReason::FrontierExhausted);
    assert_eq!(
        bounded.graph.to_json_value()["nodes"],
        unbounded.graph.to_json_value()["nodes"]
    );
}

#[test]
fn budgeted_prefix_matches_the_unbounded_graph() {
    let scenario = load_builtin("tower_reversal").unwrap();
    let unbounded = SearchEngine::new(&scenario.roster, SearchPolicy::default())
        .run(scenario.initial.clone(), &scenario.goal)
        .unwrap();
    let budgeted = SearchEngine::new(&scenario.roster, SearchPolicy::with_max_nodes(5))
        .run(scenario.initial.clone(), &scenario.goal)
        .unwrap();
    for (a, b) in budgeted.graph.nodes().iter().zip(unbounded.graph.nodes()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.state_key, b.state_key);
        assert_eq!(a.parent, b.parent);
        assert_eq!(a.depth, b.depth);
    }
}

#[test]
fn depth_cap_bounds_every_node() {
    let scenario = load_builtin("ring_and_peg").unwrap();
    for cap in 0..=3 {
        let policy = SearchPolicy {
            max_depth: Some(cap),
            ..SearchPolicy::default()
        };
        let outcome = SearchEngine::new(&scenario.roster, policy)
            .run(scenario.initial.clone(), &scenario.goal)
            .unwrap();
        assert!(outcome.graph.nodes().iter().all(|n| n.depth <= cap));
        assert_eq!(outcome.termination(), TerminationReason::FrontierExhausted);
        // The plan needs three actions.
        assert_eq!(outcome.graph.is_goal_reached(), cap >= 3, "cap {cap}");
    }
}

#[test]
fn stop_at_first_goal_ends_on_the_shallowest_goal() {
    let mut scenario = load_builtin("tower_reversal").unwrap();
    scenario.policy.stop_at_first_goal = true;
    let outcome = SearchEngine::new(&scenario.roster, scenario.policy.clone())
        .run(scenario.initial.clone(), &scenario.goal)
        .unwrap();
    let TerminationReason::FirstGoalReached { node_id } = outcome.termination() else {
        panic!("expected FirstGoalReached, got {}", outcome.termination());
    };
    assert_eq!(node_id.index(), outcome.graph.len() - 1);
    assert_eq!(outcome.graph.get(node_id).unwrap().depth, 3);
}
