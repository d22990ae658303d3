//! End-to-end lock tests on the two-object world: A and B side by side on
//! the table, goal B on A.

use stackplan_harness::runner::{run_scenario, verify_bundle_replay, ReplayCheck};
use stackplan_harness::worlds::load_builtin;
use stackplan_kernel::carrier::roster::ObjectId;
use stackplan_kernel::carrier::state::Support;
use stackplan_kernel::operators::action::Action;
use stackplan_kernel::operators::legal::legal_action_list;
use stackplan_search::graph::TerminationReason;
use stackplan_search::node::NodeId;
use stackplan_search::path::{actions_of, path_to};
use stackplan_search::search::SearchEngine;

fn on(raw: u32) -> Support {
    Support::On(ObjectId::new(raw))
}

#[test]
fn root_offers_four_actions_in_generation_order() {
    let scenario = load_builtin("two_blocks").unwrap();
    let actions = legal_action_list(&scenario.roster, &scenario.initial).unwrap();
    assert_eq!(
        actions,
        vec![
            Action::move_to(1, on(2)),
            Action::lay_down(1),
            Action::move_to(2, on(1)),
            Action::lay_down(2),
        ]
    );
}

#[test]
fn exactly_one_goal_at_depth_one() {
    let scenario = load_builtin("two_blocks").unwrap();
    let engine = SearchEngine::new(&scenario.roster, scenario.policy.clone());
    let outcome = engine.run(scenario.initial.clone(), &scenario.goal).unwrap();
    let graph = &outcome.graph;

    let root = graph.root().unwrap();
    assert_eq!(root.children.len(), 4);
    assert_eq!(root.description, "Initial state");

    let goals: Vec<_> = graph.goal_nodes().collect();
    assert_eq!(goals.len(), 1);
    let goal = goals[0];
    assert_eq!(goal.depth, 1);
    assert_eq!(goal.id, NodeId::new(3));
    assert_eq!(goal.state_key, "1:0:false|2:1:false");
    assert_eq!(goal.state.support_of(ObjectId::new(1)).unwrap(), &Support::Table);
    assert!(!goal.state.is_lying(ObjectId::new(1)).unwrap());
    assert_eq!(goal.state.support_of(ObjectId::new(2)).unwrap(), &on(1));
    assert!(!goal.state.is_lying(ObjectId::new(2)).unwrap());

    let plan = actions_of(&path_to(graph, goal.id).unwrap());
    assert_eq!(plan, vec![Action::move_to(2, on(1))]);
    assert_eq!(outcome.termination(), TerminationReason::FrontierExhausted);
}

#[test]
fn node_budget_of_one_keeps_only_the_root() {
    let mut scenario = load_builtin("two_blocks").unwrap();
    scenario.policy.max_nodes = 1;
    let engine = SearchEngine::new(&scenario.roster, scenario.policy.clone());
    let outcome = engine.run(scenario.initial.clone(), &scenario.goal).unwrap();

    assert_eq!(outcome.graph.len(), 1);
    assert_eq!(outcome.termination(), TerminationReason::NodeBudgetExceeded);
    assert_eq!(outcome.pending, vec![NodeId::ROOT]);
    assert!(!outcome.graph.is_goal_reached());
}

#[test]
fn harness_run_matches_engine_run() {
    let scenario = load_builtin("two_blocks").unwrap();
    let result = run_scenario(&scenario).unwrap();
    assert_eq!(result.plan, vec![Action::move_to(2, on(1))]);
    assert_eq!(result.outcome.graph.len(), 8);
    assert_eq!(
        verify_bundle_replay(&result.bundle).unwrap(),
        ReplayCheck::Verified { steps: 1 }
    );
}

#[test]
fn descriptions_use_roster_names() {
    let scenario = load_builtin("two_blocks").unwrap();
    let result = run_scenario(&scenario).unwrap();
    let descriptions: Vec<&str> = result
        .outcome
        .graph
        .nodes()
        .iter()
        .skip(1)
        .take(4)
        .map(|n| n.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec!["Move A onto B", "Lay down A", "Move B onto A", "Lay down B"]
    );
}
