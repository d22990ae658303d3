//! Structural invariants of search graphs, checked on every built-in world.

use std::collections::BTreeSet;

use stackplan_harness::scenario::Scenario;
use stackplan_harness::worlds::builtin_worlds;
use stackplan_kernel::operators::apply::apply;
use stackplan_kernel::operators::legal::legal_action_list;
use stackplan_kernel::proof::replay::replay_plan;
use stackplan_search::graph::SearchGraph;
use stackplan_search::path::{best_goal, path_to, plan_to};
use stackplan_search::search::SearchEngine;

fn searched() -> Vec<(Scenario, SearchGraph)> {
    builtin_worlds()
        .into_iter()
        .map(|world| {
            let scenario = world.scenario().unwrap();
            let engine = SearchEngine::new(&scenario.roster, scenario.policy.clone());
            let graph = engine
                .run(scenario.initial.clone(), &scenario.goal)
                .unwrap()
                .graph;
            (scenario, graph)
        })
        .collect()
}

#[test]
fn state_keys_are_unique() {
    for (scenario, graph) in searched() {
        let keys: BTreeSet<&str> = graph.nodes().iter().map(|n| n.state_key.as_str()).collect();
        assert_eq!(keys.len(), graph.len(), "{}", scenario.name);
        assert_eq!(graph.metadata().visited_states, graph.len(), "{}", scenario.name);
    }
}

#[test]
fn key_index_resolves_every_state_to_its_node() {
    for (scenario, graph) in searched() {
        for node in graph.nodes() {
            let found = graph.node_by_key(&node.state_key).unwrap();
            assert_eq!(found.id, node.id, "{}", scenario.name);
        }
        let layered: usize = (0..=graph.stats().max_depth)
            .map(|depth| graph.nodes_at_depth(depth).count())
            .sum();
        assert_eq!(layered, graph.len(), "{}", scenario.name);
    }
}

#[test]
fn ids_follow_creation_order_and_depth_never_decreases() {
    for (scenario, graph) in searched() {
        let mut previous_depth = 0;
        for (index, node) in graph.nodes().iter().enumerate() {
            assert_eq!(node.id.index(), index, "{}", scenario.name);
            assert!(node.depth >= previous_depth, "{}: node {}", scenario.name, node.id);
            previous_depth = node.depth;
        }
    }
}

#[test]
fn parent_walk_reaches_root_in_depth_steps() {
    for (scenario, graph) in searched() {
        for node in graph.nodes() {
            let path = path_to(&graph, node.id).unwrap();
            assert_eq!(path.len(), node.depth as usize + 1, "{}", scenario.name);
            assert!(path[0].is_root());
            for pair in path.windows(2) {
                assert_eq!(pair[1].parent, Some(pair[0].id));
                assert_eq!(pair[1].depth, pair[0].depth + 1);
                assert!(pair[0].children.contains(&pair[1].id));
            }
        }
    }
}

#[test]
fn child_states_are_the_result_of_their_action() {
    for (scenario, graph) in searched() {
        for node in graph.nodes().iter().filter(|n| !n.is_root()) {
            let parent = graph.get(node.parent.unwrap()).unwrap();
            let action = node.action.as_ref().unwrap();
            let next = apply(&scenario.roster, &parent.state, action).unwrap();
            assert_eq!(next.canonical_key(), node.state_key, "{}", scenario.name);
            assert_eq!(node.state.canonical_key(), node.state_key);
        }
    }
}

#[test]
fn replaying_a_path_reproduces_the_stored_state() {
    for (scenario, graph) in searched() {
        for node in graph.nodes() {
            let plan = plan_to(&graph, node.id).unwrap();
            let end = replay_plan(&scenario.roster, &scenario.initial, &plan).unwrap();
            assert_eq!(end, node.state, "{}: node {}", scenario.name, node.id);
        }
    }
}

#[test]
fn first_goal_has_minimum_depth() {
    for (scenario, graph) in searched() {
        let first = graph.goal_nodes().next().unwrap();
        let shallowest = graph.goal_nodes().map(|n| n.depth).min().unwrap();
        assert_eq!(first.depth, shallowest, "{}", scenario.name);
        assert_eq!(best_goal(&graph), Some(first.id));
    }
}

#[test]
fn expanded_nodes_have_every_successor_in_the_graph() {
    for (scenario, graph) in searched() {
        let keys: BTreeSet<&str> = graph.nodes().iter().map(|n| n.state_key.as_str()).collect();
        let limit = scenario.policy.max_depth.unwrap_or(u32::MAX);
        for node in graph.nodes().iter().filter(|n| !n.is_goal && n.depth < limit) {
            for action in legal_action_list(&scenario.roster, &node.state).unwrap() {
                let next = apply(&scenario.roster, &node.state, &action).unwrap();
                assert!(
                    keys.contains(next.canonical_key().as_str()),
                    "{}: successor of node {} via {action} missing",
                    scenario.name,
                    node.id
                );
            }
        }
    }
}

#[test]
fn apply_leaves_graph_states_untouched() {
    for (scenario, graph) in searched() {
        for node in graph.nodes() {
            for action in legal_action_list(&scenario.roster, &node.state).unwrap() {
                let _ = apply(&scenario.roster, &node.state, &action).unwrap();
            }
            assert_eq!(node.state.canonical_key(), node.state_key);
        }
    }
}

#[test]
fn no_state_has_a_support_cycle() {
    for (scenario, graph) in searched() {
        assert!(
            graph.nodes().iter().all(|n| !n.state.clashes()),
            "{}",
            scenario.name
        );
    }
}

#[test]
fn descendants_cover_the_whole_graph_from_the_root() {
    for (scenario, graph) in searched() {
        let below = graph.descendants(stackplan_search::node::NodeId::ROOT).unwrap();
        assert_eq!(below.len() + 1, graph.len(), "{}", scenario.name);
    }
}
