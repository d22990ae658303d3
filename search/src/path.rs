//! Plan extraction: walk parent links from a node back to the root.

use stackplan_kernel::operators::action::Action;

use crate::error::SearchError;
use crate::graph::SearchGraph;
use crate::node::{Node, NodeId};

/// Nodes from the root to `id`, root first.
///
/// # Errors
///
/// Returns [`SearchError::UnknownNode`] if `id` is not in the graph.
pub fn path_to(graph: &SearchGraph, id: NodeId) -> Result<Vec<&Node>, SearchError> {
    let mut path = Vec::new();
    let mut current = Some(id);
    while let Some(step) = current {
        let node = graph.get(step)?;
        path.push(node);
        current = node.parent;
    }
    path.reverse();
    Ok(path)
}

/// The actions along a path, skipping the root (which has none).
#[must_use]
pub fn actions_of(path: &[&Node]) -> Vec<Action> {
    path.iter().filter_map(|node| node.action.clone()).collect()
}

/// Shortcut for `actions_of(&path_to(graph, id)?)`.
///
/// # Errors
///
/// Returns [`SearchError::UnknownNode`] if `id` is not in the graph.
pub fn plan_to(graph: &SearchGraph, id: NodeId) -> Result<Vec<Action>, SearchError> {
    Ok(actions_of(&path_to(graph, id)?))
}

/// The shallowest goal node, lowest id among equals.
#[must_use]
pub fn best_goal(graph: &SearchGraph) -> Option<NodeId> {
    graph
        .goal_nodes()
        .min_by_key(|node| (node.depth, node.id))
        .map(|node| node.id)
}

/// A plan ending at one goal node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalPath {
    pub goal: NodeId,
    pub depth: u32,
    pub actions: Vec<Action>,
}

/// Plans for every goal node, in creation order.
///
/// # Errors
///
/// Returns [`SearchError::UnknownNode`] if a parent link is broken.
pub fn all_goal_paths(graph: &SearchGraph) -> Result<Vec<GoalPath>, SearchError> {
    graph
        .goal_nodes()
        .map(|node| {
            Ok(GoalPath {
                goal: node.id,
                depth: node.depth,
                actions: plan_to(graph, node.id)?,
            })
        })
        .collect()
}
