//! `SearchGraph`: every node discovered by one run, in creation order, plus
//! run metadata.
//!
//! Node ids are indices into the node list, so `nodes()[i].id == NodeId(i)`
//! always holds. A parent is always created before its children. The visited
//! index of the run comes along, so a state can be found by its canonical key.

use std::collections::{BTreeMap, VecDeque};

use stackplan_kernel::proof::canon::{canonical_json_bytes, CanonError};
use stackplan_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::error::SearchError;
use crate::node::{Node, NodeId};
use crate::policy::SearchPolicy;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Every reachable state (within the depth limit) was discovered.
    FrontierExhausted,
    /// The node budget was reached; the frontier may still hold nodes.
    NodeBudgetExceeded,
    /// `stop_at_first_goal` was set and this node satisfied the goal.
    FirstGoalReached { node_id: NodeId },
}

impl TerminationReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrontierExhausted => "frontier_exhausted",
            Self::NodeBudgetExceeded => "node_budget_exceeded",
            Self::FirstGoalReached { .. } => "first_goal_reached",
        }
    }

    #[must_use]
    pub fn to_json_value(self) -> serde_json::Value {
        match self {
            Self::FirstGoalReached { node_id } => serde_json::json!({
                "node_id": node_id.index(),
                "reason": self.as_str(),
            }),
            _ => serde_json::json!({ "reason": self.as_str() }),
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters and configuration of the run that built a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMetadata {
    pub termination: TerminationReason,
    pub policy: SearchPolicy,
    /// Nodes popped and expanded.
    pub expansions: u64,
    /// Successors dropped because their key was already visited.
    pub duplicates_suppressed: u64,
    /// Nodes popped but not expanded because they sat at `max_depth`.
    pub depth_cutoffs: u64,
    /// Goal nodes popped but not expanded.
    pub goals_not_expanded: u64,
    pub frontier_high_water: usize,
    /// Size of the visited index when the run ended.
    pub visited_states: usize,
}

impl SearchMetadata {
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "depth_cutoffs": self.depth_cutoffs,
            "duplicates_suppressed": self.duplicates_suppressed,
            "expansions": self.expansions,
            "frontier_high_water": self.frontier_high_water,
            "goals_not_expanded": self.goals_not_expanded,
            "policy": self.policy.to_json_value(),
            "termination": self.termination.to_json_value(),
            "visited_states": self.visited_states,
        })
    }
}

/// Summary statistics over a finished graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub goal_nodes: usize,
    pub max_depth: u32,
    /// Node count per depth.
    pub depth_distribution: BTreeMap<u32, usize>,
    pub total_visited_states: usize,
}

impl GraphStats {
    /// JSON form. Depths become string keys.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let distribution: serde_json::Map<String, serde_json::Value> = self
            .depth_distribution
            .iter()
            .map(|(depth, count)| (depth.to_string(), serde_json::json!(count)))
            .collect();
        serde_json::json!({
            "depth_distribution": distribution,
            "goal_nodes": self.goal_nodes,
            "max_depth": self.max_depth,
            "total_nodes": self.total_nodes,
            "total_visited_states": self.total_visited_states,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchGraph {
    nodes: Vec<Node>,
    by_key: BTreeMap<String, NodeId>,
    metadata: SearchMetadata,
}

impl SearchGraph {
    pub(crate) fn new(
        nodes: Vec<Node>,
        by_key: BTreeMap<String, NodeId>,
        metadata: SearchMetadata,
    ) -> Self {
        Self {
            nodes,
            by_key,
            metadata,
        }
    }

    /// Look up a node.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnknownNode`] if `id` was never created.
    pub fn get(&self, id: NodeId) -> Result<&Node, SearchError> {
        self.nodes
            .get(id.index())
            .ok_or(SearchError::UnknownNode { id })
    }

    /// The node whose state has canonical key `key`.
    #[must_use]
    pub fn node_by_key(&self, key: &str) -> Option<&Node> {
        self.by_key
            .get(key)
            .and_then(|id| self.nodes.get(id.index()))
    }

    /// Nodes at exactly `depth`, in creation order.
    pub fn nodes_at_depth(&self, depth: u32) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.depth == depth)
    }

    /// All nodes in creation order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn metadata(&self) -> &SearchMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn termination(&self) -> TerminationReason {
        self.metadata.termination
    }

    /// Goal nodes in creation order (so by non-decreasing depth).
    pub fn goal_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_goal)
    }

    #[must_use]
    pub fn is_goal_reached(&self) -> bool {
        self.nodes.iter().any(|n| n.is_goal)
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut depth_distribution = BTreeMap::new();
        for node in &self.nodes {
            *depth_distribution.entry(node.depth).or_insert(0) += 1;
        }
        GraphStats {
            total_nodes: self.nodes.len(),
            goal_nodes: self.goal_nodes().count(),
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
            depth_distribution,
            total_visited_states: self.metadata.visited_states,
        }
    }

    /// Every node below `id`, breadth-first. `id` itself is excluded.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnknownNode`] if `id` (or a recorded child) is
    /// not in the graph.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, SearchError> {
        let mut out = Vec::new();
        let mut worklist: VecDeque<NodeId> = self.get(id)?.children.iter().copied().collect();
        while let Some(next) = worklist.pop_front() {
            worklist.extend(self.get(next)?.children.iter().copied());
            out.push(next);
        }
        Ok(out)
    }

    /// Export form: `{"metadata": {...}, "nodes": [...]}`.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "metadata": self.metadata.to_json_value(),
            "nodes": self.nodes.iter().map(Node::to_json_value).collect::<Vec<_>>(),
        })
    }

    /// Canonical JSON bytes of [`SearchGraph::to_json_value`].
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if the export contains a non-integer number.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// Content hash of the canonical export.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`] from the export.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        Ok(canonical_hash(
            HashDomain::SearchGraph,
            &self.to_canonical_json_bytes()?,
        ))
    }
}
