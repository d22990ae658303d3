//! Search policy: budgets and goal handling.

use crate::error::SearchError;

/// Run configuration for [`crate::search::SearchEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPolicy {
    /// Maximum number of nodes in the graph. `0` means unbounded.
    pub max_nodes: usize,
    /// Nodes at this depth are not expanded. `None` means unbounded.
    pub max_depth: Option<u32>,
    /// End the run as soon as a goal node is created.
    pub stop_at_first_goal: bool,
    /// Expand goal nodes like any other node.
    pub expand_goal_nodes: bool,
}

impl SearchPolicy {
    /// Policy with a node budget and defaults elsewhere.
    #[must_use]
    pub fn with_max_nodes(max_nodes: usize) -> Self {
        Self {
            max_nodes,
            ..Self::default()
        }
    }

    /// `None` when the node budget is unbounded.
    #[must_use]
    pub fn node_budget(&self) -> Option<usize> {
        (self.max_nodes > 0).then_some(self.max_nodes)
    }

    /// Pre-flight check.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] when `stop_at_first_goal` and
    /// `expand_goal_nodes` are both set: the run ends before any goal could
    /// be expanded.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.stop_at_first_goal && self.expand_goal_nodes {
            return Err(SearchError::InvalidPolicy {
                detail: "expand_goal_nodes has no effect with stop_at_first_goal".into(),
            });
        }
        Ok(())
    }

    /// Metadata form recorded in exports and reports.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "expand_goal_nodes": self.expand_goal_nodes,
            "max_depth": self.max_depth,
            "max_nodes": self.max_nodes,
            "stop_at_first_goal": self.stop_at_first_goal,
        })
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            max_nodes: 0,
            max_depth: None,
            stop_at_first_goal: false,
            expand_goal_nodes: false,
        }
    }
}
