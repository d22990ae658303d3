//! Search graph nodes.

use stackplan_kernel::carrier::state::WorldState;
use stackplan_kernel::operators::action::Action;

/// Description carried by the root node.
pub const ROOT_DESCRIPTION: &str = "Initial state";

/// Index of a node in creation order. The root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: Self = Self(0);

    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One discovered state and its place in the search tree.
///
/// Every node except the root has exactly one parent (the node whose
/// expansion first produced its state) and the `action` that led there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Children in generation order.
    pub children: Vec<NodeId>,
    pub state: WorldState,
    /// Cached `state.canonical_key()`.
    pub state_key: String,
    pub is_goal: bool,
    pub action: Option<Action>,
    pub description: String,
    /// Number of actions from the root.
    pub depth: u32,
}

impl Node {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Export record; keys are sorted by the canonicaliser.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "action": self.action.as_ref().map(Action::to_json_value),
            "children": self.children.iter().map(|c| c.index()).collect::<Vec<_>>(),
            "depth": self.depth,
            "description": self.description,
            "id": self.id.index(),
            "is_goal": self.is_goal,
            "parent": self.parent.map(NodeId::index),
            "state": self.state.to_json_value(),
            "state_key": self.state_key,
        })
    }
}
