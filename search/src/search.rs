//! Breadth-first search over world states.
//!
//! # Loop
//!
//! 1. Create the root (id 0, depth 0, `"Initial state"`) and queue it.
//! 2. Until the frontier is empty: stop if the node budget is spent, pop the
//!    oldest node, skip it if it is a goal (unless goal expansion is on) or
//!    sits at `max_depth`, otherwise generate its legal actions in order.
//! 3. For each action: apply it, drop the successor if its key is already
//!    visited, stop if the node budget is spent, else create a child node
//!    and queue it.
//!
//! FIFO order plus first-discovery-wins makes every node's depth the
//! shortest distance from the root to its state.

use stackplan_kernel::carrier::roster::Roster;
use stackplan_kernel::carrier::state::WorldState;
use stackplan_kernel::operators::action::Action;
use stackplan_kernel::operators::apply::apply;
use stackplan_kernel::operators::legal::legal_actions;
use tracing::{debug, info};

use crate::contract::GoalPredicate;
use crate::error::SearchError;
use crate::frontier::FifoFrontier;
use crate::graph::{SearchGraph, SearchMetadata, TerminationReason};
use crate::node::{Node, NodeId, ROOT_DESCRIPTION};
use crate::policy::SearchPolicy;

/// Result of one run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub graph: SearchGraph,
    /// Nodes still queued when the run stopped, oldest first.
    pub pending: Vec<NodeId>,
}

impl SearchOutcome {
    #[must_use]
    pub fn termination(&self) -> TerminationReason {
        self.graph.termination()
    }
}

/// A search engine bound to one roster and policy. Each [`SearchEngine::run`]
/// owns a fresh graph, visited index and frontier.
#[derive(Debug, Clone)]
pub struct SearchEngine<'a> {
    roster: &'a Roster,
    policy: SearchPolicy,
}

impl<'a> SearchEngine<'a> {
    #[must_use]
    pub fn new(roster: &'a Roster, policy: SearchPolicy) -> Self {
        Self { roster, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    /// Explore from `initial`, marking nodes that satisfy `goal`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidPolicy`] before any node is created
    /// - [`SearchError::World`] if `initial` does not track exactly the
    ///   roster's objects (checked before the root exists), or if the world
    ///   model rejects a generated action; the partial graph is discarded
    pub fn run(
        &self,
        initial: WorldState,
        goal: &dyn GoalPredicate,
    ) -> Result<SearchOutcome, SearchError> {
        self.policy.validate()?;
        initial.check_roster(self.roster)?;
        let mut run = Run::new(self.roster, &self.policy, goal);
        let termination = run.execute(initial)?;
        info!(
            termination = %termination,
            nodes = run.nodes.len(),
            expansions = run.expansions,
            goals = run.nodes.iter().filter(|n| n.is_goal).count(),
            "search finished"
        );
        Ok(run.finish(termination))
    }
}

/// Mutable state of a single run.
struct Run<'r> {
    roster: &'r Roster,
    policy: &'r SearchPolicy,
    goal: &'r dyn GoalPredicate,
    nodes: Vec<Node>,
    frontier: FifoFrontier,
    expansions: u64,
    duplicates_suppressed: u64,
    depth_cutoffs: u64,
    goals_not_expanded: u64,
}

impl<'r> Run<'r> {
    fn new(roster: &'r Roster, policy: &'r SearchPolicy, goal: &'r dyn GoalPredicate) -> Self {
        Self {
            roster,
            policy,
            goal,
            nodes: Vec::new(),
            frontier: FifoFrontier::new(),
            expansions: 0,
            duplicates_suppressed: 0,
            depth_cutoffs: 0,
            goals_not_expanded: 0,
        }
    }

    fn budget_spent(&self) -> bool {
        self.policy
            .node_budget()
            .is_some_and(|budget| self.nodes.len() >= budget)
    }

    fn execute(&mut self, initial: WorldState) -> Result<TerminationReason, SearchError> {
        let root = self.create_node(initial, None, None);
        if self.nodes[root.index()].is_goal && self.policy.stop_at_first_goal {
            return Ok(TerminationReason::FirstGoalReached { node_id: root });
        }

        loop {
            if self.frontier.is_empty() {
                return Ok(TerminationReason::FrontierExhausted);
            }
            if self.budget_spent() {
                return Ok(TerminationReason::NodeBudgetExceeded);
            }
            let Some(current) = self.frontier.pop() else {
                return Ok(TerminationReason::FrontierExhausted);
            };
            if let Some(reason) = self.expand(current)? {
                return Ok(reason);
            }
        }
    }

    /// Expand one popped node. `Some(reason)` ends the run.
    fn expand(&mut self, id: NodeId) -> Result<Option<TerminationReason>, SearchError> {
        let node = &self.nodes[id.index()];
        if node.is_goal && !self.policy.expand_goal_nodes {
            self.goals_not_expanded += 1;
            return Ok(None);
        }
        if self.policy.max_depth.is_some_and(|limit| node.depth >= limit) {
            self.depth_cutoffs += 1;
            return Ok(None);
        }

        let state = node.state.clone();
        self.expansions += 1;
        let mut created = 0usize;
        let mut duplicates = 0u64;
        let mut stop = None;
        for action in legal_actions(self.roster, &state) {
            let action = action?;
            let next = apply(self.roster, &state, &action)?;
            if self.frontier.is_visited(&next.canonical_key()) {
                duplicates += 1;
                continue;
            }
            if self.budget_spent() {
                stop = Some(TerminationReason::NodeBudgetExceeded);
                break;
            }
            let child = self.create_node(next, Some(id), Some(action));
            self.nodes[id.index()].children.push(child);
            created += 1;
            if self.nodes[child.index()].is_goal && self.policy.stop_at_first_goal {
                stop = Some(TerminationReason::FirstGoalReached { node_id: child });
                break;
            }
        }
        self.duplicates_suppressed += duplicates;
        debug!(
            node = %id,
            depth = self.nodes[id.index()].depth,
            created,
            duplicates,
            frontier = self.frontier.len(),
            "expanded"
        );
        Ok(stop)
    }

    /// Append a node, claim its key and queue it. Callers check the visited
    /// index and the budget first.
    fn create_node(
        &mut self,
        state: WorldState,
        parent: Option<NodeId>,
        action: Option<Action>,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let depth = parent.map_or(0, |p| self.nodes[p.index()].depth + 1);
        let description = action
            .as_ref()
            .map_or_else(|| ROOT_DESCRIPTION.to_string(), |a| a.describe(self.roster));
        let state_key = state.canonical_key();
        let is_goal = self.goal.is_goal(&state);
        if is_goal {
            debug!(node = %id, depth, key = %state_key, "goal reached");
        }
        self.frontier.discover(state_key.clone(), id);
        self.nodes.push(Node {
            id,
            parent,
            children: Vec::new(),
            state,
            state_key,
            is_goal,
            action,
            description,
            depth,
        });
        id
    }

    fn finish(self, termination: TerminationReason) -> SearchOutcome {
        let metadata = SearchMetadata {
            termination,
            policy: self.policy.clone(),
            expansions: self.expansions,
            duplicates_suppressed: self.duplicates_suppressed,
            depth_cutoffs: self.depth_cutoffs,
            goals_not_expanded: self.goals_not_expanded,
            frontier_high_water: self.frontier.high_water(),
            visited_states: self.frontier.visited_count(),
        };
        let pending = self.frontier.pending();
        let index = self.frontier.into_index();
        SearchOutcome {
            pending,
            graph: SearchGraph::new(self.nodes, index, metadata),
        }
    }
}
