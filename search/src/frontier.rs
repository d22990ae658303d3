//! FIFO frontier and the visited index.
//!
//! The visited index maps each canonical key to the node that first
//! discovered it. Keys enter the index when their node is created, not when
//! it is expanded, so a state is never queued twice. `BTreeMap` keeps
//! iteration deterministic where the index is inspected.

use std::collections::{BTreeMap, VecDeque};

use crate::node::NodeId;

#[derive(Debug, Default)]
pub struct FifoFrontier {
    queue: VecDeque<NodeId>,
    visited: BTreeMap<String, NodeId>,
    high_water: usize,
}

impl FifoFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` as discovered by `node` and enqueue the node.
    ///
    /// Returns `false` (and enqueues nothing) if the key was already claimed.
    pub fn discover(&mut self, key: String, node: NodeId) -> bool {
        if self.visited.contains_key(&key) {
            return false;
        }
        self.visited.insert(key, node);
        self.queue.push_back(node);
        self.high_water = self.high_water.max(self.queue.len());
        true
    }

    /// Oldest queued node.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn is_visited(&self, key: &str) -> bool {
        self.visited.contains_key(key)
    }

    /// The node that first discovered `key`.
    #[must_use]
    pub fn owner_of(&self, key: &str) -> Option<NodeId> {
        self.visited.get(key).copied()
    }

    /// Nodes still waiting for expansion, in queue order.
    #[must_use]
    pub fn pending(&self) -> Vec<NodeId> {
        self.queue.iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct keys ever discovered.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Largest queue length observed.
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Consume the frontier, keeping only the visited index.
    #[must_use]
    pub fn into_index(self) -> BTreeMap<String, NodeId> {
        self.visited
    }
}
