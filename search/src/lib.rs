//! Stackplan Search: breadth-first exploration of world states with a
//! navigable search graph and plan extraction.
//!
//! Depends only on `stackplan_kernel`.
//!
//! # Crate dependency graph
//!
//! ```text
//! stackplan_kernel  ←  stackplan_search  ←  stackplan_harness
//! (states, actions)    (frontier, graph)    (scenarios, bundles, CLI)
//! ```
//!
//! # Key types
//!
//! - [`search::SearchEngine`] -- runs one search, returns a [`search::SearchOutcome`]
//! - [`graph::SearchGraph`] -- every discovered node in creation order
//! - [`policy::SearchPolicy`] -- node budget, depth limit, goal handling
//! - [`contract::GoalPredicate`] -- what counts as a goal
//! - [`path::path_to`] / [`path::actions_of`] -- plan extraction
//! - [`graph::SearchGraph::node_by_key`] -- find a discovered state by its canonical key

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod node;
pub mod path;
pub mod policy;
pub mod search;
