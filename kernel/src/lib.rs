//! Stackplan Kernel: the discrete world model of the blocks-world planner.
//!
//! # API Surface
//!
//! - [`carrier::state::WorldState`] -- who rests on what, canonicalised to a key
//! - [`operators::legal::legal_actions`] -- enumerate legal actions from a state
//! - [`operators::apply::apply`] -- pure transition: state + action -> new state
//! - [`proof::replay::replay_plan`] -- re-apply a plan from its starting state
//!
//! # Module Dependency Direction
//!
//! `carrier` ← `operators` ← `proof`
//!
//! One-way only. `error` is shared by all three.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod carrier;
pub mod error;
pub mod operators;
pub mod proof;
