//! Built-in worlds.

pub mod ring_and_peg;
pub mod tower_reversal;
pub mod two_blocks;

use crate::contract::World;
use crate::scenario::{Scenario, ScenarioError};

/// Every built-in world, in listing order.
#[must_use]
pub fn builtin_worlds() -> [&'static dyn World; 3] {
    [
        &two_blocks::TwoBlocks,
        &tower_reversal::TowerReversal,
        &ring_and_peg::RingAndPeg,
    ]
}

/// Build the scenario of the built-in world called `name`.
///
/// # Errors
///
/// Returns [`ScenarioError::UnknownWorld`] for an unknown name, or the
/// world's own construction error.
pub fn load_builtin(name: &str) -> Result<Scenario, ScenarioError> {
    builtin_worlds()
        .into_iter()
        .find(|world| world.world_id() == name)
        .ok_or_else(|| ScenarioError::UnknownWorld {
            name: name.to_string(),
        })?
        .scenario()
}
