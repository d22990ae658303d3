//! World contract: the minimal trait a built-in world implements.
//!
//! Worlds provide domain data only (objects, starting state, goal, policy
//! defaults). Search, plan extraction and bundling are runner concerns.

use crate::scenario::{Scenario, ScenarioError};

pub trait World {
    /// Unique world identifier (e.g., `"two_blocks"`).
    fn world_id(&self) -> &str;

    /// One-line summary shown by `stackplan worlds`.
    fn summary(&self) -> &str;

    /// Build the world's scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] if the world's declarations are invalid.
    fn scenario(&self) -> Result<Scenario, ScenarioError>;
}
