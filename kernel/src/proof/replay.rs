//! Plan replay: re-execute an action sequence through `apply()` and compare
//! the final state against a recorded one.
//!
//! A [`ReplayError`] means the plan could not be replayed at all (some step
//! was rejected). A [`ReplayVerdict::Divergence`] means it replayed but ended
//! somewhere else.

use crate::carrier::roster::Roster;
use crate::carrier::state::WorldState;
use crate::error::WorldError;
use crate::operators::action::Action;
use crate::operators::apply::apply;

/// Outcome of a successful replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayVerdict {
    /// The final state's key equals the expected key.
    Match,
    /// The plan replayed cleanly but reached a different state.
    Divergence { expected: String, actual: String },
}

/// A plan step that `apply()` rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("plan step {index} ({action}) failed: {source}")]
    Step {
        index: usize,
        action: Action,
        #[source]
        source: WorldError,
    },
}

/// Apply `plan` in order from `initial`, returning the final state.
///
/// # Errors
///
/// Returns [`ReplayError::Step`] for the first action `apply()` rejects.
pub fn replay_plan(
    roster: &Roster,
    initial: &WorldState,
    plan: &[Action],
) -> Result<WorldState, ReplayError> {
    let mut state = initial.clone();
    for (index, action) in plan.iter().enumerate() {
        state = apply(roster, &state, action).map_err(|source| ReplayError::Step {
            index,
            action: action.clone(),
            source,
        })?;
    }
    Ok(state)
}

/// Replay `plan` and compare the final canonical key with `expected_key`.
///
/// # Errors
///
/// Propagates [`ReplayError`] from [`replay_plan`].
pub fn verify_plan(
    roster: &Roster,
    initial: &WorldState,
    plan: &[Action],
    expected_key: &str,
) -> Result<ReplayVerdict, ReplayError> {
    let actual = replay_plan(roster, initial, plan)?.canonical_key();
    if actual == expected_key {
        Ok(ReplayVerdict::Match)
    } else {
        Ok(ReplayVerdict::Divergence {
            expected: expected_key.to_string(),
            actual,
        })
    }
}
