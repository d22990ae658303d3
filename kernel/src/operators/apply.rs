//! `apply()`: the pure transition function.
//!
//! Two-phase:
//! 1. Legality: the same preconditions the generator filters on.
//! 2. Effect: `move` rewrites the support (lying flag persists), `lay_down`
//!    sets the lying flag (support stays the table).
//!
//! The input state is borrowed immutably; the successor is a fresh value.

use crate::carrier::roster::Roster;
use crate::carrier::state::{Placement, WorldState};
use crate::error::WorldError;
use crate::operators::action::Action;
use crate::operators::legal::check_legal;

/// Apply an action, producing the successor state.
///
/// # Errors
///
/// - [`WorldError::UnknownObject`]: the action names an untracked object
/// - [`WorldError::IllegalAction`]: the action is not legal in `state`
pub fn apply(roster: &Roster, state: &WorldState, action: &Action) -> Result<WorldState, WorldError> {
    check_legal(roster, state, action)?;

    let object = action.object();
    let current = state.placement(object)?;
    let next = match action {
        Action::Move { destination, .. } => Placement {
            support: destination.clone(),
            lying: current.lying,
        },
        Action::LayDown { .. } => Placement {
            support: current.support.clone(),
            lying: true,
        },
    };
    Ok(state.with_placement(object, next))
}
