//! Action legality and the action generator.
//!
//! One precondition function serves both the generator and `apply()`, so an
//! action is generated iff `apply()` accepts it.
//!
//! # Generation order
//!
//! Objects ascending by id. For each object: its moves (destinations in
//! [`Roster::destinations`] order), then its `lay_down`. The order is part of
//! the contract: node numbering in the search graph depends on it.

use std::collections::BTreeSet;

use crate::carrier::roster::{ObjectId, Roster};
use crate::carrier::state::{Support, WorldState};
use crate::error::{Violation, WorldError};
use crate::operators::action::Action;

/// Lazily enumerate every legal action from `state`, in deterministic order.
///
/// Illegal candidates are skipped. A candidate that names an object the
/// state does not track yields `Err` instead, so a roster/state mismatch
/// reaches the caller.
pub fn legal_actions<'a>(
    roster: &'a Roster,
    state: &'a WorldState,
) -> impl Iterator<Item = Result<Action, WorldError>> + 'a {
    let occupied = state.occupied_supports();
    roster
        .ids()
        .flat_map(move |object| {
            roster
                .destinations()
                .map(move |destination| Action::Move {
                    object,
                    destination,
                })
                .chain(std::iter::once(Action::LayDown { object }))
        })
        .filter_map(
            move |action| match precondition_violation(roster, state, &occupied, &action) {
                Ok(None) => Some(Ok(action)),
                Ok(Some(_)) => None,
                Err(err) => Some(Err(err)),
            },
        )
}

/// [`legal_actions`] collected, stopping at the first error.
///
/// # Errors
///
/// Returns [`WorldError::UnknownObject`] if `state` does not track an object
/// the roster generates actions for.
pub fn legal_action_list(roster: &Roster, state: &WorldState) -> Result<Vec<Action>, WorldError> {
    legal_actions(roster, state).collect()
}

/// Check an action against the current state.
///
/// # Errors
///
/// - [`WorldError::UnknownObject`] if the action names an untracked object
/// - [`WorldError::IllegalAction`] if a precondition fails
pub fn check_legal(roster: &Roster, state: &WorldState, action: &Action) -> Result<(), WorldError> {
    let occupied = state.occupied_supports();
    match precondition_violation(roster, state, &occupied, action)? {
        None => Ok(()),
        Some(violation) => Err(WorldError::IllegalAction {
            action: action.clone(),
            violation,
        }),
    }
}

/// `Ok(None)` when legal, `Ok(Some(_))` naming the failed precondition,
/// `Err` when the action refers to objects outside the state.
fn precondition_violation(
    roster: &Roster,
    state: &WorldState,
    occupied: &BTreeSet<&Support>,
    action: &Action,
) -> Result<Option<Violation>, WorldError> {
    let object = action.object();
    let placement = state.placement(object)?;
    let spec = roster
        .get(object)
        .ok_or(WorldError::UnknownObject { id: object })?;
    let clear = is_clear(occupied, object);

    let violation = match action {
        Action::Move { destination, .. } => {
            if let Some(owner) = destination.owner() {
                state.placement(owner)?;
            }
            if destination.owner() == Some(object) {
                Some(Violation::SelfDestination)
            } else if placement.support == *destination {
                Some(Violation::AlreadyOnDestination)
            } else if !clear {
                Some(Violation::NotClear)
            } else {
                destination_violation(roster, state, occupied, destination)?
            }
        }
        Action::LayDown { .. } => {
            if !spec.shape.can_lay_down() {
                Some(Violation::CannotLieDown)
            } else if placement.lying {
                Some(Violation::AlreadyLying)
            } else if placement.support != Support::Table {
                Some(Violation::NotOnTable)
            } else if !clear {
                Some(Violation::NotClear)
            } else {
                None
            }
        }
    };
    Ok(violation)
}

/// Whether `destination` can accept one more object.
fn destination_violation(
    roster: &Roster,
    state: &WorldState,
    occupied: &BTreeSet<&Support>,
    destination: &Support,
) -> Result<Option<Violation>, WorldError> {
    let violation = match destination {
        Support::Table => None,
        Support::On(owner) => {
            if state.is_lying(*owner)? {
                Some(Violation::DestinationLying)
            } else if occupied.contains(destination) {
                Some(Violation::DestinationOccupied)
            } else {
                None
            }
        }
        Support::Anchor { owner, anchor } => {
            let spec = roster
                .get(*owner)
                .ok_or(WorldError::UnknownObject { id: *owner })?;
            if !spec.has_anchor(anchor) {
                Some(Violation::NoSuchAnchor)
            } else if occupied.contains(destination) {
                Some(Violation::DestinationOccupied)
            } else {
                None
            }
        }
    };
    Ok(violation)
}

fn is_clear(occupied: &BTreeSet<&Support>, object: ObjectId) -> bool {
    !occupied.iter().any(|support| support.owner() == Some(object))
}
