//! Typed world-model errors.
//!
//! Every variant is a hard failure. `UnknownObject` and `IllegalAction`
//! surfacing during search mean a caller or generator bug, never a data
//! condition the engine may recover from.

use crate::carrier::roster::ObjectId;
use crate::carrier::state::Support;
use crate::operators::action::Action;

/// Failure raised by state queries, state construction, or `apply()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// An object id is not part of the tracked state.
    #[error("unknown object: {id}")]
    UnknownObject { id: ObjectId },
    /// The action violates a precondition in the current state.
    #[error("illegal action {action}: {violation}")]
    IllegalAction {
        action: Action,
        violation: Violation,
    },
    /// A roster object was given no placement.
    #[error("object {id} has no placement")]
    MissingPlacement { id: ObjectId },
    /// A roster object was placed more than once.
    #[error("object {id} is placed more than once")]
    DuplicatePlacement { id: ObjectId },
    /// A placement names an anchor its owner does not declare.
    #[error("object {owner} has no anchor named {anchor:?}")]
    UnknownAnchor { owner: ObjectId, anchor: String },
    /// A capacity-one surface or anchor holds more than one object.
    #[error("support {support} holds more than one object")]
    SurfaceOverfull { support: Support },
    /// Something rests on the top surface of a lying object.
    #[error("object {owner} is lying down and cannot carry anything on top")]
    BlockedSurface { owner: ObjectId },
    /// The support relation contains a cycle.
    #[error("support relation contains a cycle through object {id}")]
    SupportCycle { id: ObjectId },
}

/// The precondition an illegal action failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Something rests on the object (top surface or an anchor).
    #[error("object is not clear")]
    NotClear,
    /// The destination is the object itself or one of its anchors.
    #[error("destination belongs to the moved object")]
    SelfDestination,
    /// The object already rests directly on the destination.
    #[error("object is already on the destination")]
    AlreadyOnDestination,
    /// The destination's owner is lying down, so its top surface is closed.
    #[error("destination is lying down")]
    DestinationLying,
    /// The destination surface or anchor is already taken.
    #[error("destination is occupied")]
    DestinationOccupied,
    /// The destination names an anchor its owner does not declare.
    #[error("destination anchor does not exist")]
    NoSuchAnchor,
    /// `lay_down` requires the object to rest on the table.
    #[error("object is not on the table")]
    NotOnTable,
    /// `lay_down` on an object that is already lying.
    #[error("object is already lying down")]
    AlreadyLying,
    /// The object's shape cannot be laid down.
    #[error("object shape cannot lie down")]
    CannotLieDown,
}
