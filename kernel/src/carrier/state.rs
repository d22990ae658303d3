//! `WorldState`: the discrete configuration of every object's support and
//! orientation, and its canonical key.
//!
//! # Canonical key
//!
//! Objects sorted by ascending id, each rendered `id:support:lying`, joined
//! by `|`. Supports render as `0` (table), `<id>` (top surface) or
//! `<id>@<anchor>`. Anchor names cannot contain `|`, `:` or `@` (enforced by
//! the roster), so the rendering is injective. Two states are the same state
//! iff their keys are equal.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use crate::carrier::roster::{ObjectId, Roster};
use crate::error::WorldError;

/// Separator between per-object entries in a canonical key.
pub const KEY_SEPARATOR: char = '|';

/// What an object rests on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Support {
    /// The table: unbounded capacity, always available.
    Table,
    /// The top surface of another object.
    On(ObjectId),
    /// A named anchor point of another object (e.g. a ring's hole).
    Anchor { owner: ObjectId, anchor: String },
}

impl Support {
    /// The object providing this support, if it is not the table.
    #[must_use]
    pub fn owner(&self) -> Option<ObjectId> {
        match self {
            Self::Table => None,
            Self::On(id) | Self::Anchor { owner: id, .. } => Some(*id),
        }
    }

    /// Parse the key rendering back into a support (`0`, `<id>`, `<id>@<anchor>`).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.split_once('@') {
            Some((owner, anchor)) => {
                let owner: u32 = owner.parse().ok()?;
                if owner == ObjectId::TABLE_RAW || anchor.is_empty() {
                    return None;
                }
                Some(Self::Anchor {
                    owner: ObjectId::new(owner),
                    anchor: anchor.to_string(),
                })
            }
            None => match text.parse::<u32>().ok()? {
                ObjectId::TABLE_RAW => Some(Self::Table),
                raw => Some(Self::On(ObjectId::new(raw))),
            },
        }
    }
}

impl std::fmt::Display for Support {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "{}", ObjectId::TABLE_RAW),
            Self::On(id) => write!(f, "{id}"),
            Self::Anchor { owner, anchor } => write!(f, "{owner}@{anchor}"),
        }
    }
}

/// One object's relational facts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placement {
    pub support: Support,
    pub lying: bool,
}

impl Placement {
    /// Upright on the table.
    #[must_use]
    pub fn on_table() -> Self {
        Self {
            support: Support::Table,
            lying: false,
        }
    }

    /// Upright on another object's top surface.
    #[must_use]
    pub fn on(id: u32) -> Self {
        Self {
            support: Support::On(ObjectId::new(id)),
            lying: false,
        }
    }

    #[must_use]
    pub fn lying(mut self) -> Self {
        self.lying = true;
        self
    }
}

/// Mapping from every roster object to its placement.
///
/// Values are immutable once built: transitions produce a new state
/// ([`WorldState::with_placement`]) and never touch the original.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorldState {
    placements: BTreeMap<ObjectId, Placement>,
}

impl WorldState {
    /// Build a state and check it against the roster.
    ///
    /// # Errors
    ///
    /// - [`WorldError::DuplicatePlacement`] / [`WorldError::MissingPlacement`]:
    ///   every roster object must be placed exactly once
    /// - [`WorldError::UnknownObject`]: a placement or support names an object
    ///   outside the roster
    /// - [`WorldError::UnknownAnchor`]: a support names an undeclared anchor
    /// - [`WorldError::SurfaceOverfull`]: two objects share a capacity-one support
    /// - [`WorldError::BlockedSurface`]: something rests on a lying object's top
    /// - [`WorldError::SupportCycle`]: the support relation is cyclic
    pub fn new(
        roster: &Roster,
        placements: impl IntoIterator<Item = (ObjectId, Placement)>,
    ) -> Result<Self, WorldError> {
        let mut map = BTreeMap::new();
        for (id, placement) in placements {
            if !roster.contains(id) {
                return Err(WorldError::UnknownObject { id });
            }
            if map.insert(id, placement).is_some() {
                return Err(WorldError::DuplicatePlacement { id });
            }
        }
        if let Some(id) = roster.ids().find(|id| !map.contains_key(id)) {
            return Err(WorldError::MissingPlacement { id });
        }

        let state = Self { placements: map };
        state.validate_supports(roster)?;
        if let Some(id) = state.first_cycle_member() {
            return Err(WorldError::SupportCycle { id });
        }
        Ok(state)
    }

    fn validate_supports(&self, roster: &Roster) -> Result<(), WorldError> {
        let mut taken = BTreeSet::new();
        for placement in self.placements.values() {
            match &placement.support {
                Support::Table => continue,
                Support::On(owner) => {
                    let owner_placement = self
                        .placements
                        .get(owner)
                        .ok_or(WorldError::UnknownObject { id: *owner })?;
                    if owner_placement.lying {
                        return Err(WorldError::BlockedSurface { owner: *owner });
                    }
                }
                Support::Anchor { owner, anchor } => {
                    let spec = roster
                        .get(*owner)
                        .ok_or(WorldError::UnknownObject { id: *owner })?;
                    if !spec.has_anchor(anchor) {
                        return Err(WorldError::UnknownAnchor {
                            owner: *owner,
                            anchor: anchor.clone(),
                        });
                    }
                }
            }
            if !taken.insert(&placement.support) {
                return Err(WorldError::SurfaceOverfull {
                    support: placement.support.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check that the state tracks exactly the roster's objects.
    ///
    /// # Errors
    ///
    /// - [`WorldError::UnknownObject`]: a placed object is not in the roster
    /// - [`WorldError::MissingPlacement`]: a roster object has no placement
    pub fn check_roster(&self, roster: &Roster) -> Result<(), WorldError> {
        if let Some(id) = self.placements.keys().copied().find(|id| !roster.contains(*id)) {
            return Err(WorldError::UnknownObject { id });
        }
        if let Some(id) = roster.ids().find(|id| !self.placements.contains_key(id)) {
            return Err(WorldError::MissingPlacement { id });
        }
        Ok(())
    }

    /// Current support of an object.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownObject`] if `id` is not tracked.
    pub fn support_of(&self, id: ObjectId) -> Result<&Support, WorldError> {
        self.placement(id).map(|p| &p.support)
    }

    /// Whether an object is lying down.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownObject`] if `id` is not tracked.
    pub fn is_lying(&self, id: ObjectId) -> Result<bool, WorldError> {
        self.placement(id).map(|p| p.lying)
    }

    /// Full placement of an object.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownObject`] if `id` is not tracked.
    pub fn placement(&self, id: ObjectId) -> Result<&Placement, WorldError> {
        self.placements
            .get(&id)
            .ok_or(WorldError::UnknownObject { id })
    }

    /// Placements in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Placement)> {
        self.placements.iter().map(|(id, p)| (*id, p))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Deterministic, injective string encoding used as the dedup key.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        let mut key = String::with_capacity(self.placements.len() * 10);
        for (i, (id, placement)) in self.placements.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            let _ = write!(key, "{id}:{}:{}", placement.support, placement.lying);
        }
        key
    }

    /// Export form: `[{"id":1,"lying":false,"support":"0"}, ...]`, ascending id.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.placements
                .iter()
                .map(|(id, p)| {
                    serde_json::json!({
                        "id": id.get(),
                        "lying": p.lying,
                        "support": p.support.to_string(),
                    })
                })
                .collect(),
        )
    }

    /// Supports currently holding an object. The table is never included.
    #[must_use]
    pub fn occupied_supports(&self) -> BTreeSet<&Support> {
        self.placements
            .values()
            .map(|p| &p.support)
            .filter(|s| **s != Support::Table)
            .collect()
    }

    /// Objects resting directly on `support`, ascending by id.
    pub fn occupants<'a>(&'a self, support: &'a Support) -> impl Iterator<Item = ObjectId> + 'a {
        self.placements
            .iter()
            .filter(move |(_, p)| p.support == *support)
            .map(|(id, _)| *id)
    }

    /// Nothing rests on the object: neither its top surface nor any anchor.
    #[must_use]
    pub fn is_clear(&self, id: ObjectId) -> bool {
        !self
            .placements
            .values()
            .any(|p| p.support.owner() == Some(id))
    }

    /// Integrity check: `true` if the support relation contains a cycle.
    #[must_use]
    pub fn clashes(&self) -> bool {
        self.first_cycle_member().is_some()
    }

    /// Walk each object's support chain with an explicit visited set.
    fn first_cycle_member(&self) -> Option<ObjectId> {
        self.placements.keys().copied().find(|&start| {
            let mut seen = BTreeSet::new();
            let mut current = start;
            loop {
                if !seen.insert(current) {
                    return true;
                }
                match self.placements.get(&current).and_then(|p| p.support.owner()) {
                    Some(next) => current = next,
                    None => return false,
                }
            }
        })
    }

    /// A copy of this state with one object's placement replaced.
    ///
    /// Performs no legality checks; callers go through
    /// [`crate::operators::apply::apply`].
    #[must_use]
    pub(crate) fn with_placement(&self, id: ObjectId, placement: Placement) -> Self {
        let mut placements = self.placements.clone();
        placements.insert(id, placement);
        Self { placements }
    }

    /// Test-only constructor that skips validation (used to build corrupt states).
    #[cfg(test)]
    pub(crate) fn unchecked(placements: impl IntoIterator<Item = (ObjectId, Placement)>) -> Self {
        Self {
            placements: placements.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::roster::{ObjectSpec, Shape};

    fn id(raw: u32) -> ObjectId {
        ObjectId::new(raw)
    }

    fn abc_roster() -> Roster {
        Roster::new([
            ObjectSpec::new(1, "A", Shape::Block),
            ObjectSpec::new(2, "B", Shape::Block),
            ObjectSpec::new(3, "R", Shape::Ring),
        ])
        .unwrap()
    }

    fn hole(owner: u32) -> Support {
        Support::Anchor {
            owner: id(owner),
            anchor: "hole".into(),
        }
    }

    #[test]
    fn canonical_key_sorts_by_id() {
        let roster = abc_roster();
        let state = WorldState::new(
            &roster,
            [
                (id(3), Placement::on_table().lying()),
                (id(1), Placement::on_table()),
                (id(2), Placement::on(1)),
            ],
        )
        .unwrap();
        assert_eq!(state.canonical_key(), "1:0:false|2:1:false|3:0:true");
    }

    #[test]
    fn canonical_key_renders_anchor() {
        let roster = abc_roster();
        let state = WorldState::new(
            &roster,
            [
                (id(1), Placement { support: hole(3), lying: false }),
                (id(2), Placement::on_table()),
                (id(3), Placement::on_table().lying()),
            ],
        )
        .unwrap();
        assert_eq!(state.canonical_key(), "1:3@hole:false|2:0:false|3:0:true");
    }

    #[test]
    fn canonical_key_is_deterministic() {
        let roster = abc_roster();
        let build = || {
            WorldState::new(
                &roster,
                [
                    (id(2), Placement::on_table()),
                    (id(1), Placement::on(2)),
                    (id(3), Placement::on_table()),
                ],
            )
            .unwrap()
        };
        assert_eq!(build().canonical_key(), build().canonical_key());
    }

    #[test]
    fn distinct_states_have_distinct_keys() {
        let roster = abc_roster();
        let base = [
            (id(1), Placement::on_table()),
            (id(2), Placement::on_table()),
            (id(3), Placement::on_table()),
        ];
        let a = WorldState::new(&roster, base.clone()).unwrap();
        let lying = a.with_placement(id(3), Placement::on_table().lying());
        let stacked = a.with_placement(id(2), Placement::on(1));
        let in_hole = a.with_placement(id(2), Placement { support: hole(3), lying: false });
        let keys = [
            a.canonical_key(),
            lying.canonical_key(),
            stacked.canonical_key(),
            in_hole.canonical_key(),
        ];
        let unique: BTreeSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len(), "keys collided: {keys:?}");
    }

    #[test]
    fn json_export_lists_objects_in_id_order() {
        let roster = abc_roster();
        let state = WorldState::new(
            &roster,
            [
                (id(1), Placement { support: hole(3), lying: false }),
                (id(2), Placement::on_table()),
                (id(3), Placement::on_table().lying()),
            ],
        )
        .unwrap();
        assert_eq!(
            state.to_json_value(),
            serde_json::json!([
                {"id": 1, "lying": false, "support": "3@hole"},
                {"id": 2, "lying": false, "support": "0"},
                {"id": 3, "lying": true, "support": "0"},
            ])
        );
    }

    #[test]
    fn support_of_unknown_object_fails() {
        let roster = abc_roster();
        let state = WorldState::new(
            &roster,
            [
                (id(1), Placement::on_table()),
                (id(2), Placement::on_table()),
                (id(3), Placement::on_table()),
            ],
        )
        .unwrap();
        assert_eq!(
            state.support_of(id(9)).unwrap_err(),
            WorldError::UnknownObject { id: id(9) }
        );
        assert_eq!(
            state.is_lying(id(9)).unwrap_err(),
            WorldError::UnknownObject { id: id(9) }
        );
        assert_eq!(state.support_of(id(2)).unwrap(), &Support::Table);
        assert!(!state.is_lying(id(2)).unwrap());
    }

    #[test]
    fn missing_and_duplicate_placements_rejected() {
        let roster = abc_roster();
        let err = WorldState::new(&roster, [(id(1), Placement::on_table())]).unwrap_err();
        assert_eq!(err, WorldError::MissingPlacement { id: id(2) });

        let err = WorldState::new(
            &roster,
            [
                (id(1), Placement::on_table()),
                (id(1), Placement::on_table()),
            ],
        )
        .unwrap_err();
        assert_eq!(err, WorldError::DuplicatePlacement { id: id(1) });
    }

    #[test]
    fn state_from_another_roster_fails_the_roster_check() {
        let roster = abc_roster();
        let pair = Roster::new([
            ObjectSpec::new(1, "A", Shape::Block),
            ObjectSpec::new(2, "B", Shape::Block),
        ])
        .unwrap();
        let small = WorldState::new(
            &pair,
            [(id(1), Placement::on_table()), (id(2), Placement::on_table())],
        )
        .unwrap();
        assert_eq!(
            small.check_roster(&roster).unwrap_err(),
            WorldError::MissingPlacement { id: id(3) }
        );

        let full = WorldState::new(&roster, roster.ids().map(|i| (i, Placement::on_table())))
            .unwrap();
        assert_eq!(
            full.check_roster(&pair).unwrap_err(),
            WorldError::UnknownObject { id: id(3) }
        );
        assert_eq!(full.check_roster(&roster), Ok(()));
    }

    #[test]
    fn overfull_surface_rejected() {
        let roster = abc_roster();
        let err = WorldState::new(
            &roster,
            [
                (id(1), Placement::on(3)),
                (id(2), Placement::on(3)),
                (id(3), Placement::on_table()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::SurfaceOverfull { .. }));
    }

    #[test]
    fn lying_object_cannot_carry_on_top() {
        let roster = abc_roster();
        let err = WorldState::new(
            &roster,
            [
                (id(1), Placement::on(3)),
                (id(2), Placement::on_table()),
                (id(3), Placement::on_table().lying()),
            ],
        )
        .unwrap_err();
        assert_eq!(err, WorldError::BlockedSurface { owner: id(3) });
    }

    #[test]
    fn unknown_anchor_rejected() {
        let roster = abc_roster();
        let err = WorldState::new(
            &roster,
            [
                (id(1), Placement { support: hole(2), lying: false }),
                (id(2), Placement::on_table()),
                (id(3), Placement::on_table()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::UnknownAnchor { .. }));
    }

    #[test]
    fn cycle_rejected_on_construction() {
        let roster = abc_roster();
        let err = WorldState::new(
            &roster,
            [
                (id(1), Placement::on(2)),
                (id(2), Placement::on(1)),
                (id(3), Placement::on_table()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::SupportCycle { .. }));
    }

    #[test]
    fn clashes_detects_cycles() {
        let looped = WorldState::unchecked([
            (id(1), Placement::on(2)),
            (id(2), Placement { support: hole(3), lying: false }),
            (id(3), Placement::on(1)),
        ]);
        assert!(looped.clashes());

        let tower = WorldState::unchecked([
            (id(1), Placement::on_table()),
            (id(2), Placement::on(1)),
            (id(3), Placement::on(2)),
        ]);
        assert!(!tower.clashes());
    }

    #[test]
    fn clear_and_occupants() {
        let roster = abc_roster();
        let state = WorldState::new(
            &roster,
            [
                (id(1), Placement::on_table()),
                (id(2), Placement { support: hole(3), lying: false }),
                (id(3), Placement::on_table().lying()),
            ],
        )
        .unwrap();
        assert!(state.is_clear(id(1)));
        assert!(state.is_clear(id(2)));
        assert!(!state.is_clear(id(3)), "anchor occupancy blocks clear-top");
        let on_table: Vec<ObjectId> = state.occupants(&Support::Table).collect();
        assert_eq!(on_table, vec![id(1), id(3)]);
        assert_eq!(state.occupied_supports().len(), 1);
    }

    #[test]
    fn support_parse_round_trips_rendering() {
        for support in [Support::Table, Support::On(id(7)), hole(12)] {
            assert_eq!(Support::parse(&support.to_string()), Some(support));
        }
        assert_eq!(Support::parse("0@hole"), None);
        assert_eq!(Support::parse("x"), None);
        assert_eq!(Support::parse("3@"), None);
    }
}
