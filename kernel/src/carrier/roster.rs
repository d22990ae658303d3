//! Object roster: the fixed, validated set of movable objects in a world.
//!
//! The roster is built once and never changes during a search. Every
//! [`crate::carrier::state::WorldState`] is checked against it, and the action
//! generator iterates it in ascending id order for reproducible numbering.

use std::collections::BTreeSet;

use crate::carrier::state::Support;

/// Characters reserved by the canonical key format; anchor names may not use them.
pub const RESERVED_KEY_CHARS: [char; 3] = ['|', ':', '@'];

/// Stable identifier of a movable object.
///
/// `0` is reserved for the table and is never a roster id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Raw id of the table surface.
    pub const TABLE_RAW: u32 = 0;

    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Object category. Only the capabilities derived from it matter to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Generic stackable block.
    Block,
    /// Cube: cannot be laid down.
    Cube,
    /// Cylinder: stands or lies.
    Cylinder,
    /// Ring: exposes a `hole` anchor usable in any orientation.
    Ring,
}

impl Shape {
    /// Whether `lay_down` can ever apply to an object of this shape.
    #[must_use]
    pub fn can_lay_down(self) -> bool {
        !matches!(self, Self::Cube)
    }

    /// Anchor points an object of this shape exposes by default.
    #[must_use]
    pub fn default_anchors(self) -> &'static [&'static str] {
        match self {
            Self::Ring => &["hole"],
            Self::Block | Self::Cube | Self::Cylinder => &[],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Cube => "cube",
            Self::Cylinder => "cylinder",
            Self::Ring => "ring",
        }
    }

    /// Parse a shape tag (case-insensitive).
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "block" => Some(Self::Block),
            "cube" => Some(Self::Cube),
            "cylinder" => Some(Self::Cylinder),
            "ring" | "donut" => Some(Self::Ring),
            _ => None,
        }
    }
}

/// Declaration of one movable object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSpec {
    pub id: ObjectId,
    pub name: String,
    pub shape: Shape,
    /// Named anchor points, each holding at most one object.
    pub anchors: Vec<String>,
}

impl ObjectSpec {
    /// Declare an object with its shape's default anchors.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: ObjectId::new(id),
            name: name.into(),
            shape,
            anchors: shape.default_anchors().iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Add a named anchor point.
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchors.push(anchor.into());
        self
    }

    #[must_use]
    pub fn has_anchor(&self, anchor: &str) -> bool {
        self.anchors.iter().any(|a| a == anchor)
    }
}

/// Roster validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// Id `0` belongs to the table.
    #[error("object id 0 is reserved for the table")]
    ReservedId,
    #[error("duplicate object id {id}")]
    DuplicateId { id: ObjectId },
    #[error("object {id} has an empty name")]
    EmptyName { id: ObjectId },
    /// Anchor names must be non-empty and free of key separators.
    #[error("object {id} has invalid anchor name {anchor:?}")]
    InvalidAnchorName { id: ObjectId, anchor: String },
    #[error("object {id} declares anchor {anchor:?} twice")]
    DuplicateAnchor { id: ObjectId, anchor: String },
}

/// The fixed set of movable objects, sorted by ascending id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    objects: Vec<ObjectSpec>,
}

impl Roster {
    /// Validate and sort a list of object declarations.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] on a reserved or duplicate id, an empty name,
    /// or an invalid or duplicate anchor name.
    pub fn new(specs: impl IntoIterator<Item = ObjectSpec>) -> Result<Self, RosterError> {
        let mut objects: Vec<ObjectSpec> = specs.into_iter().collect();
        objects.sort_by_key(|spec| spec.id);

        let mut seen = BTreeSet::new();
        for spec in &objects {
            if spec.id.get() == ObjectId::TABLE_RAW {
                return Err(RosterError::ReservedId);
            }
            if !seen.insert(spec.id) {
                return Err(RosterError::DuplicateId { id: spec.id });
            }
            if spec.name.trim().is_empty() {
                return Err(RosterError::EmptyName { id: spec.id });
            }
            let mut anchors = BTreeSet::new();
            for anchor in &spec.anchors {
                if anchor.is_empty() || anchor.contains(RESERVED_KEY_CHARS) {
                    return Err(RosterError::InvalidAnchorName {
                        id: spec.id,
                        anchor: anchor.clone(),
                    });
                }
                if !anchors.insert(anchor.as_str()) {
                    return Err(RosterError::DuplicateAnchor {
                        id: spec.id,
                        anchor: anchor.clone(),
                    });
                }
            }
        }

        Ok(Self { objects })
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&ObjectSpec> {
        self.objects
            .binary_search_by_key(&id, |spec| spec.id)
            .ok()
            .map(|idx| &self.objects[idx])
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Object ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().map(|spec| spec.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectSpec> {
        self.objects.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every support in generation order: the table, then for each object
    /// (ascending id) its top surface followed by its anchors.
    pub fn destinations(&self) -> impl Iterator<Item = Support> + '_ {
        std::iter::once(Support::Table).chain(self.objects.iter().flat_map(|spec| {
            std::iter::once(Support::On(spec.id)).chain(spec.anchors.iter().map(move |anchor| {
                Support::Anchor {
                    owner: spec.id,
                    anchor: anchor.clone(),
                }
            }))
        }))
    }

    /// Human-readable name of a support, as used in node descriptions.
    #[must_use]
    pub fn support_label(&self, support: &Support) -> String {
        match support {
            Support::Table => "the table".to_string(),
            Support::On(id) => self.name_or_id(*id),
            Support::Anchor { owner, anchor } => format!("{} ({anchor})", self.name_or_id(*owner)),
        }
    }

    pub(crate) fn name_or_id(&self, id: ObjectId) -> String {
        self.get(id)
            .map_or_else(|| format!("#{id}"), |spec| spec.name.clone())
    }
}
