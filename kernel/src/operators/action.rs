//! The closed action variant and its renderings.

use crate::carrier::roster::{ObjectId, Roster};
use crate::carrier::state::Support;

/// A physical action on one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Put `object` onto `destination`.
    Move {
        object: ObjectId,
        destination: Support,
    },
    /// Lay `object` down where it stands (on the table).
    LayDown { object: ObjectId },
}

impl Action {
    #[must_use]
    pub fn move_to(object: u32, destination: Support) -> Self {
        Self::Move {
            object: ObjectId::new(object),
            destination,
        }
    }

    #[must_use]
    pub fn lay_down(object: u32) -> Self {
        Self::LayDown {
            object: ObjectId::new(object),
        }
    }

    /// The object the action manipulates.
    #[must_use]
    pub fn object(&self) -> ObjectId {
        match self {
            Self::Move { object, .. } | Self::LayDown { object } => *object,
        }
    }

    /// Tag used in exports (`"move"` / `"lay_down"`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::LayDown { .. } => "lay_down",
        }
    }

    /// Human-readable description using roster names.
    #[must_use]
    pub fn describe(&self, roster: &Roster) -> String {
        match self {
            Self::Move {
                object,
                destination,
            } => format!(
                "Move {} onto {}",
                roster.name_or_id(*object),
                roster.support_label(destination)
            ),
            Self::LayDown { object } => format!("Lay down {}", roster.name_or_id(*object)),
        }
    }

    /// Tagged-tuple JSON form: `["move", object, "support"]` or `["lay_down", object]`.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Move {
                object,
                destination,
            } => serde_json::json!([self.kind(), object.get(), destination.to_string()]),
            Self::LayDown { object } => serde_json::json!([self.kind(), object.get()]),
        }
    }

    /// Inverse of [`Action::to_json_value`].
    #[must_use]
    pub fn from_json_value(value: &serde_json::Value) -> Option<Self> {
        let items = value.as_array()?;
        let object = ObjectId::new(u32::try_from(items.get(1)?.as_u64()?).ok()?);
        match (items.first()?.as_str()?, items.len()) {
            ("move", 3) => Some(Self::Move {
                object,
                destination: Support::parse(items[2].as_str()?)?,
            }),
            ("lay_down", 2) => Some(Self::LayDown { object }),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Move {
                object,
                destination,
            } => write!(f, "move({object}, {destination})"),
            Self::LayDown { object } => write!(f, "lay_down({object})"),
        }
    }
}
