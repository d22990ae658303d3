//! Goal predicates.
//!
//! The engine only asks "is this state a goal?". Implementations must be
//! pure: the same state always gets the same answer.

use stackplan_kernel::carrier::roster::ObjectId;
use stackplan_kernel::carrier::state::{Support, WorldState};

pub trait GoalPredicate {
    fn is_goal(&self, state: &WorldState) -> bool;
}

impl<F> GoalPredicate for F
where
    F: Fn(&WorldState) -> bool,
{
    fn is_goal(&self, state: &WorldState) -> bool {
        self(state)
    }
}

/// Matches exactly one state, compared by canonical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactGoal {
    key: String,
}

impl ExactGoal {
    #[must_use]
    pub fn new(target: &WorldState) -> Self {
        Self {
            key: target.canonical_key(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl GoalPredicate for ExactGoal {
    fn is_goal(&self, state: &WorldState) -> bool {
        state.canonical_key() == self.key
    }
}

/// One requirement of a [`SupportGoal`]. `None` fields are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalRequirement {
    pub object: ObjectId,
    pub support: Option<Support>,
    pub lying: Option<bool>,
}

/// Partial goal: every listed object satisfies its requirement; unlisted
/// objects may be anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SupportGoal {
    requirements: Vec<GoalRequirement>,
}

impl SupportGoal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `object` to rest on `support`.
    #[must_use]
    pub fn on(mut self, object: u32, support: Support) -> Self {
        self.requirements.push(GoalRequirement {
            object: ObjectId::new(object),
            support: Some(support),
            lying: None,
        });
        self
    }

    /// Require `object` to be lying (`true`) or upright (`false`).
    #[must_use]
    pub fn lying(mut self, object: u32, lying: bool) -> Self {
        self.requirements.push(GoalRequirement {
            object: ObjectId::new(object),
            support: None,
            lying: Some(lying),
        });
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: GoalRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    #[must_use]
    pub fn requirements(&self) -> &[GoalRequirement] {
        &self.requirements
    }
}

impl GoalPredicate for SupportGoal {
    fn is_goal(&self, state: &WorldState) -> bool {
        self.requirements.iter().all(|req| {
            let Ok(placement) = state.placement(req.object) else {
                return false;
            };
            let support_ok = match &req.support {
                Some(support) => *support == placement.support,
                None => true,
            };
            let lying_ok = match req.lying {
                Some(lying) => lying == placement.lying,
                None => true,
            };
            support_ok && lying_ok
        })
    }
}
