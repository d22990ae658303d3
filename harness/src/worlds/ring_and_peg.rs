//! `ring_and_peg`: a cube carrying a peg, and a ring. The cube has to end
//! up in the ring's hole with the ring lying flat.
//!
//! The hole stays usable in either orientation, but once the cube is in it
//! the ring is no longer clear and cannot be laid down, so the ring must go
//! down first. The peg is unconstrained. Depth is capped at six actions.

use stackplan_kernel::carrier::roster::{ObjectId, ObjectSpec, Roster, Shape};
use stackplan_kernel::carrier::state::{Placement, Support, WorldState};
use stackplan_search::contract::SupportGoal;
use stackplan_search::policy::SearchPolicy;

use crate::contract::World;
use crate::scenario::{GoalSpec, Scenario, ScenarioError};

/// Depth cap carried by this world's default policy.
pub const MAX_DEPTH: u32 = 6;

pub struct RingAndPeg;

impl World for RingAndPeg {
    #[allow(clippy::unnecessary_literal_bound)]
    fn world_id(&self) -> &str {
        "ring_and_peg"
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn summary(&self) -> &str {
        "free the cube from under the peg and drop it into the lying ring"
    }

    fn scenario(&self) -> Result<Scenario, ScenarioError> {
        let roster = Roster::new([
            ObjectSpec::new(1, "Cube", Shape::Cube),
            ObjectSpec::new(2, "Peg", Shape::Cylinder),
            ObjectSpec::new(3, "Ring", Shape::Ring),
        ])?;
        let initial = WorldState::new(
            &roster,
            [
                (ObjectId::new(1), Placement::on_table()),
                (ObjectId::new(2), Placement::on(1)),
                (ObjectId::new(3), Placement::on_table()),
            ],
        )?;
        let goal = SupportGoal::new()
            .on(
                1,
                Support::Anchor {
                    owner: ObjectId::new(3),
                    anchor: "hole".into(),
                },
            )
            .lying(3, true);
        Ok(Scenario {
            name: self.world_id().to_string(),
            roster,
            initial,
            goal: GoalSpec::Partial(goal),
            policy: SearchPolicy {
                max_depth: Some(MAX_DEPTH),
                ..SearchPolicy::default()
            },
        })
    }
}
