//! `two_blocks`: two blocks side by side; goal is B stacked on A.

use stackplan_kernel::carrier::roster::{ObjectId, ObjectSpec, Roster, Shape};
use stackplan_kernel::carrier::state::{Placement, WorldState};
use stackplan_search::policy::SearchPolicy;

use crate::contract::World;
use crate::scenario::{GoalSpec, Scenario, ScenarioError};

pub struct TwoBlocks;

impl World for TwoBlocks {
    #[allow(clippy::unnecessary_literal_bound)]
    fn world_id(&self) -> &str {
        "two_blocks"
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn summary(&self) -> &str {
        "blocks A and B on the table; stack B on A"
    }

    fn scenario(&self) -> Result<Scenario, ScenarioError> {
        let roster = Roster::new([
            ObjectSpec::new(1, "A", Shape::Block),
            ObjectSpec::new(2, "B", Shape::Block),
        ])?;
        let initial = WorldState::new(
            &roster,
            [
                (ObjectId::new(1), Placement::on_table()),
                (ObjectId::new(2), Placement::on_table()),
            ],
        )?;
        let target = WorldState::new(
            &roster,
            [
                (ObjectId::new(1), Placement::on_table()),
                (ObjectId::new(2), Placement::on(1)),
            ],
        )?;
        Ok(Scenario {
            name: self.world_id().to_string(),
            roster,
            initial,
            goal: GoalSpec::exact(target),
            policy: SearchPolicy::default(),
        })
    }
}
