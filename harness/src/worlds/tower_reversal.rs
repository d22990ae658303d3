//! `tower_reversal`: three cubes stacked A/B/C (A at the bottom) must be
//! restacked C/B/A. Cubes never lie down, so only moves apply.

use stackplan_kernel::carrier::roster::{ObjectId, ObjectSpec, Roster, Shape};
use stackplan_kernel::carrier::state::{Placement, WorldState};
use stackplan_search::policy::SearchPolicy;

use crate::contract::World;
use crate::scenario::{GoalSpec, Scenario, ScenarioError};

pub struct TowerReversal;

impl World for TowerReversal {
    #[allow(clippy::unnecessary_literal_bound)]
    fn world_id(&self) -> &str {
        "tower_reversal"
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn summary(&self) -> &str {
        "three stacked cubes; rebuild the tower upside down"
    }

    fn scenario(&self) -> Result<Scenario, ScenarioError> {
        let roster = Roster::new([
            ObjectSpec::new(1, "A", Shape::Cube),
            ObjectSpec::new(2, "B", Shape::Cube),
            ObjectSpec::new(3, "C", Shape::Cube),
        ])?;
        let initial = WorldState::new(
            &roster,
            [
                (ObjectId::new(1), Placement::on_table()),
                (ObjectId::new(2), Placement::on(1)),
                (ObjectId::new(3), Placement::on(2)),
            ],
        )?;
        let target = WorldState::new(
            &roster,
            [
                (ObjectId::new(3), Placement::on_table()),
                (ObjectId::new(2), Placement::on(3)),
                (ObjectId::new(1), Placement::on(2)),
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
