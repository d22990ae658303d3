//! Shared scenario builders for stackplan benchmark suites.

use stackplan_harness::scenario::{GoalSpec, Scenario, ScenarioError};
use stackplan_kernel::carrier::roster::{ObjectId, ObjectSpec, Roster, Shape};
use stackplan_kernel::carrier::state::{Placement, WorldState};
use stackplan_search::policy::SearchPolicy;

/// A single stack of `height` cubes (id 1 at the bottom) whose goal is the
/// same stack upside down.
///
/// The reachable state count grows with the ordered set partitions of the
/// cubes (13, 73, 501, 4051 for heights 3 to 6).
///
/// # Errors
///
/// Returns [`ScenarioError`] if the roster or either state is rejected.
pub fn tower_scenario(height: u32) -> Result<Scenario, ScenarioError> {
    let roster =
        Roster::new((1..=height).map(|id| ObjectSpec::new(id, format!("C{id}"), Shape::Cube)))?;
    let initial = WorldState::new(
        &roster,
        (1..=height).map(|id| (ObjectId::new(id), stacked(id, 1))),
    )?;
    let target = WorldState::new(
        &roster,
        (1..=height).map(|id| (ObjectId::new(id), stacked(id, height))),
    )?;
    Ok(Scenario {
        name: format!("tower_{height}"),
        roster,
        initial,
        goal: GoalSpec::exact(target),
        policy: SearchPolicy::default(),
    })
}

/// Placement of `id` in a stack whose bottom cube is `bottom`.
fn stacked(id: u32, bottom: u32) -> Placement {
    if id == bottom {
        return Placement::on_table();
    }
    Placement::on(if bottom == 1 { id - 1 } else { id + 1 })
}
