//! Harness runner: search a scenario, extract a plan and package the result
//! as an artifact bundle.
//!
//! # Pipeline
//!
//! ```text
//! Scenario → SearchEngine::run() → best_goal() → plan_to()
//!   → verify_plan() → canonical JSON artifacts → build_bundle()
//! ```
//!
//! The runner does no planning or proof logic of its own. It delegates to
//! the search crate and the kernel and refuses to emit a bundle whose plan
//! does not replay to the goal node's state.

use stackplan_kernel::carrier::roster::Roster;
use stackplan_kernel::operators::action::Action;
use stackplan_kernel::proof::canon::{canonical_json_bytes, CanonError};
use stackplan_kernel::proof::hash::{canonical_hash, HashDomain};
use stackplan_kernel::proof::replay::{replay_plan, verify_plan, ReplayError, ReplayVerdict};
use stackplan_search::contract::GoalPredicate;
use stackplan_search::error::SearchError;
use stackplan_search::node::NodeId;
use stackplan_search::path::{all_goal_paths, best_goal, plan_to, GoalPath};
use stackplan_search::search::{SearchEngine, SearchOutcome};

use crate::bundle::{
    build_bundle, verify_bundle, ArtifactBundle, ArtifactInput, BundleArtifact, BundleBuildError,
    BundleVerifyError, PLAN_ARTIFACT, REPORT_ARTIFACT, SCENARIO_ARTIFACT, SEARCH_GRAPH_ARTIFACT,
};
use crate::scenario::{Scenario, ScenarioError};

/// Error during a harness run or a bundle replay check.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Canon(#[from] CanonError),
    #[error(transparent)]
    Bundle(#[from] BundleBuildError),
    #[error(transparent)]
    Verify(#[from] BundleVerifyError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    /// The plan replayed cleanly but ended in another state.
    #[error("plan replays to {actual}, expected {expected}")]
    PlanDivergence { expected: String, actual: String },
    /// The replayed end state does not satisfy the scenario goal.
    #[error("plan ends in {state_key}, which is not a goal state")]
    GoalNotSatisfied { state_key: String },
    #[error("bundle has no {name}")]
    MissingArtifact { name: String },
    #[error("{name} is malformed: {detail}")]
    MalformedArtifact { name: String, detail: String },
}

/// Everything a harness run produced.
#[derive(Debug)]
pub struct RunResult {
    pub outcome: SearchOutcome,
    /// The shallowest goal node, if any was found.
    pub goal: Option<NodeId>,
    /// Actions from the root to `goal`. Empty when `goal` is `None` or the
    /// root itself is a goal.
    pub plan: Vec<Action>,
    pub bundle: ArtifactBundle,
}

/// Search `scenario` with its own policy and bundle the result.
///
/// # Errors
///
/// Returns [`RunError`] if the search fails, the plan does not replay to
/// the goal node's state, or bundling fails.
pub fn run_scenario(scenario: &Scenario) -> Result<RunResult, RunError> {
    tracing::info!(
        world = %scenario.name,
        objects = scenario.roster.len(),
        max_nodes = scenario.policy.max_nodes,
        "running scenario"
    );

    let engine = SearchEngine::new(&scenario.roster, scenario.policy.clone());
    let outcome = engine.run(scenario.initial.clone(), &scenario.goal)?;
    let graph = &outcome.graph;

    let goal = best_goal(graph);
    let (plan, final_state_key) = match goal {
        Some(id) => {
            let plan = plan_to(graph, id)?;
            let expected = graph.get(id)?.state_key.clone();
            match verify_plan(&scenario.roster, &scenario.initial, &plan, &expected)? {
                ReplayVerdict::Match => {}
                ReplayVerdict::Divergence { expected, actual } => {
                    return Err(RunError::PlanDivergence { expected, actual });
                }
            }
            (plan, Some(expected))
        }
        None => (Vec::new(), None),
    };

    let scenario_bytes = canonical_json_bytes(&scenario.to_json_value())?;
    let graph_bytes = graph.to_canonical_json_bytes()?;
    let plan_bytes =
        canonical_json_bytes(&plan_json(&scenario.roster, goal, &plan, final_state_key))?;

    let scenario_hash = canonical_hash(HashDomain::BundleArtifact, &scenario_bytes);
    let graph_hash = canonical_hash(HashDomain::BundleArtifact, &graph_bytes);
    let plan_hash = canonical_hash(HashDomain::BundleArtifact, &plan_bytes);

    let goal_paths = all_goal_paths(graph)?;
    let stats = graph.stats();
    let replay = if goal.is_some() { "match" } else { "no_plan" };
    let report = serde_json::json!({
        "goal_paths": goal_paths.iter().map(goal_path_json).collect::<Vec<_>>(),
        "goal_reached": goal.is_some(),
        "pending": outcome.pending.iter().map(|id| id.index()).collect::<Vec<_>>(),
        "plan_digest": plan_hash.as_str(),
        "plan_length": plan.len(),
        "replay": replay,
        "scenario_digest": scenario_hash.as_str(),
        "search_graph_digest": graph_hash.as_str(),
        "stats": stats.to_json_value(),
        "termination": graph.termination().to_json_value(),
        "world": scenario.name,
    });
    let report_bytes = canonical_json_bytes(&report)?;

    let bundle = build_bundle(vec![
        ArtifactInput {
            name: SCENARIO_ARTIFACT.into(),
            content: scenario_bytes,
            normative: true,
            precomputed_hash: Some(scenario_hash),
        },
        ArtifactInput {
            name: SEARCH_GRAPH_ARTIFACT.into(),
            content: graph_bytes,
            normative: true,
            precomputed_hash: Some(graph_hash),
        },
        ArtifactInput {
            name: PLAN_ARTIFACT.into(),
            content: plan_bytes,
            normative: true,
            precomputed_hash: Some(plan_hash),
        },
        ArtifactInput {
            name: REPORT_ARTIFACT.into(),
            content: report_bytes,
            normative: true,
            precomputed_hash: None,
        },
    ])?;

    tracing::info!(
        world = %scenario.name,
        termination = %graph.termination(),
        nodes = stats.total_nodes,
        goals = stats.goal_nodes,
        plan_length = plan.len(),
        digest = %bundle.digest,
        "bundle built"
    );

    Ok(RunResult {
        outcome,
        goal,
        plan,
        bundle,
    })
}

fn goal_path_json(path: &GoalPath) -> serde_json::Value {
    serde_json::json!({
        "actions": path.actions.iter().map(Action::to_json_value).collect::<Vec<_>>(),
        "depth": path.depth,
        "goal_node": path.goal.index(),
    })
}

fn plan_json(
    roster: &Roster,
    goal: Option<NodeId>,
    plan: &[Action],
    final_state_key: Option<String>,
) -> serde_json::Value {
    serde_json::json!({
        "actions": plan.iter().map(Action::to_json_value).collect::<Vec<_>>(),
        "descriptions": plan.iter().map(|a| a.describe(roster)).collect::<Vec<_>>(),
        "final_state_key": final_state_key,
        "goal_node": goal.map(NodeId::index),
    })
}

/// Result of [`verify_bundle_replay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayCheck {
    /// The run found no goal, so there is nothing to replay.
    NoPlan,
    /// The plan replays from the scenario's initial state to its recorded
    /// final state, and that state satisfies the scenario goal.
    Verified { steps: usize },
}

/// Integrity check plus semantic replay of a bundle.
///
/// Runs [`verify_bundle`], then rebuilds the scenario from `scenario.json`
/// and replays `plan.json` through the kernel's `apply()`.
///
/// # Errors
///
/// Returns [`RunError`] on any integrity failure, a malformed artifact, a
/// rejected plan step, a divergent end state, or an end state that is not a
/// goal.
pub fn verify_bundle_replay(bundle: &ArtifactBundle) -> Result<ReplayCheck, RunError> {
    verify_bundle(bundle)?;

    let scenario = Scenario::from_json_bytes(&artifact(bundle, SCENARIO_ARTIFACT)?.content)?;
    let plan: serde_json::Value = serde_json::from_slice(&artifact(bundle, PLAN_ARTIFACT)?.content)
        .map_err(|e| malformed(PLAN_ARTIFACT, e.to_string()))?;

    let Some(expected) = plan.get("final_state_key").and_then(serde_json::Value::as_str) else {
        return Ok(ReplayCheck::NoPlan);
    };

    let actions = plan
        .get("actions")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| malformed(PLAN_ARTIFACT, "\"actions\" is not an array"))?
        .iter()
        .enumerate()
        .map(|(i, value)| {
            Action::from_json_value(value)
                .ok_or_else(|| malformed(PLAN_ARTIFACT, format!("actions[{i}] is not an action")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let end = replay_plan(&scenario.roster, &scenario.initial, &actions)?;
    let actual = end.canonical_key();
    if actual != expected {
        return Err(RunError::PlanDivergence {
            expected: expected.to_string(),
            actual,
        });
    }
    if !scenario.goal.is_goal(&end) {
        return Err(RunError::GoalNotSatisfied { state_key: actual });
    }

    tracing::info!(world = %scenario.name, steps = actions.len(), "plan replay verified");
    Ok(ReplayCheck::Verified {
        steps: actions.len(),
    })
}

fn artifact<'b>(
    bundle: &'b ArtifactBundle,
    name: &str,
) -> Result<&'b BundleArtifact, RunError> {
    bundle.get(name).ok_or_else(|| RunError::MissingArtifact {
        name: name.to_string(),
    })
}

fn malformed(name: &str, detail: impl Into<String>) -> RunError {
    RunError::MalformedArtifact {
        name: name.to_string(),
        detail: detail.into(),
    }
}
