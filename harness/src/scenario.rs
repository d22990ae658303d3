//! Scenario files: a roster, a starting state, a goal and an optional policy.
//!
//! ```json
//! {
//!   "name": "two_blocks",
//!   "objects": [{"id": 1, "name": "A", "shape": "block"}],
//!   "initial": [{"id": 1, "support": "0", "lying": false}],
//!   "goal": {"requires": [{"id": 1, "lying": true}]},
//!   "policy": {"max_nodes": 0, "max_depth": null}
//! }
//! ```
//!
//! `goal` is either `{"exact": [placements]}` or `{"requires": [..]}` where
//! each requirement names an object and optionally its `support` and/or
//! `lying` flag. Supports use the canonical-key rendering (`"0"`, `"2"`,
//! `"3@hole"`); bare integers are accepted for the table and top surfaces.
//! `anchors` on an object replaces its shape's default anchors. Every
//! `policy` field is optional.
//!
//! Parsing walks `serde_json::Value` by hand so error messages can name the
//! offending field.

use stackplan_kernel::carrier::roster::{ObjectId, ObjectSpec, Roster, RosterError, Shape};
use stackplan_kernel::carrier::state::{Placement, Support, WorldState};
use stackplan_kernel::error::WorldError;
use stackplan_search::contract::{ExactGoal, GoalPredicate, GoalRequirement, SupportGoal};
use stackplan_search::policy::SearchPolicy;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field {field}")]
    MissingField { field: String },
    #[error("invalid field {field}: {detail}")]
    InvalidField { field: String, detail: String },
    #[error("unknown shape {tag:?}")]
    UnknownShape { tag: String },
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("no built-in world named {name:?}")]
    UnknownWorld { name: String },
}

/// What the search is looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalSpec {
    /// One fully specified state.
    Exact { target: WorldState, goal: ExactGoal },
    /// Constraints on some objects only.
    Partial(SupportGoal),
}

impl GoalSpec {
    #[must_use]
    pub fn exact(target: WorldState) -> Self {
        let goal = ExactGoal::new(&target);
        Self::Exact { target, goal }
    }

    #[must_use]
    pub fn to_json_value(&self) -> Value {
        match self {
            Self::Exact { target, .. } => serde_json::json!({ "exact": target.to_json_value() }),
            Self::Partial(goal) => {
                let requires: Vec<Value> = goal
                    .requirements()
                    .iter()
                    .map(|req| {
                        let mut entry = serde_json::Map::new();
                        entry.insert("id".into(), Value::from(req.object.get()));
                        if let Some(support) = &req.support {
                            entry.insert("support".into(), Value::from(support.to_string()));
                        }
                        if let Some(lying) = req.lying {
                            entry.insert("lying".into(), Value::from(lying));
                        }
                        Value::Object(entry)
                    })
                    .collect();
                serde_json::json!({ "requires": requires })
            }
        }
    }
}

impl GoalPredicate for GoalSpec {
    fn is_goal(&self, state: &WorldState) -> bool {
        match self {
            Self::Exact { goal, .. } => goal.is_goal(state),
            Self::Partial(goal) => goal.is_goal(state),
        }
    }
}

/// A fully validated planning problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub roster: Roster,
    pub initial: WorldState,
    pub goal: GoalSpec,
    pub policy: SearchPolicy,
}

impl Scenario {
    /// Parse and validate scenario JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] for malformed JSON, missing or mistyped
    /// fields, an invalid roster, or a state the roster rejects.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ScenarioError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_json_value(&value)
    }

    /// See [`Scenario::from_json_bytes`].
    ///
    /// # Errors
    ///
    /// Same as [`Scenario::from_json_bytes`], minus JSON syntax errors.
    pub fn from_json_value(value: &Value) -> Result<Self, ScenarioError> {
        let name = field(value, "name")?
            .as_str()
            .ok_or_else(|| invalid("name", "expected a string"))?
            .to_string();

        let objects = array(value, "objects")?
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_object(entry, &format!("objects[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;
        let roster = Roster::new(objects)?;

        let initial = parse_state(&roster, array(value, "initial")?, "initial")?;

        let goal_value = field(value, "goal")?;
        let goal = if let Some(exact) = goal_value.get("exact") {
            let items = exact
                .as_array()
                .ok_or_else(|| invalid("goal.exact", "expected an array"))?;
            GoalSpec::exact(parse_state(&roster, items, "goal.exact")?)
        } else if let Some(requires) = goal_value.get("requires") {
            let items = requires
                .as_array()
                .ok_or_else(|| invalid("goal.requires", "expected an array"))?;
            let mut goal = SupportGoal::new();
            for (i, item) in items.iter().enumerate() {
                goal = goal.with_requirement(parse_requirement(item, &format!("goal.requires[{i}]"))?);
            }
            GoalSpec::Partial(goal)
        } else {
            return Err(invalid("goal", "expected \"exact\" or \"requires\""));
        };

        let policy = match value.get("policy") {
            None | Some(Value::Null) => SearchPolicy::default(),
            Some(policy) => parse_policy(policy)?,
        };

        Ok(Self {
            name,
            roster,
            initial,
            goal,
            policy,
        })
    }

    /// Normalised JSON form; parses back to an equal scenario.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        let objects: Vec<Value> = self
            .roster
            .iter()
            .map(|spec| {
                serde_json::json!({
                    "anchors": spec.anchors,
                    "id": spec.id.get(),
                    "name": spec.name,
                    "shape": spec.shape.as_str(),
                })
            })
            .collect();
        serde_json::json!({
            "goal": self.goal.to_json_value(),
            "initial": self.initial.to_json_value(),
            "name": self.name,
            "objects": objects,
            "policy": self.policy.to_json_value(),
        })
    }
}

fn invalid(field: &str, detail: impl Into<String>) -> ScenarioError {
    ScenarioError::InvalidField {
        field: field.to_string(),
        detail: detail.into(),
    }
}

fn field<'v>(value: &'v Value, name: &str) -> Result<&'v Value, ScenarioError> {
    value.get(name).ok_or_else(|| ScenarioError::MissingField {
        field: name.to_string(),
    })
}

fn array<'v>(value: &'v Value, name: &str) -> Result<&'v Vec<Value>, ScenarioError> {
    field(value, name)?
        .as_array()
        .ok_or_else(|| invalid(name, "expected an array"))
}

fn object_id(value: &Value, path: &str) -> Result<ObjectId, ScenarioError> {
    let raw = field(value, "id")
        .map_err(|_| ScenarioError::MissingField {
            field: format!("{path}.id"),
        })?
        .as_u64()
        .and_then(|raw| u32::try_from(raw).ok())
        .ok_or_else(|| invalid(&format!("{path}.id"), "expected a non-negative 32-bit integer"))?;
    Ok(ObjectId::new(raw))
}

fn parse_support(value: &Value, path: &str) -> Result<Support, ScenarioError> {
    let parsed = match value {
        Value::String(text) => Support::parse(text),
        Value::Number(n) => n
            .as_u64()
            .and_then(|raw| u32::try_from(raw).ok())
            .and_then(|raw| Support::parse(&raw.to_string())),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(path, format!("not a support: {value}")))
}

fn parse_lying(value: &Value, path: &str) -> Result<bool, ScenarioError> {
    match value.get("lying") {
        None | Some(Value::Null) => Ok(false),
        Some(flag) => flag
            .as_bool()
            .ok_or_else(|| invalid(&format!("{path}.lying"), "expected a boolean")),
    }
}

fn parse_object(value: &Value, path: &str) -> Result<ObjectSpec, ScenarioError> {
    let id = object_id(value, path)?;
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(&format!("{path}.name"), "expected a string"))?;
    let tag = value
        .get("shape")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(&format!("{path}.shape"), "expected a string"))?;
    let shape = Shape::parse(tag).ok_or_else(|| ScenarioError::UnknownShape {
        tag: tag.to_string(),
    })?;

    let mut spec = ObjectSpec::new(id.get(), name, shape);
    if let Some(anchors) = value.get("anchors") {
        let anchors = anchors
            .as_array()
            .ok_or_else(|| invalid(&format!("{path}.anchors"), "expected an array"))?;
        spec.anchors = anchors
            .iter()
            .map(|a| {
                a.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(&format!("{path}.anchors"), "expected strings"))
            })
            .collect::<Result<_, _>>()?;
    }
    Ok(spec)
}

fn parse_state(roster: &Roster, items: &[Value], path: &str) -> Result<WorldState, ScenarioError> {
    let placements = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = format!("{path}[{i}]");
            let id = object_id(item, &item_path)?;
            let support = parse_support(
                item.get("support").ok_or_else(|| ScenarioError::MissingField {
                    field: format!("{item_path}.support"),
                })?,
                &format!("{item_path}.support"),
            )?;
            let lying = parse_lying(item, &item_path)?;
            Ok((id, Placement { support, lying }))
        })
        .collect::<Result<Vec<_>, ScenarioError>>()?;
    Ok(WorldState::new(roster, placements)?)
}

fn parse_requirement(value: &Value, path: &str) -> Result<GoalRequirement, ScenarioError> {
    let object = object_id(value, path)?;
    let support = match value.get("support") {
        None | Some(Value::Null) => None,
        Some(s) => Some(parse_support(s, &format!("{path}.support"))?),
    };
    let lying = match value.get("lying") {
        None | Some(Value::Null) => None,
        Some(_) => Some(parse_lying(value, path)?),
    };
    Ok(GoalRequirement {
        object,
        support,
        lying,
    })
}

fn parse_policy(value: &Value) -> Result<SearchPolicy, ScenarioError> {
    let mut policy = SearchPolicy::default();
    if let Some(max_nodes) = value.get("max_nodes") {
        policy.max_nodes = max_nodes
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| invalid("policy.max_nodes", "expected a non-negative integer"))?;
    }
    match value.get("max_depth") {
        None | Some(Value::Null) => {}
        Some(depth) => {
            policy.max_depth = Some(
                depth
                    .as_u64()
                    .and_then(|d| u32::try_from(d).ok())
                    .ok_or_else(|| invalid("policy.max_depth", "expected a non-negative integer"))?,
            );
        }
    }
    for (name, slot) in [
        ("stop_at_first_goal", &mut policy.stop_at_first_goal),
        ("expand_goal_nodes", &mut policy.expand_goal_nodes),
    ] {
        if let Some(flag) = value.get(name) {
            *slot = flag
                .as_bool()
                .ok_or_else(|| invalid(&format!("policy.{name}"), "expected a boolean"))?;
        }
    }
    Ok(policy)
}
