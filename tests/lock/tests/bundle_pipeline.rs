//! Bundle lock tests through the full harness pipeline: run, write the
//! directory, read it back, verify, replay.

use stackplan_harness::bundle::{
    verify_bundle, BundleVerifyError, PLAN_ARTIFACT, REPORT_ARTIFACT, SCENARIO_ARTIFACT,
    SEARCH_GRAPH_ARTIFACT,
};
use stackplan_harness::bundle_dir::{
    read_bundle_dir, verify_bundle_dir, write_bundle_dir, BundleDirReadError, BundleDirVerifyError,
};
use stackplan_harness::runner::{run_scenario, verify_bundle_replay, ReplayCheck, RunResult};
use stackplan_harness::scenario::Scenario;
use stackplan_harness::worlds::{builtin_worlds, load_builtin};
use stackplan_kernel::proof::canon::is_canonical_json;

fn run(world: &str) -> RunResult {
    run_scenario(&load_builtin(world).unwrap()).unwrap()
}

#[test]
fn every_world_bundle_round_trips_through_a_directory() {
    for world in builtin_worlds() {
        let result = run(world.world_id());
        let dir = tempfile::tempdir().unwrap();
        write_bundle_dir(&result.bundle, dir.path()).unwrap();

        let loaded = verify_bundle_dir(dir.path()).unwrap();
        assert_eq!(loaded, result.bundle, "{}", world.world_id());
        assert!(matches!(
            verify_bundle_replay(&loaded).unwrap(),
            ReplayCheck::Verified { .. }
        ));
    }
}

#[test]
fn all_run_artifacts_are_normative_canonical_json() {
    let result = run("tower_reversal");
    let names: Vec<&str> = result.bundle.artifacts.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![PLAN_ARTIFACT, REPORT_ARTIFACT, SCENARIO_ARTIFACT, SEARCH_GRAPH_ARTIFACT]
    );
    for artifact in result.bundle.artifacts.values() {
        assert!(artifact.normative, "{}", artifact.name);
        assert!(is_canonical_json(&artifact.content), "{}", artifact.name);
    }
}

#[test]
fn report_binds_the_other_artifacts() {
    let result = run("two_blocks");
    let report: serde_json::Value =
        serde_json::from_slice(&result.bundle.get(REPORT_ARTIFACT).unwrap().content).unwrap();
    for (field, name) in [
        ("scenario_digest", SCENARIO_ARTIFACT),
        ("search_graph_digest", SEARCH_GRAPH_ARTIFACT),
        ("plan_digest", PLAN_ARTIFACT),
    ] {
        assert_eq!(
            report[field].as_str().unwrap(),
            result.bundle.get(name).unwrap().content_hash.as_str()
        );
    }
    assert_eq!(report["world"], "two_blocks");
    assert_eq!(report["plan_length"], 1);
    assert_eq!(report["stats"]["total_nodes"], 8);
}

#[test]
fn scenario_artifact_rebuilds_the_scenario() {
    let scenario = load_builtin("ring_and_peg").unwrap();
    let result = run_scenario(&scenario).unwrap();
    let rebuilt =
        Scenario::from_json_bytes(&result.bundle.get(SCENARIO_ARTIFACT).unwrap().content).unwrap();
    assert_eq!(rebuilt, scenario);
}

#[test]
fn tampered_graph_file_fails_verification() {
    let result = run("two_blocks");
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&result.bundle, dir.path()).unwrap();

    let path = dir.path().join(SEARCH_GRAPH_ARTIFACT);
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.extend_from_slice(b" ");
    std::fs::write(&path, bytes).unwrap();

    let err = verify_bundle_dir(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        BundleDirVerifyError::Verify(BundleVerifyError::ContentHashMismatch { .. })
    ));
}

#[test]
fn undeclared_file_fails_read() {
    let result = run("two_blocks");
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&result.bundle, dir.path()).unwrap();
    std::fs::write(dir.path().join("extra.json"), b"{}").unwrap();

    let err = read_bundle_dir(dir.path()).unwrap_err();
    assert!(matches!(err, BundleDirReadError::ExtraFile { .. }));
}

#[test]
fn rewriting_a_directory_is_idempotent() {
    let result = run("tower_reversal");
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&result.bundle, dir.path()).unwrap();
    write_bundle_dir(&result.bundle, dir.path()).unwrap();
    let loaded = read_bundle_dir(dir.path()).unwrap();
    verify_bundle(&loaded).unwrap();
    assert_eq!(loaded.digest, result.bundle.digest);
}

#[test]
fn scenario_file_runs_like_the_builtin_world() {
    let scenario = load_builtin("two_blocks").unwrap();
    let json = serde_json::to_vec_pretty(&scenario.to_json_value()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two_blocks.json");
    std::fs::write(&path, json).unwrap();

    let from_file = Scenario::from_json_bytes(&std::fs::read(&path).unwrap()).unwrap();
    let a = run_scenario(&scenario).unwrap();
    let b = run_scenario(&from_file).unwrap();
    assert_eq!(a.bundle.digest, b.bundle.digest);
}
