//! Runs every built-in world through the harness and prints deterministic
//! `key=value` lines for cross-process comparison.
//!
//! Usage: `search_fixture`

use stackplan_harness::bundle::SEARCH_GRAPH_ARTIFACT;
use stackplan_harness::runner::run_scenario;
use stackplan_harness::worlds::builtin_worlds;

fn main() -> anyhow::Result<()> {
    for world in builtin_worlds() {
        let id = world.world_id();
        let scenario = world.scenario()?;
        let result = run_scenario(&scenario)?;
        let graph = &result.outcome.graph;
        let artifact = result
            .bundle
            .get(SEARCH_GRAPH_ARTIFACT)
            .ok_or_else(|| anyhow::anyhow!("{id}: bundle has no {SEARCH_GRAPH_ARTIFACT}"))?;

        println!("{id}.bundle_digest={}", result.bundle.digest);
        println!("{id}.graph_digest={}", graph.digest()?);
        println!("{id}.search_graph_artifact={}", artifact.content_hash);
        println!("{id}.termination={}", graph.termination());
        println!("{id}.nodes={}", graph.len());
        println!("{id}.expansions={}", graph.metadata().expansions);
        println!("{id}.plan_length={}", result.plan.len());
    }
    Ok(())
}
