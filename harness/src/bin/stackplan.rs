//! `stackplan`: run a planning scenario, write its bundle, verify bundles.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use stackplan_harness::bundle_dir::{verify_bundle_dir, write_bundle_dir};
use stackplan_harness::runner::{run_scenario, verify_bundle_replay, ReplayCheck, RunResult};
use stackplan_harness::scenario::Scenario;
use stackplan_harness::worlds::{builtin_worlds, load_builtin};
use stackplan_search::path::{all_goal_paths, path_to};

#[derive(Parser, Debug)]
#[command(author, version, about = "Breadth-first planner for stacking worlds", long_about = None)]
struct Cli {
    /// Output format for stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search a scenario and print the plan.
    Run(RunArgs),
    /// Check a bundle directory and replay its plan.
    Verify(VerifyArgs),
    /// List the built-in worlds.
    Worlds,
}

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["world", "scenario"])))]
struct RunArgs {
    /// Built-in world name (see `stackplan worlds`).
    #[arg(long)]
    world: Option<String>,
    /// Scenario JSON file.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Node budget; 0 means unbounded.
    #[arg(long)]
    max_nodes: Option<usize>,
    /// Do not expand nodes at this depth.
    #[arg(long)]
    max_depth: Option<u32>,
    #[arg(long)]
    stop_at_first_goal: bool,
    #[arg(long)]
    expand_goals: bool,
    /// Write the artifact bundle to this directory.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also list every node discovered at this depth (text output).
    #[arg(long)]
    show_depth: Option<u32>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Bundle directory written by `stackplan run --out`.
    dir: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run(&args, cli.format),
        Commands::Verify(args) => verify(&args.dir, cli.format),
        Commands::Worlds => {
            list_worlds(cli.format);
            Ok(())
        }
    }
}

fn load_scenario(args: &RunArgs) -> anyhow::Result<Scenario> {
    let mut scenario = match (&args.world, &args.scenario) {
        (Some(name), None) => load_builtin(name)?,
        (None, Some(path)) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Scenario::from_json_bytes(&bytes)
                .with_context(|| format!("loading scenario {}", path.display()))?
        }
        _ => bail!("pass exactly one of --world or --scenario"),
    };

    if let Some(max_nodes) = args.max_nodes {
        scenario.policy.max_nodes = max_nodes;
    }
    if args.max_depth.is_some() {
        scenario.policy.max_depth = args.max_depth;
    }
    scenario.policy.stop_at_first_goal |= args.stop_at_first_goal;
    scenario.policy.expand_goal_nodes |= args.expand_goals;
    Ok(scenario)
}

fn run(args: &RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let scenario = load_scenario(args)?;
    let result = run_scenario(&scenario).context("search run failed")?;

    if let Some(dir) = &args.out {
        write_bundle_dir(&result.bundle, dir)
            .with_context(|| format!("writing bundle to {}", dir.display()))?;
    }

    match format {
        OutputFormat::Text => print_run_text(&scenario, &result, args.show_depth)?,
        OutputFormat::Json => {
            let report = result
                .bundle
                .get(stackplan_harness::bundle::REPORT_ARTIFACT)
                .context("bundle has no report")?;
            println!("{}", String::from_utf8_lossy(&report.content));
        }
    }
    Ok(())
}

fn print_run_text(
    scenario: &Scenario,
    result: &RunResult,
    show_depth: Option<u32>,
) -> anyhow::Result<()> {
    let graph = &result.outcome.graph;
    let stats = graph.stats();
    println!("world:       {}", scenario.name);
    println!("termination: {}", graph.termination());
    println!(
        "nodes:       {} ({} goal, max depth {})",
        stats.total_nodes, stats.goal_nodes, stats.max_depth
    );
    match result.goal {
        Some(goal) => {
            println!("plan:        {} step(s) to node {goal}", result.plan.len());
            for node in path_to(graph, goal)?.iter().skip(1) {
                println!("  {}. {}", node.depth, node.description);
            }
        }
        None => println!("plan:        none"),
    }
    let goal_paths = all_goal_paths(graph)?;
    if goal_paths.len() > 1 {
        println!("other goals:");
        for path in goal_paths.iter().filter(|p| Some(p.goal) != result.goal) {
            println!("  node {} at depth {}", path.goal, path.depth);
        }
    }
    if let Some(depth) = show_depth {
        println!("depth {depth}:");
        for node in graph.nodes_at_depth(depth) {
            let marker = if node.is_goal { " (goal)" } else { "" };
            println!("  node {}: {}{marker}", node.id, node.state_key);
        }
    }
    println!("digest:      {}", result.bundle.digest);
    Ok(())
}

fn verify(dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let bundle =
        verify_bundle_dir(dir).with_context(|| format!("verifying {}", dir.display()))?;
    let check = verify_bundle_replay(&bundle).context("replaying bundle plan")?;

    let replay = match check {
        ReplayCheck::NoPlan => "no plan".to_string(),
        ReplayCheck::Verified { steps } => format!("{steps} step(s) verified"),
    };
    match format {
        OutputFormat::Text => {
            println!("digest: {}", bundle.digest);
            println!("replay: {replay}");
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "digest": bundle.digest.as_str(), "replay": replay })
        ),
    }
    Ok(())
}

fn list_worlds(format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for world in builtin_worlds() {
                println!("{:<16} {}", world.world_id(), world.summary());
            }
        }
        OutputFormat::Json => {
            let worlds: Vec<serde_json::Value> = builtin_worlds()
                .into_iter()
                .map(|w| serde_json::json!({ "id": w.world_id(), "summary": w.summary() }))
                .collect();
            println!("{}", serde_json::Value::Array(worlds));
        }
    }
}
