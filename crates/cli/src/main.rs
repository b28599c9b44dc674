use anyhow::{bail, Context, Result};
use bugnav::driver::Path as RobotPath;
use bugnav::prelude::*;
use bugnav::scenario::rand::{draw_field, FieldCfg, ReplayToken, VertexCount};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod output;
mod provenance;

use provenance::{write_sidecar, Provenance};

#[derive(Parser)]
#[command(name = "bugnav")]
#[command(about = "Run bug-style navigation scenarios")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Run one scenario and write the path as CSV (plus provenance sidecar)
    Run {
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Override the scenario's policy (a, b, c)
        #[arg(long)]
        policy: Option<PolicyKind>,
        /// Override the scenario's step cap
        #[arg(long)]
        max_steps: Option<usize>,
    },
    /// Write a random obstacle field as a scenario JSON
    Sample {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
        #[arg(long, default_value_t = 6)]
        obstacles: usize,
        #[arg(long, default_value_t = 0.1)]
        clearance: f64,
        #[arg(long, default_value_t = 3)]
        min_vertices: usize,
        #[arg(long, default_value_t = 8)]
        max_vertices: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Run all three policies on one scenario and print a JSON table
    Compare {
        #[arg(long)]
        scenario: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            scenario,
            out,
            policy,
            max_steps,
        } => run(&scenario, &out, policy, max_steps),
        Action::Sample {
            seed,
            index,
            obstacles,
            clearance,
            min_vertices,
            max_vertices,
            out,
        } => {
            let cfg = FieldCfg {
                obstacle_count: obstacles,
                clearance,
                vertex_count: VertexCount::Uniform {
                    min: min_vertices,
                    max: max_vertices,
                },
                ..FieldCfg::default()
            };
            sample(&cfg, ReplayToken::new(seed, index), &out)
        }
        Action::Compare { scenario } => compare(&scenario),
        Action::Report => report(),
    }
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
}

fn summary_json(policy: PolicyKind, s: &RunSummary) -> Value {
    let (outcome, reason) = match s.outcome {
        Outcome::Succeeded(_) => ("succeeded", None),
        Outcome::Failed(r) => ("failed", Some(r.to_string())),
    };
    json!({
        "policy": policy.name(),
        "outcome": outcome,
        "reason": reason,
        "steps": s.steps,
        "episodes": s.episodes,
        "path_length": s.path_length,
        "final_position": s.final_position,
    })
}

fn run_one(
    scenario: &Scenario,
    policy: PolicyKind,
    max_steps: usize,
) -> Result<(RobotPath, RunSummary)> {
    let mut session: NavigationSession = scenario
        .session_with_policy(policy)
        .context("building session")?;
    let mut path = RobotPath::new();
    let summary = drive(&mut session, &mut path, max_steps);
    Ok((path, summary))
}

fn run(
    scenario_path: &Path,
    out: &Path,
    policy: Option<PolicyKind>,
    max_steps: Option<usize>,
) -> Result<()> {
    let scenario = load_scenario(scenario_path)?;
    let policy = policy.unwrap_or(scenario.config.policy);
    let max_steps = max_steps.unwrap_or(scenario.config.max_steps);
    if max_steps == 0 {
        bail!("--max-steps must be > 0");
    }
    tracing::info!(scenario = %scenario_path.display(), %policy, max_steps, "run");
    let (path, summary) = run_one(&scenario, policy, max_steps)?;
    output::write_path_csv(&path, out)?;
    let row = summary_json(policy, &summary);
    let prov = Provenance::new(json!({
        "scenario": scenario_path.to_string_lossy(),
        "policy": policy.name(),
        "max_steps": max_steps,
        "config": scenario.config,
        "summary": row,
    }))
    .output(out);
    write_sidecar(out, &prov)?;
    println!("{}", serde_json::to_string_pretty(&row)?);
    Ok(())
}

fn sample(cfg: &FieldCfg, tok: ReplayToken, out: &Path) -> Result<()> {
    let scenario = draw_field(cfg, &NavConfig::default(), tok).context("drawing field")?;
    output::ensure_parent(out)?;
    fs::write(out, serde_json::to_vec_pretty(&scenario)?)
        .with_context(|| format!("writing {}", out.display()))?;
    let prov = Provenance::new(json!({
        "seed": tok.seed,
        "index": tok.index,
        "field": cfg,
    }))
    .output(out);
    write_sidecar(out, &prov)?;
    tracing::info!(obstacles = scenario.obstacles.len(), out = %out.display(), "sample");
    Ok(())
}

fn compare(scenario_path: &Path) -> Result<()> {
    let scenario = load_scenario(scenario_path)?;
    let rows = PolicyKind::ALL
        .into_iter()
        .map(|policy| {
            let (_, summary) = run_one(&scenario, policy, scenario.config.max_steps)?;
            Ok(summary_json(policy, &summary))
        })
        .collect::<Result<Vec<_>>>()?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "bugnav_version": bugnav::VERSION,
        "policies": PolicyKind::ALL.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "defaults": NavConfig::default(),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
