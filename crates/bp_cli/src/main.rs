//! Behavior Planner CLI
//!
//! Runs scenarios through the decision core and prints run summaries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bp_core::config::PlannerConfig;
use bp_core::sim::{RunReport, RunSummary, Scenario, ScenarioRunner};
use bp_core::BehaviorKind;

const DEFAULT_LOG_FILTER: &str = "bp_core=info,bp_cli=info";

#[derive(Parser)]
#[command(name = "bp_cli", version = bp_core::VERSION)]
#[command(about = "Run behavior planner scenarios", long_about = None)]
struct Cli {
    /// Log filter, overrides RUST_LOG (e.g. "bp_core=debug")
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario file
    Run {
        #[arg(long)]
        scenario: PathBuf,

        #[command(flatten)]
        planner: PlannerArgs,

        /// Include per-tick records in the JSON output
        #[arg(long, default_value = "false")]
        records: bool,
    },

    /// Run every scenario in a directory in parallel
    Batch {
        #[arg(long)]
        dir: PathBuf,

        #[command(flatten)]
        planner: PlannerArgs,
    },

    /// Run a generated scenario
    Random {
        #[arg(long, default_value = "0")]
        seed: u64,

        #[arg(long, default_value = "10")]
        actors: usize,

        #[command(flatten)]
        planner: PlannerArgs,
    },

    /// Print the behavior profile presets as YAML
    Presets,
}

#[derive(clap::Args, Clone)]
struct PlannerArgs {
    /// Behavior preset (cautious, normal, aggressive)
    #[arg(long)]
    behavior: Option<BehaviorKind>,

    /// Planner config file (.yaml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, default_value = "false")]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    match cli.command {
        Commands::Run { scenario, planner, records } => {
            let config = load_config(&planner)?;
            let scenario = Scenario::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let report = run_scenario(scenario, config)?;
            if planner.json {
                print_json(&report, records)?;
            } else {
                print_summary(&report.summary);
            }
        }

        Commands::Batch { dir, planner } => {
            let config = load_config(&planner)?;
            let files = scenario_files(&dir)?;
            info!("running {} scenarios from {}", files.len(), dir.display());

            let results: Vec<(PathBuf, Result<RunSummary>)> = files
                .into_par_iter()
                .map(|path| {
                    let summary = Scenario::load(&path)
                        .map_err(anyhow::Error::from)
                        .and_then(|scenario| run_scenario(scenario, config.clone()))
                        .map(|report| report.summary);
                    (path, summary)
                })
                .collect();

            let mut summaries = Vec::new();
            for (path, result) in results {
                match result {
                    Ok(summary) => summaries.push(summary),
                    Err(err) => warn!("{}: {:#}", path.display(), err),
                }
            }
            if planner.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                summaries.iter().for_each(print_summary);
            }
        }

        Commands::Random { seed, actors, planner } => {
            let config = load_config(&planner)?;
            let report = run_scenario(Scenario::random_traffic(seed, actors), config)?;
            if planner.json {
                print_json(&report, false)?;
            } else {
                print_summary(&report.summary);
            }
        }

        Commands::Presets => {
            for kind in BehaviorKind::ALL {
                println!("# {}", kind);
                print!("{}", serde_yaml::to_string(&kind.profile())?);
            }
        }
    }

    Ok(())
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Config file (or defaults) with the `--behavior` preset applied on top.
fn load_config(args: &PlannerArgs) -> Result<PlannerConfig> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(kind) = args.behavior {
        config.behavior = kind;
        config.profile = None;
    }
    Ok(config)
}

fn run_scenario(scenario: Scenario, config: PlannerConfig) -> Result<RunReport> {
    let name = scenario.name.clone();
    let runner = ScenarioRunner::new(scenario, config)
        .with_context(|| format!("preparing scenario {}", name))?;
    Ok(runner.run())
}

fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml") | Some("yml"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn print_json(report: &RunReport, with_records: bool) -> Result<()> {
    let text = if with_records {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string_pretty(&report.summary)?
    };
    println!("{}", text);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", summary.scenario);
    println!("   Ticks:        {}", summary.ticks);
    println!("   Distance:     {:.1} m", summary.distance);
    println!("   Final speed:  {:.1} km/h", summary.final_speed);
    println!("   Max speed:    {:.1} km/h", summary.max_speed);
    println!("   Plans issued: {}", summary.plans_issued);
    if summary.collisions.is_empty() {
        println!("   Collisions:   none");
    } else {
        println!("   Collisions:   {:?}", summary.collisions);
    }
    for (state, ticks) in &summary.states {
        println!("   {:<22}{}", state, ticks);
    }
}
