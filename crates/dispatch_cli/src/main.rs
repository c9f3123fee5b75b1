mod args;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dispatch_core::runner::run_until_settled;
use dispatch_core::scenario::ScenarioSpec;
use dispatch_core::{DispatchConfig, LockedStore, Simulation, StoreGuard, UnlockedStore};

use crate::args::{Cli, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.settings.resolve()?;

    if config.concurrency_guard {
        execute::<LockedStore>(config, &cli.command, cli.pretty)
    } else {
        info!("store lock disabled; single-threaded use only");
        execute::<UnlockedStore>(config, &cli.command, cli.pretty)
    }
}

fn execute<G: StoreGuard>(config: DispatchConfig, command: &Command, pretty: bool) -> Result<()> {
    let build = |config: DispatchConfig| {
        Simulation::<G>::with_guard(config).context("building simulation")
    };

    match command {
        Command::Config => print_json(&config, pretty),
        Command::Run {
            scenario,
            max_steps,
        } => {
            let spec = match scenario {
                Some(path) => read_scenario(path)?,
                None => ScenarioSpec::sample(),
            };
            let sim = build(config)?;
            let loaded = sim.load_scenario(&spec).context("loading scenario")?;
            info!(
                drivers = loaded.drivers.len(),
                requests = loaded.requests.len(),
                "running until settled"
            );
            let summary = run_until_settled(&sim, *max_steps);
            print_json(&summary, pretty)
        }
        Command::Sample => {
            let sim = build(config)?;
            let loaded = sim.load_sample_data().context("loading sample data")?;
            let outcomes = sim.dispatch();
            print_json(
                &json!({
                    "loaded": loaded,
                    "outcomes": outcomes,
                    "status": sim.status(),
                }),
                pretty,
            )
        }
    }
}

fn read_scenario(path: &Path) -> Result<ScenarioSpec> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
