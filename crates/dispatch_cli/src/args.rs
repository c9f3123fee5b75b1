use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dispatch_core::DispatchConfig;

#[derive(Parser)]
#[command(
    name = "dispatch-sim",
    about = "Drive the ride-hailing dispatch core from the command line",
    long_about = "Seeds a scenario, runs dispatch and tick rounds, and prints the\n\
                  results as JSON. Log verbosity follows RUST_LOG."
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Seed a scenario and alternate dispatch/tick until every request settles
    Run {
        /// Scenario JSON file; the built-in sample data when omitted
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Upper bound on dispatch + tick rounds
        #[arg(long, default_value_t = 10_000)]
        max_steps: u64,
    },
    /// Load the sample data and run a single dispatch pass
    Sample,
    /// Print the effective configuration
    Config,
}

/// Configuration sources, lowest precedence first: defaults, `--config` file,
/// then each flag or its environment variable.
#[derive(Args)]
pub struct SettingsArgs {
    /// JSON file with any subset of the configuration fields
    #[arg(long, env = "DISPATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Distance weight (alpha)
    #[arg(long, env = "DISPATCH_ALPHA", global = true)]
    pub alpha: Option<f64>,

    /// Load weight (beta)
    #[arg(long, env = "DISPATCH_BETA", global = true)]
    pub beta: Option<f64>,

    /// Probability in [0, 1] that a driver rejects an assignment
    #[arg(long, env = "REJECTION_RATE", global = true)]
    pub rejection_rate: Option<f64>,

    /// Grid units travelled per tick
    #[arg(long, env = "MOVE_SPEED", global = true)]
    pub move_speed: Option<f64>,

    /// Guard the store with a lock; `false` is for single-threaded benchmarking
    #[arg(long, env = "ENABLE_THREADING_LOCK", global = true)]
    pub threading_lock: Option<bool>,

    /// Seed for the rejection RNG
    #[arg(long, env = "DISPATCH_SEED", global = true)]
    pub seed: Option<u64>,
}

impl SettingsArgs {
    pub fn resolve(&self) -> Result<DispatchConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => DispatchConfig::default(),
        };

        if let Some(alpha) = self.alpha {
            config.distance_weight = alpha;
        }
        if let Some(beta) = self.beta {
            config.load_weight = beta;
        }
        if let Some(rate) = self.rejection_rate {
            config.rejection_rate = rate;
        }
        if let Some(speed) = self.move_speed {
            config.move_speed = speed;
        }
        if let Some(enabled) = self.threading_lock {
            config.concurrency_guard = enabled;
        }
        if let Some(seed) = self.seed {
            config.rejection_seed = Some(seed);
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}
