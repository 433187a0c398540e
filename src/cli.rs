use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Station occupancy Markov model.
#[derive(Parser)]
#[command(
    name = "statesim",
    version,
    about = "Learn and simulate a four-state station occupancy Markov chain"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Learn the transition model from collected snapshots.
    Learn(LearnArgs),
    /// Learn the model, then simulate and aggregate occupancy.
    Run(RunArgs),
    /// Simulate occupancy from a previously saved model.
    Simulate(SimulateArgs),
}

/// Arguments for the `learn` subcommand.
#[derive(clap::Args)]
pub struct LearnArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "statesim.toml")]
    pub config: PathBuf,

    /// Override output directory from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "statesim.toml")]
    pub config: PathBuf,

    /// Override output directory from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override simulation seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Arguments for the `simulate` subcommand.
#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "statesim.toml")]
    pub config: PathBuf,

    /// Saved transition probability table.
    #[arg(long)]
    pub probs: PathBuf,

    /// Saved initial distribution table.
    #[arg(long)]
    pub initial: PathBuf,

    /// Override output directory from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override simulation seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}
