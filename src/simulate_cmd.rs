//! Simulate command: run the chain from previously saved model tables.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use statesim_io::{CsvSink, read_initial_distribution, read_probabilities};
use statesim_markov::{OutputSink, aggregate, simulate};

use crate::cli::SimulateArgs;
use crate::config;
use crate::convert;

/// Simulate from saved tables and write the occupancy table.
pub fn run(args: SimulateArgs) -> Result<()> {
    let _cmd = info_span!("simulate").entered();
    let config = config::load(&args.config)?;
    let sim_cfg = convert::build_simulation_config(&config.model, args.seed)?;

    let matrix = read_probabilities(&args.probs)
        .with_context(|| format!("failed to read probabilities: {}", args.probs.display()))?;
    let initial = read_initial_distribution(&args.initial).with_context(|| {
        format!(
            "failed to read initial distribution: {}",
            args.initial.display()
        )
    })?;

    let trajectories = simulate(&matrix, &initial, &sim_cfg).context("simulation failed")?;
    let occupancy = aggregate(&trajectories);
    info!(
        n_entities = sim_cfg.n_entities(),
        n_steps = sim_cfg.n_steps(),
        seed = sim_cfg.seed(),
        "simulation complete"
    );

    let out_dir = convert::output_dir(&config.output, args.output);
    let mut sink = CsvSink::new(&out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;
    sink.write_occupancy(&occupancy).context("failed to write occupancy table")?;
    info!(path = %out_dir.display(), "occupancy written");
    Ok(())
}
