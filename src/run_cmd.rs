//! Run command: learn, simulate and aggregate in one pass.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use statesim_io::CsvSink;
use statesim_markov::{OutputSink, aggregate, publish_model, simulate};

use crate::cli::RunArgs;
use crate::config;
use crate::convert;
use crate::learn_cmd;

/// Run the full pipeline and publish every table.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("run").entered();
    let config = config::load(&args.config)?;
    let sim_cfg = convert::build_simulation_config(&config.model, args.seed)?;

    let model = learn_cmd::learn_model(&config)?;

    let trajectories = simulate(model.matrix(), model.initial_distribution(), &sim_cfg)
        .context("simulation failed")?;
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
    publish_model(&model, &mut sink).context("failed to write model tables")?;
    sink.write_occupancy(&occupancy).context("failed to write occupancy table")?;
    info!(path = %out_dir.display(), "outputs written");
    Ok(())
}
