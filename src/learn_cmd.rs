//! Learn command: fit the transition model from collected snapshots.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use statesim_io::{CsvSink, read_snapshots};
use statesim_markov::{LearnedModel, learn_transitions, publish_model};

use crate::cli::LearnArgs;
use crate::config::{self, StatesimConfig};
use crate::convert;

/// Run the learning pipeline and publish the model tables.
pub fn run(args: LearnArgs) -> Result<()> {
    let _cmd = info_span!("learn").entered();
    let config = config::load(&args.config)?;

    let model = learn_model(&config)?;

    let out_dir = convert::output_dir(&config.output, args.output);
    let mut sink = CsvSink::new(&out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;
    publish_model(&model, &mut sink).context("failed to write model tables")?;
    info!(path = %out_dir.display(), "model written");
    Ok(())
}

/// Loads snapshots named by `config` and learns the transition model.
pub fn learn_model(config: &StatesimConfig) -> Result<LearnedModel> {
    let thresholds = convert::build_thresholds(&config.state_binning)?;
    let filter = convert::build_filter(&config.filter);
    let snapshot_cfg = convert::build_snapshot_config(&config.collection);
    let dir = convert::snapshots_dir(&config.collection)?;

    info!(path = %dir.display(), "reading snapshots");
    let raw = read_snapshots(dir, &snapshot_cfg)
        .with_context(|| format!("failed to read snapshots: {}", dir.display()))?;

    let model =
        learn_transitions(&raw, &thresholds, filter).context("transition learning failed")?;
    let summary = model.summary();
    info!(
        rows = summary.rows_read,
        used = summary.observations_used,
        entities = summary.entities,
        pairs = summary.pairs,
        repaired = model.repaired_states().len(),
        "transition model learned"
    );
    Ok(model)
}
