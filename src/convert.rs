//! Pure conversion functions: TOML config structs -> crate API config types.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::config::*;

use statesim_io::SnapshotConfig;
use statesim_markov::{ActivityFilter, SimulationConfig, StateThresholds};

/// Seed used when neither the config nor the command line sets one.
pub const DEFAULT_SEED: u64 = 42;

/// Builds validated [`StateThresholds`] from the TOML binning section.
///
/// Requires `0 <= low_max < medium_max <= 1`.
pub fn build_thresholds(binning: &BinningToml) -> Result<StateThresholds> {
    let thresholds = StateThresholds::new(binning.low_max, binning.medium_max);
    thresholds
        .validate()
        .context("invalid [state_binning] section")?;
    Ok(thresholds)
}

/// Maps the `require_active` flag onto an [`ActivityFilter`].
pub fn build_filter(filter: &FilterToml) -> ActivityFilter {
    if filter.require_active {
        ActivityFilter::RequireActive
    } else {
        ActivityFilter::AcceptAll
    }
}

/// Builds a [`SnapshotConfig`] from the TOML collection section.
pub fn build_snapshot_config(collection: &CollectionToml) -> SnapshotConfig {
    SnapshotConfig::new().with_file_prefix(&collection.file_prefix)
}

/// Returns the snapshot directory or a descriptive error if none is set.
pub fn snapshots_dir(collection: &CollectionToml) -> Result<&Path> {
    collection
        .snapshots_dir
        .as_deref()
        .ok_or_else(|| anyhow!("no snapshot directory: set [collection].snapshots_dir in config"))
}

/// Builds a [`SimulationConfig`] from the TOML model section.
///
/// The seed resolves as command line, then config, then [`DEFAULT_SEED`].
pub fn build_simulation_config(
    model: &ModelToml,
    seed_override: Option<u64>,
) -> Result<SimulationConfig> {
    let seed = seed_override.or(model.seed).unwrap_or(DEFAULT_SEED);
    let cfg = SimulationConfig::new()
        .with_n_entities(model.n_entities)
        .with_n_steps(model.n_steps)
        .with_seed(seed);
    cfg.validate().context("invalid [model] section")?;
    Ok(cfg)
}

/// Resolves the output directory, preferring the command-line override.
pub fn output_dir(output: &OutputToml, cli_override: Option<PathBuf>) -> PathBuf {
    cli_override.unwrap_or_else(|| output.dir.clone())
}
