use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level statesim configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatesimConfig {
    /// Occupancy-ratio bin edges.
    #[serde(default)]
    pub state_binning: BinningToml,

    /// Where collected snapshots live.
    #[serde(default)]
    pub collection: CollectionToml,

    /// Activity filtering.
    #[serde(default)]
    pub filter: FilterToml,

    /// Simulation settings.
    #[serde(default)]
    pub model: ModelToml,

    /// Output settings.
    #[serde(default)]
    pub output: OutputToml,
}

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<StatesimConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinningToml {
    #[serde(default = "default_low_max")]
    pub low_max: f64,
    #[serde(default = "default_medium_max")]
    pub medium_max: f64,
}

impl Default for BinningToml {
    fn default() -> Self {
        Self {
            low_max: default_low_max(),
            medium_max: default_medium_max(),
        }
    }
}

fn default_low_max() -> f64 {
    0.33
}
fn default_medium_max() -> f64 {
    0.66
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionToml {
    pub snapshots_dir: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for CollectionToml {
    fn default() -> Self {
        Self {
            snapshots_dir: None,
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_file_prefix() -> String {
    "divvy_station_status_".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterToml {
    #[serde(default = "default_true")]
    pub require_active: bool,
}

impl Default for FilterToml {
    fn default() -> Self {
        Self {
            require_active: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default = "default_n_entities")]
    pub n_entities: usize,
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            n_entities: default_n_entities(),
            n_steps: default_n_steps(),
            seed: None,
        }
    }
}

fn default_n_entities() -> usize {
    500
}
fn default_n_steps() -> usize {
    96
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}
