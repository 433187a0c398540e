//! # statesim-io
//!
//! Read accumulated station-status snapshots from CSV files and write the
//! learned model and simulated occupancy back out as CSV. Bridges the
//! collector's file layout into the in-memory types of `statesim-markov`.

mod error;
mod sink;
mod snapshot;
mod tables;

pub use error::IoError;
pub use sink::{
    COUNTS_FILE, CsvSink, INITIAL_FILE, OCCUPANCY_FILE, PROBABILITIES_FILE, TRANSITIONS_FILE,
};
pub use snapshot::{SnapshotConfig, list_snapshot_files, read_snapshot_file, read_snapshots};
pub use tables::{read_conditioned_probabilities, read_initial_distribution, read_probabilities};
