//! Loading accumulated station-status snapshots from a directory of CSV files.

use std::path::{Path, PathBuf};

use statesim_markov::{ActivityFlags, RawObservation};
use tracing::{debug, info};

use crate::error::IoError;

// ---------------------------------------------------------------------------
// SnapshotConfig
// ---------------------------------------------------------------------------

/// Configuration for reading station snapshot CSV files.
///
/// The [`Default`] implementation matches the column layout written by the
/// GBFS station-status collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// File-name prefix selecting snapshot files.
    file_prefix: String,
    /// Column holding the observation time.
    timestamp_column: String,
    /// Column holding the station identifier.
    entity_column: String,
    /// Column holding the available-bike count.
    quantity_a_column: String,
    /// Column holding the available-dock count.
    quantity_b_column: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            file_prefix: "divvy_station_status_".into(),
            timestamp_column: "timestamp_utc".into(),
            entity_column: "station_id".into(),
            quantity_a_column: "num_bikes_available".into(),
            quantity_b_column: "num_docks_available".into(),
        }
    }
}

/// Names of the optional activity-flag columns.
const FLAG_COLUMNS: [&str; 3] = ["is_installed", "is_renting", "is_returning"];

impl SnapshotConfig {
    /// Creates a configuration with the default collector layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file-name prefix. An empty prefix selects every `.csv` file.
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Set the timestamp column name.
    pub fn with_timestamp_column(mut self, name: impl Into<String>) -> Self {
        self.timestamp_column = name.into();
        self
    }

    /// Set the entity id column name.
    pub fn with_entity_column(mut self, name: impl Into<String>) -> Self {
        self.entity_column = name.into();
        self
    }

    /// Set the two quantity column names.
    pub fn with_quantity_columns(
        mut self,
        quantity_a: impl Into<String>,
        quantity_b: impl Into<String>,
    ) -> Self {
        self.quantity_a_column = quantity_a.into();
        self.quantity_b_column = quantity_b.into();
        self
    }

    /// File-name prefix.
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Validate that every required column name is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing each empty column name.
    pub fn validate(&self) -> Result<(), IoError> {
        let problems: Vec<String> = self
            .required_columns()
            .into_iter()
            .zip(["timestamp", "entity", "quantity_a", "quantity_b"])
            .filter(|(name, _)| name.trim().is_empty())
            .map(|(_, role)| format!("{role} column is empty"))
            .collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }

    fn required_columns(&self) -> [&str; 4] {
        [
            self.timestamp_column.as_str(),
            self.entity_column.as_str(),
            self.quantity_a_column.as_str(),
            self.quantity_b_column.as_str(),
        ]
    }
}

// ---------------------------------------------------------------------------
// read_snapshots
// ---------------------------------------------------------------------------

/// Lists snapshot files in `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if `dir` does not exist and
/// [`IoError::NoSnapshots`] if no file matches.
pub fn list_snapshot_files(dir: &Path, config: &SnapshotConfig) -> Result<Vec<PathBuf>, IoError> {
    if !dir.is_dir() {
        return Err(IoError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|e| IoError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::io(dir, e))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(config.file_prefix.as_str()) && n.ends_with(".csv"));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(IoError::NoSnapshots {
            dir: dir.to_path_buf(),
            prefix: config.file_prefix.clone(),
        });
    }
    files.sort();
    Ok(files)
}

/// Reads every snapshot file in `dir` into raw observations.
///
/// Files are concatenated in file-name order, which fixes the ingestion
/// order used to break timestamp ties during learning.
///
/// # Errors
///
/// Returns [`IoError`] if the directory holds no snapshots, a file lacks a
/// required column, or a file cannot be parsed as CSV.
pub fn read_snapshots(dir: &Path, config: &SnapshotConfig) -> Result<Vec<RawObservation>, IoError> {
    config.validate()?;
    let files = list_snapshot_files(dir, config)?;

    let mut rows = Vec::new();
    for path in &files {
        let before = rows.len();
        read_snapshot_file_into(path, config, &mut rows)?;
        debug!(path = %path.display(), rows = rows.len() - before, "read snapshot file");
    }

    info!(
        dir = %dir.display(),
        files = files.len(),
        rows = rows.len(),
        "loaded snapshots"
    );
    Ok(rows)
}

/// Reads a single snapshot file.
///
/// # Errors
///
/// Returns [`IoError::MissingColumn`] if a required column is absent, or
/// [`IoError::Csv`] on malformed input.
pub fn read_snapshot_file(
    path: &Path,
    config: &SnapshotConfig,
) -> Result<Vec<RawObservation>, IoError> {
    let mut rows = Vec::new();
    read_snapshot_file_into(path, config, &mut rows)?;
    Ok(rows)
}

fn read_snapshot_file_into(
    path: &Path,
    config: &SnapshotConfig,
    out: &mut Vec<RawObservation>,
) -> Result<(), IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| IoError::csv(path, e))?;
    let headers = reader.headers().map_err(|e| IoError::csv(path, e))?.clone();

    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let require = |name: &str| {
        find(name).ok_or_else(|| IoError::MissingColumn {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
    };

    let [ts_col, entity_col, a_col, b_col] = config.required_columns();
    let ts_idx = require(ts_col)?;
    let entity_idx = require(entity_col)?;
    let a_idx = require(a_col)?;
    let b_idx = require(b_col)?;
    let flag_idx = FLAG_COLUMNS.map(find);

    for record in reader.records() {
        let record = record.map_err(|e| IoError::csv(path, e))?;
        let field = |idx: usize| record.get(idx).map(str::to_string);
        let flag = |idx: Option<usize>| idx.map(|i| record.get(i).is_some_and(parse_flag));
        out.push(RawObservation {
            entity_id: field(entity_idx),
            timestamp: field(ts_idx),
            quantity_a: field(a_idx),
            quantity_b: field(b_idx),
            flags: ActivityFlags {
                is_installed: flag(flag_idx[0]),
                is_renting: flag(flag_idx[1]),
                is_returning: flag(flag_idx[2]),
            },
        });
    }
    Ok(())
}

/// Interprets a flag cell. Anything other than a recognisable true value
/// (including an empty cell) is `false`.
fn parse_flag(text: &str) -> bool {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        return true;
    }
    text.parse::<f64>().is_ok_and(|v| v == 1.0)
}
