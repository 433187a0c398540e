//! Error types for statesim-io.

use std::path::PathBuf;

use statesim_markov::MarkovError;

/// Error type for all fallible operations in the statesim-io crate.
///
/// Covers filesystem failures, malformed CSV, snapshot directories without
/// matching files, and model tables that cannot be turned back into a
/// valid matrix or distribution.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file or directory does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a snapshot directory holds no matching files.
    #[error("no snapshot files matching '{prefix}*.csv' in {}", dir.display())]
    NoSnapshots {
        /// Directory that was scanned.
        dir: PathBuf,
        /// File-name prefix that was searched for.
        prefix: String,
    },

    /// Returned when a required column is absent from a CSV header.
    #[error("column '{name}' not found in {}", path.display())]
    MissingColumn {
        /// Name of the missing column.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Wraps an error from the CSV reader or writer.
    #[error("csv error in {}: {reason}", path.display())]
    Csv {
        /// File being read or written.
        path: PathBuf,
        /// Description of the underlying CSV failure.
        reason: String,
    },

    /// Wraps a filesystem error.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Returned when a model table has the wrong labels or values.
    #[error("invalid table {}: {reason}", path.display())]
    InvalidTable {
        /// Path to the offending table.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Returned when one or more configuration checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Wraps an error from the statesim-markov crate.
    #[error(transparent)]
    Markov(#[from] MarkovError),
}

impl IoError {
    pub(crate) fn csv(path: impl Into<PathBuf>, e: csv::Error) -> Self {
        IoError::Csv {
            path: path.into(),
            reason: e.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_table(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        IoError::InvalidTable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
