//! Reading saved model tables back from CSV.

use std::path::Path;

use statesim_markov::{
    Conditioned, InitialDistribution, N_STATES, OccupancyState, TransitionMatrix,
};
use tracing::info;

use crate::error::IoError;

/// Reads a probability matrix written by [`CsvSink`](crate::CsvSink).
///
/// The first column holds the `from` state name; the remaining columns are
/// labelled by `to` state name and may appear in any order. Every state
/// must appear exactly once as a row and as a column. The loaded matrix is
/// conditioned before it is returned.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if `path` does not exist,
/// [`IoError::InvalidTable`] on bad labels or values, and
/// [`IoError::Markov`] if the matrix has negative or non-finite entries.
pub fn read_probabilities(path: &Path) -> Result<TransitionMatrix, IoError> {
    read_conditioned_probabilities(path).map(|c| c.into_parts().0)
}

/// Like [`read_probabilities`], but also reports the states whose row had
/// no mass and was replaced by a self-loop.
///
/// # Errors
///
/// Same as [`read_probabilities`].
pub fn read_conditioned_probabilities(path: &Path) -> Result<Conditioned, IoError> {
    let mut reader = open(path)?;
    let headers = reader.headers().map_err(|e| IoError::csv(path, e))?.clone();

    // Column position (after the label column) for each state index.
    let mut columns = [None; N_STATES];
    for (pos, name) in headers.iter().enumerate().skip(1) {
        let state = OccupancyState::from_name(name)
            .ok_or_else(|| IoError::invalid_table(path, format!("unknown column '{name}'")))?;
        if columns[state.as_index()].replace(pos).is_some() {
            return Err(IoError::invalid_table(
                path,
                format!("duplicate column {state}"),
            ));
        }
    }
    let columns = resolve(path, columns, "column")?;

    let mut rows: [Option<Vec<f64>>; N_STATES] = Default::default();
    for record in reader.records() {
        let record = record.map_err(|e| IoError::csv(path, e))?;
        let label = record.get(0).unwrap_or_default();
        let state = OccupancyState::from_name(label)
            .ok_or_else(|| IoError::invalid_table(path, format!("unknown row '{label}'")))?;
        let values = columns
            .iter()
            .map(|&pos| parse_value(path, record.get(pos), state))
            .collect::<Result<Vec<_>, _>>()?;
        if rows[state.as_index()].replace(values).is_some() {
            return Err(IoError::invalid_table(path, format!("duplicate row {state}")));
        }
    }
    let rows = resolve(path, rows, "row")?;

    let conditioned = TransitionMatrix::from_rows_conditioned(&rows)?;
    info!(
        path = %path.display(),
        repaired = conditioned.repaired().len(),
        "loaded transition probabilities"
    );
    Ok(conditioned)
}

/// Reads an initial distribution written by [`CsvSink`](crate::CsvSink).
///
/// The file needs `state` and `init_prob` columns. States absent from the
/// file get probability zero.
///
/// # Errors
///
/// Returns [`IoError::MissingColumn`] if a column is absent,
/// [`IoError::InvalidTable`] on bad labels or values, and
/// [`IoError::Markov`] if the probabilities do not form a distribution.
pub fn read_initial_distribution(path: &Path) -> Result<InitialDistribution, IoError> {
    let mut reader = open(path)?;
    let headers = reader.headers().map_err(|e| IoError::csv(path, e))?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| IoError::MissingColumn {
                name: name.to_string(),
                path: path.to_path_buf(),
            })
    };
    let state_col = column("state")?;
    let prob_col = column("init_prob")?;

    let mut probs = [0.0; N_STATES];
    let mut seen = [false; N_STATES];
    for record in reader.records() {
        let record = record.map_err(|e| IoError::csv(path, e))?;
        let label = record.get(state_col).unwrap_or_default();
        let state = OccupancyState::from_name(label)
            .ok_or_else(|| IoError::invalid_table(path, format!("unknown state '{label}'")))?;
        if std::mem::replace(&mut seen[state.as_index()], true) {
            return Err(IoError::invalid_table(path, format!("duplicate row {state}")));
        }
        probs[state.as_index()] = parse_value(path, record.get(prob_col), state)?;
    }

    let initial = InitialDistribution::new(probs)?;
    info!(path = %path.display(), "loaded initial distribution");
    Ok(initial)
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, IoError> {
    if !path.is_file() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| IoError::csv(path, e))
}

fn parse_value(path: &Path, text: Option<&str>, row: OccupancyState) -> Result<f64, IoError> {
    let text = text.unwrap_or_default().trim();
    text.parse::<f64>()
        .map_err(|_| IoError::invalid_table(path, format!("row {row}: bad number '{text}'")))
}

/// Unwraps one slot per state, failing on the first missing one.
fn resolve<T>(path: &Path, slots: [Option<T>; N_STATES], what: &str) -> Result<Vec<T>, IoError> {
    slots
        .into_iter()
        .zip(OccupancyState::ALL)
        .map(|(slot, state)| {
            slot.ok_or_else(|| IoError::invalid_table(path, format!("missing {what} for {state}")))
        })
        .collect()
}
