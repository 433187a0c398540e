//! Per-step occupancy fractions of a simulated population.

use crate::simulate::Trajectories;
use crate::state::{N_STATES, OccupancyState};

/// Fraction of the population in each state, one row per time step.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyTable {
    n_entities: usize,
    rows: Vec<[f64; N_STATES]>,
}

impl OccupancyTable {
    /// Population size the fractions were computed over.
    pub fn n_entities(&self) -> usize {
        self.n_entities
    }

    /// Number of rows (`n_steps + 1`).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Number of simulated transitions (`len() - 1`).
    pub fn steps(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Always `false` for a table built by [`aggregate`].
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fractions at step `t`.
    pub fn row(&self, t: usize) -> Option<&[f64; N_STATES]> {
        self.rows.get(t)
    }

    /// Fraction of the population in `state` at step `t`.
    pub fn fraction(&self, t: usize, state: OccupancyState) -> Option<f64> {
        self.row(t).map(|r| r[state.as_index()])
    }

    /// All rows in step order.
    pub fn rows(&self) -> &[[f64; N_STATES]] {
        &self.rows
    }

    /// Iterates `(time_step, fractions)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64; N_STATES])> {
        self.rows.iter().enumerate()
    }
}

/// Reduces trajectories to per-step occupancy fractions.
pub fn aggregate(trajectories: &Trajectories) -> OccupancyTable {
    let n = trajectories.n_entities();
    let mut counts = vec![[0usize; N_STATES]; trajectories.n_columns()];
    for path in trajectories.entities() {
        for (step, s) in counts.iter_mut().zip(path) {
            step[s.as_index()] += 1;
        }
    }
    let rows = counts
        .into_iter()
        .map(|c| c.map(|k| k as f64 / n as f64))
        .collect();
    OccupancyTable { n_entities: n, rows }
}
