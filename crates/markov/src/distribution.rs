//! Initial state distribution for the simulated population.

use crate::error::MarkovError;
use crate::state::{N_STATES, OccupancyState};
use crate::transition::cumulative;

/// Absolute tolerance on the sum of a caller-supplied distribution.
const SUM_TOLERANCE: f64 = 1e-6;

/// A probability vector over the four occupancy states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialDistribution {
    probs: [f64; N_STATES],
}

impl InitialDistribution {
    /// Validates and normalizes a caller-supplied distribution.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidDistribution`] if any entry is negative
    /// or non-finite, or if the entries do not sum to 1.0 within 1e-6.
    pub fn new(probs: [f64; N_STATES]) -> Result<Self, MarkovError> {
        if let Some((i, p)) = probs
            .iter()
            .enumerate()
            .find(|&(_, p)| !p.is_finite() || *p < 0.0)
        {
            return Err(MarkovError::InvalidDistribution {
                reason: format!("entry {i} is {p}"),
            });
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(MarkovError::InvalidDistribution {
                reason: format!("entries sum to {sum}, expected 1.0"),
            });
        }
        Ok(Self {
            probs: probs.map(|p| p / sum),
        })
    }

    /// Equal mass on every state.
    pub fn uniform() -> Self {
        Self {
            probs: [1.0 / N_STATES as f64; N_STATES],
        }
    }

    /// All mass on a single state.
    pub fn point(state: OccupancyState) -> Self {
        let mut probs = [0.0; N_STATES];
        probs[state.as_index()] = 1.0;
        Self { probs }
    }

    /// Normalized histogram of observed states, uniform if nothing was observed.
    pub fn from_state_counts(counts: &[u64; N_STATES]) -> Self {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return Self::uniform();
        }
        Self {
            probs: counts.map(|c| c as f64 / total as f64),
        }
    }

    /// Empirical distribution of a sequence of states.
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = OccupancyState>,
    {
        let mut counts = [0u64; N_STATES];
        for s in states {
            counts[s.as_index()] += 1;
        }
        Self::from_state_counts(&counts)
    }

    /// Probability of `state`.
    pub fn prob(&self, state: OccupancyState) -> f64 {
        self.probs[state.as_index()]
    }

    /// All probabilities in state order.
    pub fn probs(&self) -> &[f64; N_STATES] {
        &self.probs
    }

    /// Cumulative distribution in state order.
    pub fn cdf(&self) -> [f64; N_STATES] {
        cumulative(&self.probs)
    }
}
