//! Matrix conditioning: turning raw row-normalized counts into a
//! row-stochastic [`TransitionMatrix`].
//!
//! A state with no observed departures gets an absorbing self-loop. Every
//! row is then scaled by its largest entry and divided by its own sum to
//! absorb floating-point drift.

use tracing::warn;

use crate::state::{N_STATES, OccupancyState};
use crate::transition::{RawProbabilities, TransitionMatrix};

/// Result of conditioning a raw matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditioned {
    matrix: TransitionMatrix,
    repaired: Vec<OccupancyState>,
}

impl Conditioned {
    /// The conditioned matrix.
    pub fn matrix(&self) -> &TransitionMatrix {
        &self.matrix
    }

    /// States whose row had no mass and was replaced by a self-loop.
    pub fn repaired(&self) -> &[OccupancyState] {
        &self.repaired
    }

    /// Splits into the matrix and the repaired states.
    pub fn into_parts(self) -> (TransitionMatrix, Vec<OccupancyState>) {
        (self.matrix, self.repaired)
    }
}

/// Conditions a raw probability matrix.
///
/// Idempotent: conditioning the probabilities of an already conditioned
/// matrix reproduces it within floating tolerance. Every repaired state is
/// logged with `warn!`.
pub fn condition(raw: &RawProbabilities) -> Conditioned {
    let (probs, repaired) = condition_rows(*raw.probs());
    for state in &repaired {
        warn!(
            state = %state,
            "no observed transitions out of state; using absorbing self-loop"
        );
    }
    Conditioned {
        matrix: TransitionMatrix::from_conditioned(probs),
        repaired,
    }
}

/// Row repair and renormalization.
///
/// 1. Replaces non-finite and negative entries with 0.0.
/// 2. Replaces a row without positive mass by a one-hot self-loop.
/// 3. Scales each row by its largest entry so the sum stays finite.
/// 4. Divides each row by the sum computed before the division.
fn condition_rows(
    mut probs: [[f64; N_STATES]; N_STATES],
) -> ([[f64; N_STATES]; N_STATES], Vec<OccupancyState>) {
    let mut repaired = Vec::new();
    for (i, row) in probs.iter_mut().enumerate() {
        for p in row.iter_mut() {
            if !p.is_finite() || *p < 0.0 {
                *p = 0.0;
            }
        }
        let max = row.iter().copied().fold(0.0_f64, f64::max);
        if max <= 0.0 {
            *row = [0.0; N_STATES];
            row[i] = 1.0;
            repaired.push(OccupancyState::ALL[i]);
            continue;
        }
        for p in row.iter_mut() {
            *p /= max;
        }
        let sum: f64 = row.iter().sum();
        for p in row.iter_mut() {
            *p /= sum;
        }
    }
    (probs, repaired)
}
