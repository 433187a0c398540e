//! Transition pairs, count matrices and probability matrices.

use chrono::{DateTime, Utc};

use crate::condition::{Conditioned, condition};
use crate::error::MarkovError;
use crate::state::{N_STATES, OccupancyState};

/// One observed state change for a single entity between two consecutive
/// observations. The timestamp is that of the earlier observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPair {
    /// Entity the pair belongs to.
    pub entity_id: String,
    /// Time of the `from` observation.
    pub timestamp: DateTime<Utc>,
    /// State at the earlier observation.
    pub from: OccupancyState,
    /// State at the following observation.
    pub to: OccupancyState,
}

/// A 4x4 tally of observed transitions, indexed `[from][to]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionCounts {
    counts: [[u64; N_STATES]; N_STATES],
}

impl TransitionCounts {
    /// An all-zero tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies every pair in `pairs`.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a TransitionPair>) -> Self {
        let mut counts = Self::new();
        for pair in pairs {
            counts.record(pair.from, pair.to);
        }
        counts
    }

    /// Adds one observed transition.
    pub fn record(&mut self, from: OccupancyState, to: OccupancyState) {
        self.counts[from.as_index()][to.as_index()] += 1;
    }

    /// Number of observed `from -> to` transitions.
    pub fn count(&self, from: OccupancyState, to: OccupancyState) -> u64 {
        self.counts[from.as_index()][to.as_index()]
    }

    /// All counts out of `from`.
    pub fn row(&self, from: OccupancyState) -> &[u64; N_STATES] {
        &self.counts[from.as_index()]
    }

    /// Total transitions observed out of `from`.
    pub fn row_total(&self, from: OccupancyState) -> u64 {
        self.row(from).iter().sum()
    }

    /// Sum of every cell; equals the number of pairs tallied.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// The full count matrix.
    pub fn counts(&self) -> &[[u64; N_STATES]; N_STATES] {
        &self.counts
    }

    /// Row-normalizes the counts. Rows with no observations stay all-zero.
    pub fn to_raw_probabilities(&self) -> RawProbabilities {
        let mut probs = [[0.0_f64; N_STATES]; N_STATES];
        for (row, counts) in probs.iter_mut().zip(&self.counts) {
            let total: u64 = counts.iter().sum();
            if total == 0 {
                continue;
            }
            for (p, &c) in row.iter_mut().zip(counts) {
                *p = c as f64 / total as f64;
            }
        }
        RawProbabilities { probs }
    }
}

/// Row-normalized counts that may still contain all-zero rows.
///
/// Not usable for simulation until conditioned into a [`TransitionMatrix`]
/// (see [`crate::condition`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawProbabilities {
    probs: [[f64; N_STATES]; N_STATES],
}

impl RawProbabilities {
    /// Wraps an arbitrary 4x4 array.
    pub fn from_probs(probs: [[f64; N_STATES]; N_STATES]) -> Self {
        Self { probs }
    }

    /// The full matrix.
    pub fn probs(&self) -> &[[f64; N_STATES]; N_STATES] {
        &self.probs
    }

    /// Probability of `from -> to`.
    pub fn prob(&self, from: OccupancyState, to: OccupancyState) -> f64 {
        self.probs[from.as_index()][to.as_index()]
    }

    /// States whose row has no probability mass.
    pub fn zero_rows(&self) -> Vec<OccupancyState> {
        OccupancyState::ALL
            .into_iter()
            .filter(|s| self.probs[s.as_index()].iter().all(|&p| p == 0.0))
            .collect()
    }
}

/// A conditioned 4x4 row-stochastic transition matrix.
///
/// Every constructor either conditions its input or starts from a known
/// stochastic matrix, so each row sums to 1.0 within floating tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionMatrix {
    probs: [[f64; N_STATES]; N_STATES],
}

impl TransitionMatrix {
    /// Wraps an already-conditioned array.
    pub(crate) fn from_conditioned(probs: [[f64; N_STATES]; N_STATES]) -> Self {
        Self { probs }
    }

    /// The identity matrix: every state is absorbing.
    pub fn identity() -> Self {
        let mut probs = [[0.0; N_STATES]; N_STATES];
        for (i, row) in probs.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { probs }
    }

    /// Builds a matrix from dynamically sized rows, e.g. a table read from disk.
    ///
    /// The rows are conditioned after validation, so an all-zero row becomes
    /// a self-loop. Use [`TransitionMatrix::from_rows_conditioned`] to see
    /// which rows were repaired.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::DimensionMismatch`] unless `rows` is 4x4, and
    /// [`MarkovError::InvalidProbability`] for negative or non-finite entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MarkovError> {
        Self::from_rows_conditioned(rows).map(|c| c.into_parts().0)
    }

    /// Like [`TransitionMatrix::from_rows`], but also reports the states whose
    /// row had no mass. Each repair is logged with `warn!`.
    ///
    /// # Errors
    ///
    /// Same as [`TransitionMatrix::from_rows`].
    pub fn from_rows_conditioned(rows: &[Vec<f64>]) -> Result<Conditioned, MarkovError> {
        if rows.len() != N_STATES {
            return Err(MarkovError::DimensionMismatch {
                expected: N_STATES,
                rows: rows.len(),
                cols: rows.first().map_or(0, Vec::len),
            });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != N_STATES) {
            return Err(MarkovError::DimensionMismatch {
                expected: N_STATES,
                rows: rows.len(),
                cols: bad.len(),
            });
        }
        let mut probs = [[0.0; N_STATES]; N_STATES];
        for (i, row) in rows.iter().enumerate() {
            for (j, &p) in row.iter().enumerate() {
                if !p.is_finite() || p < 0.0 {
                    return Err(MarkovError::InvalidProbability {
                        row: i,
                        col: j,
                        value: p,
                    });
                }
                probs[i][j] = p;
            }
        }
        Ok(condition(&RawProbabilities::from_probs(probs)))
    }

    /// Transition probabilities out of `from`.
    pub fn row(&self, from: OccupancyState) -> &[f64; N_STATES] {
        &self.probs[from.as_index()]
    }

    /// Probability of `from -> to`.
    pub fn prob(&self, from: OccupancyState, to: OccupancyState) -> f64 {
        self.probs[from.as_index()][to.as_index()]
    }

    /// The full matrix.
    pub fn probs(&self) -> &[[f64; N_STATES]; N_STATES] {
        &self.probs
    }

    /// Row-wise cumulative distributions.
    pub fn cdf(&self) -> [[f64; N_STATES]; N_STATES] {
        let mut out = [[0.0; N_STATES]; N_STATES];
        for (dst, row) in out.iter_mut().zip(&self.probs) {
            *dst = cumulative(row);
        }
        out
    }

    /// Checks that every row is a probability vector (tolerance 1e-9).
    pub fn validate(&self) -> Result<(), MarkovError> {
        for (i, row) in self.probs.iter().enumerate() {
            for (j, &p) in row.iter().enumerate() {
                if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                    return Err(MarkovError::InvalidProbability {
                        row: i,
                        col: j,
                        value: p,
                    });
                }
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > 1e-9 {
                return Err(MarkovError::InvalidRowSum { row: i, sum });
            }
        }
        Ok(())
    }
}

/// Running sum of a probability vector.
pub(crate) fn cumulative(probs: &[f64; N_STATES]) -> [f64; N_STATES] {
    let mut out = [0.0; N_STATES];
    let mut acc = 0.0;
    for (c, &p) in out.iter_mut().zip(probs) {
        acc += p;
        *c = acc;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use OccupancyState::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn pair(from: OccupancyState, to: OccupancyState) -> TransitionPair {
        TransitionPair {
            entity_id: "s1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            from,
            to,
        }
    }

    // 1. counts_from_pairs
    #[test]
    fn counts_from_pairs() {
        let pairs = vec![pair(Low, Low), pair(Low, Medium), pair(Low, Low), pair(High, Empty)];
        let counts = TransitionCounts::from_pairs(&pairs);
        assert_eq!(counts.count(Low, Low), 2);
        assert_eq!(counts.count(Low, Medium), 1);
        assert_eq!(counts.count(High, Empty), 1);
        assert_eq!(counts.row_total(Low), 3);
        assert_eq!(counts.total(), pairs.len() as u64);
    }

    // 2. raw_probabilities_row_normalized
    #[test]
    fn raw_probabilities_row_normalized() {
        let pairs = vec![pair(Low, Low), pair(Low, Medium), pair(Low, Low), pair(Low, High)];
        let raw = TransitionCounts::from_pairs(&pairs).to_raw_probabilities();
        assert_abs_diff_eq!(raw.prob(Low, Low), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(raw.prob(Low, Medium), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(raw.prob(Low, High), 0.25, epsilon = 1e-12);
    }

    // 3. raw_probabilities_keep_zero_rows
    #[test]
    fn raw_probabilities_keep_zero_rows() {
        let raw = TransitionCounts::from_pairs(&[pair(Low, Medium)]).to_raw_probabilities();
        assert_eq!(raw.probs()[Empty.as_index()], [0.0; N_STATES]);
        assert_eq!(raw.zero_rows(), vec![Empty, Medium, High]);
    }

    // 4. identity_is_valid
    #[test]
    fn identity_is_valid() {
        let tm = TransitionMatrix::identity();
        assert!(tm.validate().is_ok());
        for s in OccupancyState::ALL {
            assert_eq!(tm.prob(s, s), 1.0);
        }
    }

    // 5. from_rows_rejects_wrong_shape
    #[test]
    fn from_rows_rejects_wrong_shape() {
        let three = vec![vec![1.0, 0.0, 0.0]; 3];
        assert!(matches!(
            TransitionMatrix::from_rows(&three),
            Err(MarkovError::DimensionMismatch {
                expected: 4,
                rows: 3,
                cols: 3
            })
        ));

        let mut ragged = vec![vec![0.25; 4]; 4];
        ragged[2] = vec![0.5, 0.5];
        assert!(matches!(
            TransitionMatrix::from_rows(&ragged),
            Err(MarkovError::DimensionMismatch {
                expected: 4,
                rows: 4,
                cols: 2
            })
        ));
    }

    // 6. from_rows_rejects_bad_entries
    #[test]
    fn from_rows_rejects_bad_entries() {
        let mut rows = vec![vec![0.25; 4]; 4];
        rows[1][3] = -0.1;
        assert!(matches!(
            TransitionMatrix::from_rows(&rows),
            Err(MarkovError::InvalidProbability { row: 1, col: 3, .. })
        ));
        rows[1][3] = f64::NAN;
        assert!(TransitionMatrix::from_rows(&rows).is_err());
    }

    // 7. from_rows_conditions
    #[test]
    fn from_rows_conditions() {
        let rows = vec![
            vec![2.0, 2.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.1, 0.2, 0.3, 0.4],
            vec![0.0, 0.0, 0.0, 1.0],
        ];
        let tm = TransitionMatrix::from_rows(&rows).unwrap();
        assert!(tm.validate().is_ok());
        assert_abs_diff_eq!(tm.prob(Empty, Empty), 0.5, epsilon = 1e-12);
        assert_eq!(tm.row(Low), &[0.0, 1.0, 0.0, 0.0]);
    }

    // 8. cdf_is_cumulative
    #[test]
    fn cdf_is_cumulative() {
        let rows = vec![
            vec![0.1, 0.2, 0.3, 0.4],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.25; 4],
            vec![0.0, 0.0, 0.5, 0.5],
        ];
        let cdf = TransitionMatrix::from_rows(&rows).unwrap().cdf();
        assert_abs_diff_eq!(cdf[0][1], 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(cdf[0][3], 1.0, epsilon = 1e-12);
        assert_eq!(cdf[1], [0.0, 1.0, 1.0, 1.0]);
    }

    // 9. validate_bad_sum
    #[test]
    fn validate_bad_sum() {
        let tm = TransitionMatrix::from_conditioned([[0.3; 4], [0.25; 4], [0.25; 4], [0.25; 4]]);
        match tm.validate().unwrap_err() {
            MarkovError::InvalidRowSum { row, sum } => {
                assert_eq!(row, 0);
                assert_abs_diff_eq!(sum, 1.2, epsilon = 1e-12);
            }
            other => panic!("expected InvalidRowSum, got {other:?}"),
        }

        let tm = TransitionMatrix::from_conditioned([
            [0.25; 4],
            [0.25; 4],
            [0.5, 0.0, 0.0, 0.0],
            [0.25; 4],
        ]);
        assert!(matches!(
            tm.validate(),
            Err(MarkovError::InvalidRowSum { row: 2, .. })
        ));
    }

    // 10. from_rows_reports_repaired_states
    #[test]
    fn from_rows_reports_repaired_states() {
        let rows = vec![
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.0, 2.0, 2.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ];
        let out = TransitionMatrix::from_rows_conditioned(&rows).unwrap();
        assert_eq!(out.repaired(), &[Empty, Medium]);
        assert_eq!(out.matrix().row(Empty), &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(out.matrix(), &TransitionMatrix::from_rows(&rows).unwrap());

        let clean = vec![vec![0.25; 4]; 4];
        assert!(TransitionMatrix::from_rows_conditioned(&clean)
            .unwrap()
            .repaired()
            .is_empty());
    }

    // 11. from_rows_accepts_huge_entries
    #[test]
    fn from_rows_accepts_huge_entries() {
        let rows = vec![
            vec![1e308, 1e308, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ];
        let tm = TransitionMatrix::from_rows(&rows).unwrap();
        tm.validate().unwrap();
        assert_eq!(tm.row(Empty), &[0.5, 0.5, 0.0, 0.0]);
    }
}
