//! Error types for the statesim-markov crate.

/// Error type for all fallible operations in the statesim-markov crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkovError {
    /// Returned when no observation survives filtering and parsing.
    ///
    /// This is the data-availability failure: the caller should halt rather
    /// than proceed with an empty matrix.
    #[error("no usable observations: {total} rows read, all dropped during filtering")]
    NoUsableObservations {
        /// Number of raw rows handed to the learner.
        total: usize,
    },

    /// Returned when the simulated population is empty.
    #[error("invalid population size: {n_entities} (must be > 0)")]
    InvalidPopulation {
        /// The rejected population size.
        n_entities: usize,
    },

    /// Returned when a matrix does not have the expected shape.
    #[error("matrix dimension mismatch: expected {expected}x{expected}, got {rows}x{cols}")]
    DimensionMismatch {
        /// Required number of rows and columns.
        expected: usize,
        /// Number of rows supplied.
        rows: usize,
        /// Number of columns in the first offending row.
        cols: usize,
    },

    /// Returned when a matrix entry is negative, non-finite or above one.
    #[error("invalid probability at [{row}][{col}]: {value}")]
    InvalidProbability {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The rejected value.
        value: f64,
    },

    /// Returned when a matrix row does not sum to one.
    #[error("row {row} sums to {sum}, expected 1")]
    InvalidRowSum {
        /// Row index.
        row: usize,
        /// The row sum.
        sum: f64,
    },

    /// Returned when an initial distribution is not a probability vector.
    #[error("invalid initial distribution: {reason}")]
    InvalidDistribution {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when classification thresholds are out of range.
    #[error("invalid threshold: {reason}")]
    InvalidThreshold {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when paired input slices differ in length.
    #[error("length mismatch: quantity_a has {a_len} elements, quantity_b has {b_len}")]
    LengthMismatch {
        /// Length of the first quantity slice.
        a_len: usize,
        /// Length of the second quantity slice.
        b_len: usize,
    },

    /// Returned when a pre-allocated buffer has the wrong length.
    #[error("buffer length mismatch: expected {expected}, got {got}")]
    BufferLengthMismatch {
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_no_usable_observations() {
        let e = MarkovError::NoUsableObservations { total: 12 };
        assert_eq!(
            e.to_string(),
            "no usable observations: 12 rows read, all dropped during filtering"
        );
    }

    #[test]
    fn error_invalid_population() {
        let e = MarkovError::InvalidPopulation { n_entities: 0 };
        assert_eq!(e.to_string(), "invalid population size: 0 (must be > 0)");
    }

    #[test]
    fn error_dimension_mismatch() {
        let e = MarkovError::DimensionMismatch {
            expected: 4,
            rows: 3,
            cols: 4,
        };
        assert_eq!(
            e.to_string(),
            "matrix dimension mismatch: expected 4x4, got 3x4"
        );
    }

    #[test]
    fn error_invalid_probability() {
        let e = MarkovError::InvalidProbability {
            row: 1,
            col: 2,
            value: -0.5,
        };
        assert_eq!(e.to_string(), "invalid probability at [1][2]: -0.5");
    }

    #[test]
    fn error_invalid_row_sum() {
        let e = MarkovError::InvalidRowSum { row: 3, sum: 0.75 };
        assert_eq!(e.to_string(), "row 3 sums to 0.75, expected 1");
    }

    #[test]
    fn error_invalid_distribution() {
        let e = MarkovError::InvalidDistribution {
            reason: "sums to 0.5".to_string(),
        };
        assert_eq!(e.to_string(), "invalid initial distribution: sums to 0.5");
    }

    #[test]
    fn error_length_mismatch() {
        let e = MarkovError::LengthMismatch { a_len: 10, b_len: 9 };
        assert_eq!(
            e.to_string(),
            "length mismatch: quantity_a has 10 elements, quantity_b has 9"
        );
    }

    #[test]
    fn error_buffer_length_mismatch() {
        let e = MarkovError::BufferLengthMismatch {
            expected: 400,
            got: 396,
        };
        assert_eq!(
            e.to_string(),
            "buffer length mismatch: expected 400, got 396"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<MarkovError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<MarkovError>();
    }
}
