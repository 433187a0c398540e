//! State classification from resource/capacity counts.
//!
//! An observation carries two quantities: the number of available resources
//! (`quantity_a`, e.g. bikes) and the number of available slots
//! (`quantity_b`, e.g. docks). The occupancy ratio `a / (a + b)` is binned
//! against two inclusive upper bounds.

use crate::error::MarkovError;
use crate::state::OccupancyState;

/// Classifies a single observation.
///
/// * `quantity_a == 0` is always [`OccupancyState::Empty`], even when
///   `quantity_b` is also zero.
/// * A non-positive denominator falls back to [`OccupancyState::Low`].
/// * Otherwise the ratio is compared against `low_max` and `medium_max`,
///   both inclusive upper bounds of their bucket.
///
/// Thresholds are not validated here; see [`StateThresholds::validate`].
#[inline]
pub fn classify(quantity_a: f64, quantity_b: f64, low_max: f64, medium_max: f64) -> OccupancyState {
    if quantity_a == 0.0 {
        return OccupancyState::Empty;
    }
    let denom = quantity_a + quantity_b;
    if denom <= 0.0 {
        return OccupancyState::Low;
    }
    let ratio = quantity_a / denom;
    if ratio <= low_max {
        OccupancyState::Low
    } else if ratio <= medium_max {
        OccupancyState::Medium
    } else {
        OccupancyState::High
    }
}

/// Occupancy-ratio thresholds for state classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateThresholds {
    low_max: f64,
    medium_max: f64,
}

impl StateThresholds {
    /// Creates thresholds without validating them.
    pub fn new(low_max: f64, medium_max: f64) -> Self {
        Self {
            low_max,
            medium_max,
        }
    }

    /// Inclusive upper bound of the LOW bucket.
    pub fn low_max(&self) -> f64 {
        self.low_max
    }

    /// Inclusive upper bound of the MEDIUM bucket.
    pub fn medium_max(&self) -> f64 {
        self.medium_max
    }

    /// Checks `0 <= low_max < medium_max <= 1` with finite values.
    ///
    /// The classifier itself never calls this; configuration layers do.
    pub fn validate(&self) -> Result<(), MarkovError> {
        let (lo, hi) = (self.low_max, self.medium_max);
        if !lo.is_finite() || !hi.is_finite() {
            return Err(MarkovError::InvalidThreshold {
                reason: format!("thresholds must be finite, got low_max={lo}, medium_max={hi}"),
            });
        }
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) {
            return Err(MarkovError::InvalidThreshold {
                reason: format!(
                    "thresholds must lie in [0, 1], got low_max={lo}, medium_max={hi}"
                ),
            });
        }
        if lo >= hi {
            return Err(MarkovError::InvalidThreshold {
                reason: format!("low_max ({lo}) must be below medium_max ({hi})"),
            });
        }
        Ok(())
    }

    /// Classifies one observation using these thresholds.
    #[inline]
    pub fn classify(&self, quantity_a: f64, quantity_b: f64) -> OccupancyState {
        classify(quantity_a, quantity_b, self.low_max, self.medium_max)
    }

    /// Classifies a batch of observations given as two parallel columns.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::LengthMismatch`] if the columns differ in length.
    pub fn classify_batch(
        &self,
        quantity_a: &[f64],
        quantity_b: &[f64],
    ) -> Result<Vec<OccupancyState>, MarkovError> {
        if quantity_a.len() != quantity_b.len() {
            return Err(MarkovError::LengthMismatch {
                a_len: quantity_a.len(),
                b_len: quantity_b.len(),
            });
        }
        Ok(quantity_a
            .iter()
            .zip(quantity_b)
            .map(|(&a, &b)| self.classify(a, b))
            .collect())
    }
}

impl Default for StateThresholds {
    /// Thirds of the occupancy ratio: `low_max = 0.33`, `medium_max = 0.66`.
    fn default() -> Self {
        Self::new(0.33, 0.66)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OccupancyState::*;

    // 1. zero_resource_is_empty
    #[test]
    fn zero_resource_is_empty() {
        for d in [0.0, 1.0, 5.0, 1000.0] {
            assert_eq!(classify(0.0, d, 0.33, 0.66), Empty, "d = {d}");
        }
    }

    // 2. empty_takes_priority_over_degenerate_denominator
    #[test]
    fn empty_takes_priority_over_degenerate_denominator() {
        assert_eq!(classify(0.0, 0.0, 0.33, 0.66), Empty);
        assert_eq!(classify(0.0, -3.0, 0.33, 0.66), Empty);
    }

    // 3. non_positive_denominator_is_low
    #[test]
    fn non_positive_denominator_is_low() {
        assert_eq!(classify(2.0, -2.0, 0.33, 0.66), Low);
        assert_eq!(classify(1.0, -5.0, 0.33, 0.66), Low);
        assert_eq!(classify(-1.0, 0.0, 0.33, 0.66), Low);
    }

    // 4. thresholds_are_inclusive_upper_bounds
    #[test]
    fn thresholds_are_inclusive_upper_bounds() {
        // ratio = 1/4 = 0.25 exactly
        assert_eq!(classify(1.0, 3.0, 0.25, 0.75), Low);
        // ratio = 3/4 = 0.75 exactly
        assert_eq!(classify(3.0, 1.0, 0.25, 0.75), Medium);
        // ratio = 0.8 just above medium_max
        assert_eq!(classify(4.0, 1.0, 0.25, 0.75), High);
        // ratio = 0.5 in the middle
        assert_eq!(classify(2.0, 2.0, 0.25, 0.75), Medium);
    }

    // 5. full_station_is_high
    #[test]
    fn full_station_is_high() {
        assert_eq!(classify(15.0, 0.0, 0.33, 0.66), High);
    }

    // 6. batch_matches_scalar
    #[test]
    fn batch_matches_scalar() {
        let th = StateThresholds::new(0.3, 0.7);
        let a = [0.0, 1.0, 3.0, 9.0, 2.0, 0.0];
        let b = [4.0, 9.0, 3.0, 1.0, -2.0, 0.0];
        let batch = th.classify_batch(&a, &b).unwrap();
        let scalar: Vec<_> = a
            .iter()
            .zip(&b)
            .map(|(&x, &y)| classify(x, y, 0.3, 0.7))
            .collect();
        assert_eq!(batch, scalar);
        assert_eq!(batch, vec![Empty, Low, Medium, High, Low, Empty]);
    }

    // 7. batch_length_mismatch
    #[test]
    fn batch_length_mismatch() {
        let th = StateThresholds::default();
        let result = th.classify_batch(&[1.0, 2.0], &[1.0]);
        assert!(matches!(
            result,
            Err(MarkovError::LengthMismatch { a_len: 2, b_len: 1 })
        ));
    }

    // 8. validate
    #[test]
    fn validate() {
        assert!(StateThresholds::default().validate().is_ok());
        assert!(StateThresholds::new(0.0, 1.0).validate().is_ok());
        assert!(StateThresholds::new(0.5, 0.5).validate().is_err());
        assert!(StateThresholds::new(0.7, 0.3).validate().is_err());
        assert!(StateThresholds::new(-0.1, 0.5).validate().is_err());
        assert!(StateThresholds::new(0.2, 1.5).validate().is_err());
        assert!(StateThresholds::new(f64::NAN, 0.5).validate().is_err());
    }

    // 9. unvalidated_thresholds_still_classify
    #[test]
    fn unvalidated_thresholds_still_classify() {
        // Inverted thresholds: anything above low_max is HIGH.
        let th = StateThresholds::new(0.8, 0.2);
        assert_eq!(th.classify(1.0, 1.0), Low);
        assert_eq!(th.classify(9.0, 1.0), High);
    }
}
