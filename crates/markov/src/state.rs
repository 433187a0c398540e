//! Occupancy states for the four-state Markov chain.

use std::fmt;

/// Number of occupancy states.
pub const N_STATES: usize = 4;

/// Four-state occupancy classification.
///
/// States are ordered by convention from emptiest to fullest. The order
/// fixes matrix indexing; it carries no other meaning in the computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum OccupancyState {
    /// No resource available at all.
    Empty = 0,
    /// Occupancy ratio at or below the low threshold.
    Low = 1,
    /// Occupancy ratio above the low threshold but at or below the medium threshold.
    Medium = 2,
    /// Occupancy ratio above the medium threshold.
    High = 3,
}

impl OccupancyState {
    /// All four states in index order.
    pub const ALL: [OccupancyState; N_STATES] = [Self::Empty, Self::Low, Self::Medium, Self::High];

    /// Returns the zero-based index of this state (matches the `#[repr(u8)]` discriminant).
    pub fn as_index(self) -> usize {
        self as usize
    }

    /// Returns the state at `index`, or `None` if `index >= N_STATES`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical upper-case label used in emitted tables.
    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Parses a canonical label (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for OccupancyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
