//! Configuration for population simulation.

use crate::error::MarkovError;

/// Configuration for a simulation run.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use statesim_markov::SimulationConfig;
///
/// let config = SimulationConfig::new()
///     .with_n_entities(1_000)
///     .with_n_steps(48)
///     .with_seed(7);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    n_entities: usize,
    n_steps: usize,
    seed: u64,
}

impl SimulationConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `n_entities = 500`, `n_steps = 96`, `seed = 42`.
    pub fn new() -> Self {
        Self {
            n_entities: 500,
            n_steps: 96,
            seed: 42,
        }
    }

    /// Sets the number of simulated entities.
    pub fn with_n_entities(mut self, n_entities: usize) -> Self {
        self.n_entities = n_entities;
        self
    }

    /// Sets the number of transitions simulated per entity.
    pub fn with_n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = n_steps;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Accessors ---

    /// Returns the number of simulated entities.
    pub fn n_entities(&self) -> usize {
        self.n_entities
    }

    /// Returns the number of simulated steps.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Returns the RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Validates this configuration.
    ///
    /// Checks that the population is non-empty and that the trajectory
    /// buffer size `n_entities * (n_steps + 1)` does not overflow.
    pub fn validate(&self) -> Result<(), MarkovError> {
        trajectory_len(self.n_entities, self.n_steps).map(|_| ())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of cells in a `(n_entities, n_steps + 1)` trajectory matrix.
pub(crate) fn trajectory_len(n_entities: usize, n_steps: usize) -> Result<usize, MarkovError> {
    if n_entities == 0 {
        return Err(MarkovError::InvalidPopulation { n_entities });
    }
    n_steps
        .checked_add(1)
        .and_then(|w| w.checked_mul(n_entities))
        .ok_or(MarkovError::InvalidPopulation { n_entities })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SimulationConfig::new();
        assert_eq!(cfg.n_entities(), 500);
        assert_eq!(cfg.n_steps(), 96);
        assert_eq!(cfg.seed(), 42);
        assert_eq!(cfg, SimulationConfig::default());
    }

    #[test]
    fn builder_chaining() {
        let cfg = SimulationConfig::new()
            .with_n_entities(10)
            .with_n_steps(0)
            .with_seed(99);
        assert_eq!(cfg.n_entities(), 10);
        assert_eq!(cfg.n_steps(), 0);
        assert_eq!(cfg.seed(), 99);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_empty_population() {
        let cfg = SimulationConfig::new().with_n_entities(0);
        assert!(matches!(
            cfg.validate(),
            Err(MarkovError::InvalidPopulation { n_entities: 0 })
        ));
    }

    #[test]
    fn validate_overflow() {
        let cfg = SimulationConfig::new()
            .with_n_entities(usize::MAX)
            .with_n_steps(1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn trajectory_len_values() {
        assert_eq!(trajectory_len(3, 0).unwrap(), 3);
        assert_eq!(trajectory_len(3, 4).unwrap(), 15);
    }
}
