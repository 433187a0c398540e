//! Population simulation of the occupancy Markov chain.
//!
//! Each step draws one uniform per entity (entity order), partitions the
//! population by current state and resolves every entity of a state against
//! that state's cumulative row. A draw maps to the first index whose
//! cumulative probability exceeds it; indices past the last state are clamped.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::config::{SimulationConfig, trajectory_len};
use crate::distribution::InitialDistribution;
use crate::error::MarkovError;
use crate::state::{N_STATES, OccupancyState};
use crate::transition::TransitionMatrix;

/// Simulated state paths, shape `(n_entities, n_steps + 1)`, stored entity-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectories {
    n_entities: usize,
    n_steps: usize,
    states: Vec<OccupancyState>,
}

impl Trajectories {
    /// Number of simulated entities.
    pub fn n_entities(&self) -> usize {
        self.n_entities
    }

    /// Number of simulated transitions per entity.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of columns, `n_steps + 1`.
    pub fn n_columns(&self) -> usize {
        self.n_steps + 1
    }

    /// State of `entity` at step `t`.
    ///
    /// # Panics
    ///
    /// Panics if `entity >= n_entities` or `t > n_steps`.
    pub fn get(&self, entity: usize, t: usize) -> OccupancyState {
        assert!(t <= self.n_steps, "step {t} out of range 0..={}", self.n_steps);
        self.states[entity * self.n_columns() + t]
    }

    /// Full path of one entity.
    pub fn entity(&self, entity: usize) -> &[OccupancyState] {
        let w = self.n_columns();
        &self.states[entity * w..(entity + 1) * w]
    }

    /// Iterates over entity paths.
    pub fn entities(&self) -> impl Iterator<Item = &[OccupancyState]> {
        self.states.chunks_exact(self.n_columns())
    }

    /// States of every entity at step `t`.
    pub fn column(&self, t: usize) -> impl Iterator<Item = OccupancyState> + '_ {
        self.entities().map(move |path| path[t])
    }

    /// Entity-major flat view.
    pub fn as_slice(&self) -> &[OccupancyState] {
        &self.states
    }
}

/// Simulates a population with a generator seeded from `config`.
///
/// Identical inputs give identical trajectories.
///
/// # Errors
///
/// Returns [`MarkovError::InvalidPopulation`] if `config.n_entities()` is zero.
#[tracing::instrument(
    skip_all,
    fields(n_entities = config.n_entities(), n_steps = config.n_steps(), seed = config.seed())
)]
pub fn simulate(
    matrix: &TransitionMatrix,
    initial: &InitialDistribution,
    config: &SimulationConfig,
) -> Result<Trajectories, MarkovError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed());
    let paths = simulate_with_rng(
        matrix,
        initial,
        config.n_entities(),
        config.n_steps(),
        &mut rng,
    )?;
    debug!("simulation complete");
    Ok(paths)
}

/// Simulates a population with a caller-supplied generator.
///
/// # Errors
///
/// Returns [`MarkovError::InvalidPopulation`] if `n_entities` is zero.
pub fn simulate_with_rng(
    matrix: &TransitionMatrix,
    initial: &InitialDistribution,
    n_entities: usize,
    n_steps: usize,
    rng: &mut impl rand::Rng,
) -> Result<Trajectories, MarkovError> {
    let len = trajectory_len(n_entities, n_steps)?;
    let mut states = vec![OccupancyState::Empty; len];
    simulate_into(matrix, initial, n_entities, n_steps, rng, &mut states)?;
    Ok(Trajectories {
        n_entities,
        n_steps,
        states,
    })
}

/// Simulates into a pre-allocated entity-major buffer.
///
/// # Arguments
///
/// * `matrix` - Conditioned transition matrix.
/// * `initial` - Distribution of the step-0 states.
/// * `n_entities` - Population size; must be positive.
/// * `n_steps` - Number of transitions per entity.
/// * `rng` - Random number generator.
/// * `out` - Buffer of length `n_entities * (n_steps + 1)`.
///
/// # Errors
///
/// Returns [`MarkovError::InvalidPopulation`] if `n_entities` is zero and
/// [`MarkovError::BufferLengthMismatch`] if `out` has the wrong length.
pub fn simulate_into(
    matrix: &TransitionMatrix,
    initial: &InitialDistribution,
    n_entities: usize,
    n_steps: usize,
    rng: &mut impl rand::Rng,
    out: &mut [OccupancyState],
) -> Result<(), MarkovError> {
    let expected = trajectory_len(n_entities, n_steps)?;
    if out.len() != expected {
        return Err(MarkovError::BufferLengthMismatch {
            expected,
            got: out.len(),
        });
    }
    let width = n_steps + 1;

    // Step 0: one draw per entity against the initial distribution.
    let init_cdf = initial.cdf();
    let mut current: Vec<OccupancyState> = (0..n_entities)
        .map(|_| sample_state(&init_cdf, rng.random()))
        .collect();
    for (e, &s) in current.iter().enumerate() {
        out[e * width] = s;
    }

    let cdf = matrix.cdf();
    let mut draws = vec![0.0_f64; n_entities];
    let mut members: [Vec<usize>; N_STATES] = Default::default();

    for t in 1..=n_steps {
        for u in draws.iter_mut() {
            *u = rng.random();
        }

        for m in members.iter_mut() {
            m.clear();
        }
        for (e, s) in current.iter().enumerate() {
            members[s.as_index()].push(e);
        }

        for (row_cdf, entities) in cdf.iter().zip(&members) {
            for &e in entities {
                current[e] = sample_state(row_cdf, draws[e]);
            }
        }

        for (e, &s) in current.iter().enumerate() {
            out[e * width + t] = s;
        }
    }
    Ok(())
}

/// Inverse-CDF lookup: first index whose cumulative value exceeds `u`,
/// clamped to the last state.
#[inline]
fn sample_state(cdf: &[f64; N_STATES], u: f64) -> OccupancyState {
    let idx = cdf.partition_point(|&c| c <= u).min(N_STATES - 1);
    OccupancyState::ALL[idx]
}
