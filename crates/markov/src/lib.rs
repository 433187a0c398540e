//! Four-state occupancy Markov chain for station populations.
//!
//! This crate learns a first-order transition model from categorical
//! station snapshots and simulates it forward over a synthetic population
//! of independent entities.
//!
//! # Pipeline
//!
//! ```text
//!  ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//!  │  classify  │──▶│   learn    │──▶│ condition  │──▶│  simulate  │──▶│ occupancy  │
//!  │ (bin obs)  │   │ (count P)  │   │ (repair P) │   │ (paths)    │   │ (fractions)│
//!  └────────────┘   └────────────┘   └────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use statesim_markov::{
//!     ActivityFilter, RawObservation, SimulationConfig, StateThresholds, aggregate,
//!     learn_transitions, simulate,
//! };
//!
//! let raw = vec![
//!     RawObservation::new("s1", "2024-06-01T12:00:00Z", "2", "8"),
//!     RawObservation::new("s1", "2024-06-01T12:05:00Z", "5", "5"),
//!     RawObservation::new("s1", "2024-06-01T12:10:00Z", "9", "1"),
//! ];
//! let model = learn_transitions(&raw, &StateThresholds::default(), ActivityFilter::AcceptAll)?;
//!
//! let config = SimulationConfig::new().with_n_entities(100).with_n_steps(10);
//! let paths = simulate(model.matrix(), model.initial_distribution(), &config)?;
//! let occupancy = aggregate(&paths);
//! assert_eq!(occupancy.len(), 11);
//! # Ok::<(), statesim_markov::MarkovError>(())
//! ```

pub mod classify;
pub mod condition;
pub mod config;
pub mod distribution;
pub mod error;
pub mod learn;
pub mod observation;
pub mod occupancy;
pub mod simulate;
pub mod sink;
pub mod state;
pub mod transition;

pub use classify::{StateThresholds, classify};
pub use condition::{Conditioned, condition};
pub use config::SimulationConfig;
pub use distribution::InitialDistribution;
pub use error::MarkovError;
pub use learn::{
    ClassifiedObservation, LearnedModel, LearningSummary, learn_transitions, transition_pairs,
};
pub use observation::{
    ActivityFilter, ActivityFlags, DropReason, Observation, RawObservation, parse_timestamp,
};
pub use occupancy::{OccupancyTable, aggregate};
pub use simulate::{Trajectories, simulate, simulate_into, simulate_with_rng};
pub use sink::{OutputSink, publish_model};
pub use state::{N_STATES, OccupancyState};
pub use transition::{RawProbabilities, TransitionCounts, TransitionMatrix, TransitionPair};
