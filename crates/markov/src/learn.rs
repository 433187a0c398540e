//! Transition learning from station snapshots.
//!
//! Raw rows are filtered, parsed and classified, then grouped per entity
//! and ordered by time. Every consecutive pair within an entity contributes
//! one transition; the last observation of each entity contributes none.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::classify::StateThresholds;
use crate::condition::condition;
use crate::distribution::InitialDistribution;
use crate::error::MarkovError;
use crate::observation::{ActivityFilter, DropReason, Observation, RawObservation};
use crate::state::OccupancyState;
use crate::transition::{RawProbabilities, TransitionCounts, TransitionMatrix, TransitionPair};

/// An observation together with its classified state.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedObservation {
    /// The validated observation.
    pub observation: Observation,
    /// State derived from the two quantities.
    pub state: OccupancyState,
}

/// Row accounting for one learning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearningSummary {
    /// Raw rows handed to the learner.
    pub rows_read: usize,
    /// Rows rejected by the activity filter.
    pub rows_inactive: usize,
    /// Rows without an entity id.
    pub dropped_missing_entity: usize,
    /// Rows with a missing or unparseable timestamp.
    pub dropped_bad_timestamp: usize,
    /// Rows with a missing or non-numeric quantity.
    pub dropped_bad_quantity: usize,
    /// Rows that were classified and used.
    pub observations_used: usize,
    /// Distinct entities among the used rows.
    pub entities: usize,
    /// Transition pairs formed.
    pub pairs: usize,
}

/// Everything produced by one learning run.
///
/// The transition matrix is always conditioned; the raw probabilities are
/// kept for inspection only.
#[derive(Debug, Clone)]
pub struct LearnedModel {
    pairs: Vec<TransitionPair>,
    counts: TransitionCounts,
    raw: RawProbabilities,
    matrix: TransitionMatrix,
    initial: InitialDistribution,
    repaired: Vec<OccupancyState>,
    summary: LearningSummary,
}

impl LearnedModel {
    /// Transition pairs in entity order, then time order.
    pub fn pairs(&self) -> &[TransitionPair] {
        &self.pairs
    }

    /// Transition counts.
    pub fn counts(&self) -> &TransitionCounts {
        &self.counts
    }

    /// Row-normalized counts before conditioning.
    pub fn raw_probabilities(&self) -> &RawProbabilities {
        &self.raw
    }

    /// Conditioned transition matrix.
    pub fn matrix(&self) -> &TransitionMatrix {
        &self.matrix
    }

    /// Empirical distribution of classified states.
    pub fn initial_distribution(&self) -> &InitialDistribution {
        &self.initial
    }

    /// States that had no observed departures and were given a self-loop.
    pub fn repaired_states(&self) -> &[OccupancyState] {
        &self.repaired
    }

    /// Row accounting.
    pub fn summary(&self) -> &LearningSummary {
        &self.summary
    }
}

/// Learns a transition model from raw snapshot rows.
///
/// # Errors
///
/// Returns [`MarkovError::NoUsableObservations`] if no row survives the
/// activity filter and parsing.
#[tracing::instrument(skip_all, fields(n_rows = raw.len()))]
pub fn learn_transitions(
    raw: &[RawObservation],
    thresholds: &StateThresholds,
    filter: ActivityFilter,
) -> Result<LearnedModel, MarkovError> {
    let mut summary = LearningSummary {
        rows_read: raw.len(),
        ..LearningSummary::default()
    };

    // --- Filter, parse, classify (ingestion order preserved) ---
    let mut classified: Vec<ClassifiedObservation> = Vec::with_capacity(raw.len());
    for row in raw {
        if !filter.accepts(&row.flags) {
            summary.rows_inactive += 1;
            continue;
        }
        match row.parse() {
            Ok(observation) => {
                let state = thresholds.classify(observation.quantity_a, observation.quantity_b);
                classified.push(ClassifiedObservation { observation, state });
            }
            Err(DropReason::MissingEntity) => summary.dropped_missing_entity += 1,
            Err(DropReason::BadTimestamp) => summary.dropped_bad_timestamp += 1,
            Err(DropReason::BadQuantity) => summary.dropped_bad_quantity += 1,
        }
    }
    summary.observations_used = classified.len();

    let dropped = summary.dropped_missing_entity
        + summary.dropped_bad_timestamp
        + summary.dropped_bad_quantity;
    if dropped > 0 {
        warn!(
            missing_entity = summary.dropped_missing_entity,
            bad_timestamp = summary.dropped_bad_timestamp,
            bad_quantity = summary.dropped_bad_quantity,
            "dropped unparseable observations"
        );
    }

    if classified.is_empty() {
        return Err(MarkovError::NoUsableObservations { total: raw.len() });
    }

    // --- Pairs ---
    let index = entity_index(&classified);
    summary.entities = index.len();
    let pairs = pairs_from_index(&classified, index);
    summary.pairs = pairs.len();

    // --- Counts, raw probabilities, conditioning ---
    let counts = TransitionCounts::from_pairs(&pairs);
    let raw_probs = counts.to_raw_probabilities();
    let (matrix, repaired) = condition(&raw_probs).into_parts();
    let initial = InitialDistribution::from_states(classified.iter().map(|c| c.state));

    debug!(
        rows_read = summary.rows_read,
        rows_inactive = summary.rows_inactive,
        observations = summary.observations_used,
        entities = summary.entities,
        pairs = summary.pairs,
        repaired = repaired.len(),
        "learned transition model"
    );

    Ok(LearnedModel {
        pairs,
        counts,
        raw: raw_probs,
        matrix,
        initial,
        repaired,
        summary,
    })
}

/// Forms transition pairs from classified observations.
///
/// Entities are visited in id order; within an entity, observations are
/// stably sorted by timestamp so equal timestamps keep ingestion order.
pub fn transition_pairs(classified: &[ClassifiedObservation]) -> Vec<TransitionPair> {
    pairs_from_index(classified, entity_index(classified))
}

fn pairs_from_index(
    classified: &[ClassifiedObservation],
    index: BTreeMap<&str, Vec<usize>>,
) -> Vec<TransitionPair> {
    let n_pairs: usize = index.values().map(|ix| ix.len().saturating_sub(1)).sum();
    let mut pairs = Vec::with_capacity(n_pairs);
    for (entity_id, indices) in index {
        for w in indices.windows(2) {
            let (from, to) = (&classified[w[0]], &classified[w[1]]);
            pairs.push(TransitionPair {
                entity_id: entity_id.to_string(),
                timestamp: from.observation.timestamp,
                from: from.state,
                to: to.state,
            });
        }
    }
    pairs
}

/// Maps each entity id to the positions of its observations, time-ordered.
fn entity_index(classified: &[ClassifiedObservation]) -> BTreeMap<&str, Vec<usize>> {
    let mut index: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, c) in classified.iter().enumerate() {
        index
            .entry(c.observation.entity_id.as_str())
            .or_default()
            .push(i);
    }
    for indices in index.values_mut() {
        indices.sort_by_key(|&i| classified[i].observation.timestamp);
    }
    index
}
