//! Output sink through which the model tables are published.
//!
//! The core never touches the filesystem; collaborators implement
//! [`OutputSink`] to persist tables wherever they like.

use crate::distribution::InitialDistribution;
use crate::learn::LearnedModel;
use crate::occupancy::OccupancyTable;
use crate::transition::{TransitionCounts, TransitionMatrix, TransitionPair};

/// Destination for the tables produced by learning and simulation.
pub trait OutputSink {
    /// Error returned by the sink.
    type Error;

    /// Writes the flat `(timestamp, entity_id, from_state, to_state)` table.
    fn write_transitions(&mut self, pairs: &[TransitionPair]) -> Result<(), Self::Error>;

    /// Writes the 4x4 count matrix labelled by state name.
    fn write_counts(&mut self, counts: &TransitionCounts) -> Result<(), Self::Error>;

    /// Writes the conditioned 4x4 probability matrix labelled by state name.
    fn write_probabilities(&mut self, matrix: &TransitionMatrix) -> Result<(), Self::Error>;

    /// Writes the initial state distribution.
    fn write_initial_distribution(
        &mut self,
        initial: &InitialDistribution,
    ) -> Result<(), Self::Error>;

    /// Writes the `(time_step, fraction per state)` table.
    fn write_occupancy(&mut self, table: &OccupancyTable) -> Result<(), Self::Error>;
}

/// Publishes every learning output: pairs, counts, probabilities and the
/// initial distribution.
pub fn publish_model<S: OutputSink>(model: &LearnedModel, sink: &mut S) -> Result<(), S::Error> {
    sink.write_transitions(model.pairs())?;
    sink.write_counts(model.counts())?;
    sink.write_probabilities(model.matrix())?;
    sink.write_initial_distribution(model.initial_distribution())
}
