//! CSV output of model tables into a directory.

use std::path::{Path, PathBuf};

use statesim_markov::{
    InitialDistribution, OccupancyState, OccupancyTable, OutputSink, TransitionCounts,
    TransitionMatrix, TransitionPair,
};
use tracing::info;

use crate::error::IoError;

/// File name of the flat transition-pair table.
pub const TRANSITIONS_FILE: &str = "station_state_transitions.csv";
/// File name of the transition count matrix.
pub const COUNTS_FILE: &str = "transition_counts_real.csv";
/// File name of the conditioned probability matrix.
pub const PROBABILITIES_FILE: &str = "transition_probs_real.csv";
/// File name of the initial state distribution.
pub const INITIAL_FILE: &str = "initial_distribution.csv";
/// File name of the simulated occupancy table.
pub const OCCUPANCY_FILE: &str = "simulated_occupancy.csv";

/// Writes every model table as a CSV file inside one output directory.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    /// Creates a sink writing into `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, IoError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| IoError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn writer(&self, name: &str) -> Result<(PathBuf, csv::Writer<std::fs::File>), IoError> {
        let path = self.dir.join(name);
        let writer = csv::Writer::from_path(&path).map_err(|e| IoError::csv(&path, e))?;
        Ok((path, writer))
    }

    fn write_state_matrix<T: ToString>(
        &self,
        name: &str,
        rows: &[[T; 4]; 4],
    ) -> Result<PathBuf, IoError> {
        let (path, mut w) = self.writer(name)?;
        let mut header = vec!["from_state"];
        header.extend(OccupancyState::ALL.map(OccupancyState::name));
        w.write_record(&header).map_err(|e| IoError::csv(&path, e))?;
        for (state, row) in OccupancyState::ALL.iter().zip(rows) {
            let mut record = vec![state.name().to_string()];
            record.extend(row.iter().map(ToString::to_string));
            w.write_record(&record).map_err(|e| IoError::csv(&path, e))?;
        }
        w.flush().map_err(|e| IoError::io(&path, e))?;
        Ok(path)
    }
}

impl OutputSink for CsvSink {
    type Error = IoError;

    fn write_transitions(&mut self, pairs: &[TransitionPair]) -> Result<(), IoError> {
        let (path, mut w) = self.writer(TRANSITIONS_FILE)?;
        w.write_record(["timestamp_utc", "station_id", "state", "next_state"])
            .map_err(|e| IoError::csv(&path, e))?;
        for p in pairs {
            w.write_record([
                p.timestamp.to_rfc3339().as_str(),
                p.entity_id.as_str(),
                p.from.name(),
                p.to.name(),
            ])
            .map_err(|e| IoError::csv(&path, e))?;
        }
        w.flush().map_err(|e| IoError::io(&path, e))?;
        info!(path = %path.display(), rows = pairs.len(), "wrote transition pairs");
        Ok(())
    }

    fn write_counts(&mut self, counts: &TransitionCounts) -> Result<(), IoError> {
        let path = self.write_state_matrix(COUNTS_FILE, counts.counts())?;
        info!(path = %path.display(), total = counts.total(), "wrote transition counts");
        Ok(())
    }

    fn write_probabilities(&mut self, matrix: &TransitionMatrix) -> Result<(), IoError> {
        let path = self.write_state_matrix(PROBABILITIES_FILE, matrix.probs())?;
        info!(path = %path.display(), "wrote transition probabilities");
        Ok(())
    }

    fn write_initial_distribution(&mut self, initial: &InitialDistribution) -> Result<(), IoError> {
        let (path, mut w) = self.writer(INITIAL_FILE)?;
        w.write_record(["state", "init_prob"])
            .map_err(|e| IoError::csv(&path, e))?;
        for s in OccupancyState::ALL {
            w.write_record([s.name(), initial.prob(s).to_string().as_str()])
                .map_err(|e| IoError::csv(&path, e))?;
        }
        w.flush().map_err(|e| IoError::io(&path, e))?;
        info!(path = %path.display(), "wrote initial distribution");
        Ok(())
    }

    fn write_occupancy(&mut self, table: &OccupancyTable) -> Result<(), IoError> {
        let (path, mut w) = self.writer(OCCUPANCY_FILE)?;
        let mut header = vec!["time_step"];
        header.extend(OccupancyState::ALL.map(OccupancyState::name));
        w.write_record(&header).map_err(|e| IoError::csv(&path, e))?;
        for (t, row) in table.iter() {
            let mut record = vec![t.to_string()];
            record.extend(row.iter().map(ToString::to_string));
            w.write_record(&record).map_err(|e| IoError::csv(&path, e))?;
        }
        w.flush().map_err(|e| IoError::io(&path, e))?;
        info!(
            path = %path.display(),
            steps = table.steps(),
            n_entities = table.n_entities(),
            "wrote simulated occupancy"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statesim_markov::{
        ActivityFilter, RawObservation, SimulationConfig, StateThresholds, aggregate,
        learn_transitions, publish_model, simulate,
    };
    use std::fs;

    fn model() -> statesim_markov::LearnedModel {
        let raw = vec![
            RawObservation::new("x", "2024-06-01T12:00:00Z", "2", "8"),
            RawObservation::new("x", "2024-06-01T12:05:00Z", "3", "7"),
            RawObservation::new("x", "2024-06-01T12:10:00Z", "5", "5"),
            RawObservation::new("y", "2024-06-01T12:00:00Z", "9", "1"),
        ];
        let thresholds = StateThresholds::new(0.3, 0.7);
        learn_transitions(&raw, &thresholds, ActivityFilter::AcceptAll).unwrap()
    }

    // 1. creates_missing_directory
    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let sink = CsvSink::new(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(sink.dir(), out.as_path());
    }

    // 2. transitions_table_layout
    #[test]
    fn transitions_table_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path()).unwrap();
        sink.write_transitions(model().pairs()).unwrap();

        let text = fs::read_to_string(dir.path().join(TRANSITIONS_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "timestamp_utc,station_id,state,next_state",
                "2024-06-01T12:00:00+00:00,x,LOW,LOW",
                "2024-06-01T12:05:00+00:00,x,LOW,MEDIUM",
            ]
        );
    }

    // 3. counts_table_layout
    #[test]
    fn counts_table_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path()).unwrap();
        sink.write_counts(model().counts()).unwrap();

        let text = fs::read_to_string(dir.path().join(COUNTS_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "from_state,EMPTY,LOW,MEDIUM,HIGH",
                "EMPTY,0,0,0,0",
                "LOW,0,1,1,0",
                "MEDIUM,0,0,0,0",
                "HIGH,0,0,0,0",
            ]
        );
    }

    // 4. probabilities_are_conditioned
    #[test]
    fn probabilities_are_conditioned() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path()).unwrap();
        sink.write_probabilities(model().matrix()).unwrap();

        let text = fs::read_to_string(dir.path().join(PROBABILITIES_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "from_state,EMPTY,LOW,MEDIUM,HIGH");
        assert_eq!(lines[1], "EMPTY,1,0,0,0");
        assert_eq!(lines[2], "LOW,0,0.5,0.5,0");
        assert_eq!(lines[4], "HIGH,0,0,0,1");
    }

    // 5. initial_distribution_layout
    #[test]
    fn initial_distribution_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path()).unwrap();
        sink.write_initial_distribution(model().initial_distribution())
            .unwrap();

        let text = fs::read_to_string(dir.path().join(INITIAL_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "state,init_prob",
                "EMPTY,0",
                "LOW,0.5",
                "MEDIUM,0.25",
                "HIGH,0.25"
            ]
        );
    }

    // 6. occupancy_layout
    #[test]
    fn occupancy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path()).unwrap();
        let m = model();
        let cfg = SimulationConfig::new().with_n_entities(10).with_n_steps(3);
        let table = aggregate(&simulate(m.matrix(), m.initial_distribution(), &cfg).unwrap());
        sink.write_occupancy(&table).unwrap();

        let text = fs::read_to_string(dir.path().join(OCCUPANCY_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "time_step,EMPTY,LOW,MEDIUM,HIGH");
        for (t, line) in lines[1..].iter().enumerate() {
            assert!(line.starts_with(&format!("{t},")), "{line}");
        }
    }

    // 7. publish_model_writes_four_files
    #[test]
    fn publish_model_writes_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path()).unwrap();
        publish_model(&model(), &mut sink).unwrap();
        for name in [TRANSITIONS_FILE, COUNTS_FILE, PROBABILITIES_FILE, INITIAL_FILE] {
            assert!(dir.path().join(name).is_file(), "{name} missing");
        }
        assert!(!dir.path().join(OCCUPANCY_FILE).exists());
    }
}
