// src/simulation/results.rs
use std::collections::HashMap;
use std::fmt;

/// Measurement counts gathered by shot sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCounts {
    /// Maps a basis index to the number of shots that produced it.
    counts: HashMap<usize, usize>,
    shots: usize,
    num_qubits: usize,
}

impl SampleCounts {
    /// Creates an empty tally. (Internal visibility)
    pub(crate) fn new(num_qubits: usize) -> Self {
        Self { counts: HashMap::new(), shots: 0, num_qubits }
    }

    /// Records one shot. (Internal visibility)
    pub(crate) fn record(&mut self, outcome: usize) {
        *self.counts.entry(outcome).or_insert(0) += 1;
        self.shots += 1;
    }

    /// Number of times `outcome` was observed.
    pub fn get(&self, outcome: usize) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Total number of shots.
    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Observed outcome frequencies, indexed by basis state.
    pub fn frequencies(&self) -> Vec<f64> {
        let mut freqs = vec![0.0; 1usize << self.num_qubits];
        if self.shots == 0 {
            return freqs;
        }
        for (outcome, count) in &self.counts {
            freqs[*outcome] = *count as f64 / self.shots as f64;
        }
        freqs
    }
}

impl fmt::Display for SampleCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample Counts ({} shots):", self.shots)?;
        let mut sorted: Vec<_> = self.counts.iter().collect();
        sorted.sort_by_key(|(outcome, _)| **outcome);
        for (outcome, count) in sorted {
            // Most significant qubit printed first
            writeln!(f, "  |{:0width$b}>: {}", outcome, count, width = self.num_qubits)?;
        }
        Ok(())
    }
}
