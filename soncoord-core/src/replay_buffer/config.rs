//! Configuration of the prioritized replay buffer.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PerReplayBuffer`](super::PerReplayBuffer).
///
/// All hyperparameters are fixed at construction; the buffer is never
/// resized and the exponents are not scheduled during a run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PerReplayBufferConfig {
    /// Maximum number of transitions that can be stored. When the buffer
    /// is full, new transitions overwrite the oldest ones.
    pub capacity: usize,

    /// Random seed for stratified sampling.
    pub seed: u64,

    /// Minimum priority floor, added to the raw TD-error before
    /// exponentiation. Keeps every written priority strictly positive.
    pub eps: f32,

    /// Priority sharpening exponent; 0 gives uniform sampling, 1 fully
    /// greedy prioritization.
    pub alpha: f32,

    /// Importance-sampling correction exponent; 0 disables the
    /// correction, 1 fully compensates for the non-uniform probabilities.
    pub beta: f32,
}

impl Default for PerReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 20_000,
            seed: 42,
            eps: 1e-2,
            alpha: 0.1,
            beta: 0.1,
        }
    }
}

impl PerReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the minimum priority floor.
    pub fn eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// Sets the prioritization exponent.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the importance-sampling exponent.
    pub fn beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
