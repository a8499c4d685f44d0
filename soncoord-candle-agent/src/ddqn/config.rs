//! Configuration of [`Ddqn`](super::Ddqn) agent.
use super::{DdqnModelConfig, EpsilonGreedy};
use crate::{util::OutDim, Device};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Ddqn`](super::Ddqn) agent.
///
/// `Q` is the configuration type of the Q-network submodel.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DdqnConfig<Q>
where
    Q: OutDim,
{
    /// Configuration of the Q-network model.
    pub model_config: DdqnModelConfig<Q>,

    /// Discount factor.
    pub gamma: f64,

    /// Number of stored transitions required before optimization steps run.
    pub train_start: usize,

    /// Batch size taken from the replay buffer.
    pub batch_size: usize,

    /// Epsilon-greedy explorer.
    pub explorer: EpsilonGreedy,

    /// Device on which the networks are placed.
    pub device: Option<Device>,

    /// If the agent is built in training mode.
    pub train: bool,
}

impl<Q> Default for DdqnConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            model_config: DdqnModelConfig::default(),
            gamma: 0.95,
            train_start: 500,
            batch_size: 64,
            explorer: EpsilonGreedy::default(),
            device: None,
            train: false,
        }
    }
}

impl<Q> DdqnConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the Q-network model.
    pub fn model_config(mut self, v: DdqnModelConfig<Q>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the warm-up size of the replay buffer.
    pub fn train_start(mut self, v: usize) -> Self {
        self.train_start = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Constructs [`DdqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DdqnConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DdqnConfig;
    use crate::mlp::MlpConfig;
    use tempdir::TempDir;

    #[test]
    fn test_serde_ddqn_config() {
        let config = DdqnConfig::<MlpConfig>::default()
            .gamma(0.9)
            .train_start(100)
            .batch_size(32);

        let dir = TempDir::new("ddqn_config").unwrap();
        let path = dir.path().join("ddqn.yaml");
        config.save(&path).unwrap();
        let config_ = DdqnConfig::<MlpConfig>::load(&path).unwrap();
        assert_eq!(config, config_);
    }
}
