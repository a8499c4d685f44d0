//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Number of training episodes.
    pub max_episodes: usize,

    /// Step budget per episode.
    pub max_env_steps: usize,

    /// Interval of target-model synchronization in environment steps.
    /// 0 disables synchronization.
    pub sync_interval: usize,

    /// Interval of saving model parameters in episodes. 0 disables saving.
    pub save_interval: usize,

    /// Directory where model parameters are saved.
    pub model_dir: Option<String>,

    /// Random seed given to the environment.
    pub seed: i64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 2000,
            max_env_steps: 30,
            sync_interval: 13,
            save_interval: 0,
            model_dir: None,
            seed: 3,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the step budget per episode.
    pub fn max_env_steps(mut self, v: usize) -> Self {
        self.max_env_steps = v;
        self
    }

    /// Sets the target synchronization interval in environment steps.
    pub fn sync_interval(mut self, v: usize) -> Self {
        self.sync_interval = v;
        self
    }

    /// Sets the model saving interval in episodes.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the directory where model parameters are saved.
    pub fn model_dir(mut self, model_dir: impl Into<String>) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Sets the random seed given to the environment.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
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

#[cfg(test)]
mod tests {
    use super::TrainerConfig;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() {
        let config = TrainerConfig::default()
            .max_episodes(10)
            .sync_interval(5)
            .model_dir("/tmp/model");

        let dir = TempDir::new("trainer_config").unwrap();
        let path = dir.path().join("trainer.yaml");
        config.save(&path).unwrap();
        let config_ = TrainerConfig::load(&path).unwrap();
        assert_eq!(config, config_);
    }
}
