//! Configuration of [`SonEnv`](crate::SonEnv).
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`SonEnv`](crate::SonEnv).
///
/// `C` is the configuration type of the simulator implementation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SonEnvConfig<C> {
    /// Configuration of the simulator.
    pub simulator: C,

    /// Paths of the per-cell MRO Q-table files, one per cell.
    pub mro_tables: Vec<String>,

    /// Paths of the per-cell MLB Q-table files, one per cell.
    pub mlb_tables: Vec<String>,
}

impl<C> SonEnvConfig<C>
where
    C: Clone + DeserializeOwned + Serialize,
{
    /// Creates a configuration with the given simulator configuration.
    pub fn new(simulator: C) -> Self {
        Self {
            simulator,
            mro_tables: vec![],
            mlb_tables: vec![],
        }
    }

    /// Sets the MRO Q-table paths.
    pub fn mro_tables(mut self, v: Vec<String>) -> Self {
        self.mro_tables = v;
        self
    }

    /// Sets the MLB Q-table paths.
    pub fn mlb_tables(mut self, v: Vec<String>) -> Self {
        self.mlb_tables = v;
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
