//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// The environment owns everything behind the agent boundary: for the
/// handover coordination task this includes the simulator connection and
/// the pre-trained per-cell control policies.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns an initial observation.
    ///
    /// Called at the beginning of each episode.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    ///
    /// An episode that ends without a final observation is reported through
    /// `is_truncated` of the returned [`Step`]; it is an expected outcome,
    /// not an error.
    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;
}
