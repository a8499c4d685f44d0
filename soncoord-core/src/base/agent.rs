//! Agent.
use super::{Env, Policy, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Sets the policy to training mode.
    fn train(&mut self);

    /// Sets the policy to evaluation mode.
    fn eval(&mut self);

    /// Returns if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step.
    ///
    /// `buffer` is a replay buffer from which transition batches are taken
    /// for updating model parameters. Returns `None` when the agent skips
    /// the step, e.g. during its warm-up period.
    fn opt(&mut self, buffer: &mut R) -> Option<Record>;

    /// Notifies the agent that one transition has been stored in the
    /// replay buffer.
    ///
    /// The trainer calls this once per stored transition, which lets
    /// exploration schedules advance with accumulated experience rather
    /// than with wall-clock steps. The default does nothing.
    fn on_transition(&mut self) {}

    /// Copies the online parameters into the target model, if the agent
    /// keeps one.
    ///
    /// Called by the trainer on a fixed cadence; the agent never syncs on
    /// its own. The default does nothing.
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    /// Saves the parameters of the agent in the given directory.
    ///
    /// This method commonly creates a number of files in the directory,
    /// e.g. the online and target Q-networks of a value-based agent.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
