//! Core traits.
mod agent;
mod batch;
mod env;
mod policy;
mod replay_buffer;
mod step;
pub use agent::Agent;
pub use batch::TransitionBatch;
pub use env::Env;
pub use policy::{Configurable, Policy};
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
use std::fmt::Debug;
pub use step::{Info, Step, StepProcessor};

/// An observation of an environment.
pub trait Obs: Clone + Debug {
    /// Returns the number of observations in the object.
    ///
    /// Vectorized environments are not supported, so this is always 1 in
    /// practice. It is kept so that batch types can be shared with the
    /// replay buffer.
    fn len(&self) -> usize;
}

/// An action on an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of actions in the object.
    fn len(&self) -> usize;
}
