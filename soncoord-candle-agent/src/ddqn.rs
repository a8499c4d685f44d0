//! Double DQN agent.
//!
//! The agent keeps an online and a target Q-network. Action selection and
//! the argmax over next-state action values use the online network, while
//! the value of the selected action is taken from the target network. The
//! target network is synchronized by the trainer through
//! [`Agent::sync`](soncoord_core::Agent::sync) on a fixed cadence.
mod base;
mod config;
mod explorer;
mod model;
pub use base::Ddqn;
pub use config::DdqnConfig;
pub use explorer::EpsilonGreedy;
pub use model::{DdqnModel, DdqnModelConfig};
