#![warn(missing_docs)]
//! Core abstractions for training a coordination agent over pre-trained
//! control policies.
//!
//! This crate provides the traits connecting an environment, a trainable
//! policy and a replay buffer ([`Env`], [`Agent`], [`ReplayBufferBase`]),
//! a prioritized replay buffer backed by a sum tree
//! ([`replay_buffer::PerReplayBuffer`]), a metrics pipeline ([`record`])
//! and an episode-driven training loop ([`Trainer`]).
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Agent, Configurable, Env, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase,
    Step, StepProcessor, TransitionBatch,
};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};
