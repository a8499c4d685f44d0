//! Prioritized experience replay.
//!
//! This module implements the replay subsystem of the coordinator agent:
//! - [`SumTree`] — a binary tree of cumulative priorities over a fixed
//!   number of leaf slots, supporting O(log n) point update and O(log n)
//!   proportional sampling.
//! - [`PerReplayBuffer`] — a fixed-capacity ring buffer of transitions,
//!   co-indexed with the sum tree, computing importance-sampling weights
//!   and converting TD-errors into priorities.
//! - [`SimpleStepProcessor`] — converts environment steps into transitions.
mod base;
mod batch;
mod config;
mod step_proc;
mod sum_tree;

pub use base::PerReplayBuffer;
pub use batch::{BatchBase, GenericTransitionBatch};
pub use config::PerReplayBufferConfig;
pub use step_proc::{SimpleStepProcessor, SimpleStepProcessorConfig};
pub use sum_tree::SumTree;
