//! Types for recording training metrics.
//!
//! A [`Record`] is a container of key-value pairs produced during training,
//! e.g. the loss of an optimization step or the reward of an environment
//! step. Records are handed to a [`Recorder`], which aggregates and writes
//! them to an output destination.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
