//! Replay buffer interfaces.
use anyhow::Result;

/// Interface for buffers that store experiences from environments.
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase {
    /// Configuration parameters of the buffer.
    type Config: Clone;

    /// The type of batches generated for training.
    type Batch;

    /// Builds a replay buffer from the given configuration.
    fn build(config: &Self::Config) -> Self;

    /// Constructs a batch of experiences for training.
    ///
    /// Requesting more samples than the buffer holds is a caller error and
    /// panics; it is a precondition violation, not a recoverable runtime
    /// condition.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;

    /// Updates the priorities of the transitions at `ixs` from raw
    /// TD-errors.
    ///
    /// Both arguments are `Some(_)` for prioritized buffers; the indices
    /// are those returned in the corresponding batch.
    fn update_priority(&mut self, ixs: &Option<Vec<usize>>, td_errs: &Option<Vec<f32>>);
}
