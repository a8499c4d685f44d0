//! Transition batch.

/// A batch of transitions `(o_t, a_t, o_t+1, r_t)` sampled from a replay
/// buffer.
///
/// When the buffer is prioritized, the batch additionally carries the
/// sampled leaf indices and normalized importance weights; the indices are
/// handed back to the buffer together with the TD-errors of the batch.
pub trait TransitionBatch {
    /// A set of observations in a batch.
    type ObsBatch;

    /// A set of actions in a batch.
    type ActBatch;

    /// Unpacks the data `(o_t, a_t, o_t+1, r_t, ix_sample, weight)`.
    #[allow(clippy::type_complexity)]
    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Option<Vec<usize>>,
        Option<Vec<f32>>,
    );

    /// Returns the number of transitions in the batch.
    fn len(&self) -> usize;

    /// Returns `o_t`.
    fn obs(&self) -> &Self::ObsBatch;

    /// Returns `a_t`.
    fn act(&self) -> &Self::ActBatch;
}
