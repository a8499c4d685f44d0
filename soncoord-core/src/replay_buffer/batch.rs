//! Generic transition batches.
use crate::TransitionBatch;

/// Fixed-capacity storage of observations or actions.
///
/// Implementors back the parallel arrays of the replay buffer and the
/// batches sampled from it. `push` writes at an index, `sample` gathers a
/// set of indices into a new instance.
pub trait BatchBase {
    /// Creates a new storage with the specified capacity.
    fn new(capacity: usize) -> Self;

    /// Writes `data` at the specified index.
    fn push(&mut self, ix: usize, data: Self);

    /// Gathers the entries at the specified indices into a new instance.
    fn sample(&self, ixs: &Vec<usize>) -> Self;
}

/// A batch of transitions `(o_t, a_t, o_t+1, r_t)`.
///
/// Produced in two places: by the step processor, as a single-transition
/// batch pushed into the replay buffer, and by the buffer itself when
/// sampling. Sampled batches carry the leaf indices and normalized
/// importance weights of prioritized sampling.
pub struct GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observations.
    pub obs: O,

    /// Actions.
    pub act: A,

    /// Next observations.
    pub next_obs: O,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Leaf indices of the sampled transitions, `None` when pushed.
    pub ix_sample: Option<Vec<usize>>,

    /// Normalized importance weights, `None` when pushed.
    pub weight: Option<Vec<f32>>,
}

impl<O, A> TransitionBatch for GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Option<Vec<usize>>,
        Option<Vec<f32>>,
    ) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.ix_sample,
            self.weight,
        )
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &Self::ObsBatch {
        &self.obs
    }

    fn act(&self) -> &Self::ActBatch {
        &self.act
    }
}

impl<O, A> GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Creates an empty batch with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: Vec::with_capacity(capacity),
            ix_sample: None,
            weight: None,
        }
    }
}
