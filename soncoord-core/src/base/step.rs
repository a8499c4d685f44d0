//! Environment step.
use super::Env;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with episode-end flags.
///
/// An environment emits a [`Step`] object at every interaction step.
/// This object is used to create transitions `(o_t, a_t, o_t+1, r_t)`.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: Vec<f32>,

    /// Flag denoting if the episode was terminated by the environment.
    pub is_terminated: Vec<i8>,

    /// Flag denoting if the episode was cut short, e.g. because the
    /// simulator returned no further state. When set, `obs` holds a dummy
    /// value and must not be stored.
    pub is_truncated: Vec<i8>,

    /// Information defined by user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: Vec<f32>,
        is_terminated: Vec<i8>,
        is_truncated: Vec<i8>,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated[0] == 1 || self.is_truncated[0] == 1
    }
}

/// Processes a [`Step`] and outputs an item [`Self::Output`].
///
/// [`Step`] objects are transformed to [`Self::Output`], which will be
/// pushed into a replay buffer implementing
/// [`ExperienceBufferBase`](crate::ExperienceBufferBase).
/// The type [`Self::Output`] should be the same as
/// [`ExperienceBufferBase::Item`](crate::ExperienceBufferBase::Item).
pub trait StepProcessor<E: Env> {
    /// Configuration.
    type Config: Clone;

    /// The type of transitions produced by this trait.
    type Output;

    /// Builds a processor.
    fn build(config: &Self::Config) -> Self;

    /// Resets the processor with the initial observation of an episode.
    fn reset(&mut self, init_obs: E::Obs);

    /// Processes a [`Step`] object into a transition.
    fn process(&mut self, step: Step<E>) -> Self::Output;
}
