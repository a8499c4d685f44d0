//! Converts environment steps into transitions.
use super::{BatchBase, GenericTransitionBatch};
use crate::{Env, Obs, Step, StepProcessor};
use std::{default::Default, marker::PhantomData};

/// Configuration of [`SimpleStepProcessor`].
#[derive(Clone, Debug)]
pub struct SimpleStepProcessorConfig {}

impl Default for SimpleStepProcessorConfig {
    fn default() -> Self {
        Self {}
    }
}

/// Converts a [`Step`] into a single-transition batch with 1-step backup.
///
/// The previous observation `o_t` is kept in the processor; the step
/// supplies `(a_t, o_t+1, r_t)`. [`StepProcessor::reset`] must be called
/// with the initial observation of each episode before processing steps.
pub struct SimpleStepProcessor<E, O, A> {
    prev_obs: Option<O>,
    phantom: PhantomData<(E, A)>,
}

impl<E, O, A> StepProcessor<E> for SimpleStepProcessor<E, O, A>
where
    E: Env,
    O: BatchBase + From<E::Obs>,
    A: BatchBase + From<E::Act>,
{
    type Config = SimpleStepProcessorConfig;
    type Output = GenericTransitionBatch<O, A>;

    fn build(_config: &Self::Config) -> Self {
        Self {
            prev_obs: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs.into());
    }

    /// Processes a [`Step`] object into a transition.
    ///
    /// # Panics
    ///
    /// Panics if `reset()` has not been called, or if the step is a
    /// truncation without a final observation (the caller must not push
    /// such steps).
    fn process(&mut self, step: Step<E>) -> Self::Output {
        assert_eq!(step.obs.len(), 1);
        assert_eq!(
            step.is_truncated[0], 0,
            "truncated steps carry no observation and must not be processed"
        );

        let next_obs = step.obs.clone().into();
        let obs = self
            .prev_obs
            .replace(step.obs.into())
            .expect("prev_obs is not set. Forgot to call reset()?");
        let act = step.act.into();
        let reward = step.reward;

        GenericTransitionBatch {
            obs,
            act,
            next_obs,
            reward,
            ix_sample: None,
            weight: None,
        }
    }
}
