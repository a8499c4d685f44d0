//! Train [`Agent`].
mod config;
use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, ExperienceBufferBase, ReplayBufferBase, StepProcessor,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
use std::path::Path;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the episode-driven training loop and related objects.
///
/// # Training loop
///
/// 1. Build instances of [`Env`], [`StepProcessor`] and the replay buffer
///    implementing [`ReplayBufferBase`].
/// 2. For each episode, reset [`Env`] and hand its initial observation to
///    the [`StepProcessor`].
/// 3. For each environment step: sample an action from the agent, apply it
///    to the environment, convert the resulting [`Step`](crate::Step) into
///    a transition and push it into the replay buffer, notify the agent
///    ([`Agent::on_transition`]), then let the agent do an optimization
///    step ([`Agent::opt`]; the agent may skip it during warm-up).
/// 4. Every `sync_interval` environment steps, copy the agent's online
///    parameters into its target model ([`Agent::sync`]). Target staleness
///    is a trainer-controlled knob; the agent never syncs on its own.
/// 5. An episode ends when the step budget is exhausted, the environment
///    terminates it, or the environment truncates it without a final
///    observation. The last case is an expected outcome; the truncated
///    step is discarded and the next episode starts.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs|A
///     B -->|"Step&lt;E: Env&gt;"|C[StepProcessor]
///     C -->|ExperienceBufferBase::Item|D[ReplayBufferBase]
///     D -->|TransitionBatch|A
/// ```
pub struct Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: ExperienceBufferBase<Item = P::Output> + ReplayBufferBase,
{
    /// Configuration of the environment.
    env_config: E::Config,

    /// Configuration of the transition producer.
    step_proc_config: P::Config,

    /// Configuration of the replay buffer.
    replay_buffer_config: R::Config,

    /// Where to save the trained model.
    model_dir: Option<String>,

    /// Number of training episodes.
    max_episodes: usize,

    /// Step budget per episode.
    max_env_steps: usize,

    /// Interval of target-model synchronization in environment steps.
    sync_interval: usize,

    /// Interval of saving model parameters in episodes.
    save_interval: usize,

    /// Random seed given to the environment.
    seed: i64,
}

impl<E, P, R> Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: ExperienceBufferBase<Item = P::Output> + ReplayBufferBase,
{
    /// Constructs a trainer.
    pub fn build(
        config: TrainerConfig,
        env_config: E::Config,
        step_proc_config: P::Config,
        replay_buffer_config: R::Config,
    ) -> Self {
        Self {
            env_config,
            step_proc_config,
            replay_buffer_config,
            model_dir: config.model_dir,
            max_episodes: config.max_episodes,
            max_env_steps: config.max_env_steps,
            sync_interval: config.sync_interval,
            save_interval: config.save_interval,
            seed: config.seed,
        }
    }

    fn save_model_with_episode<A: Agent<E, R>>(agent: &A, model_dir: String, episode: usize) {
        let model_dir = model_dir + format!("/{}", episode).as_str();
        match agent.save_params(Path::new(&model_dir)) {
            Ok(()) => info!("Saved the model in {:?}", &model_dir),
            Err(_) => info!("Failed to save model in {:?}", &model_dir),
        }
    }

    /// Runs an episode and returns `(steps, accumulated reward, truncated)`.
    fn run_episode<A: Agent<E, R>>(
        &mut self,
        agent: &mut A,
        env: &mut E,
        step_proc: &mut P,
        buffer: &mut R,
        recorder: &mut impl Recorder,
        env_steps: &mut usize,
    ) -> Result<(usize, f32, bool)> {
        let mut obs = env.reset()?;
        step_proc.reset(obs.clone());

        let mut ep_reward = 0f32;

        for j in 0..self.max_env_steps {
            let act = agent.sample(&obs);
            let (step, mut record) = env.step(&act);
            *env_steps += 1;

            if step.is_truncated[0] == 1 {
                // The environment produced no further state; the episode
                // ends here and the step is discarded.
                return Ok((j + 1, ep_reward, true));
            }

            let is_terminated = step.is_terminated[0] == 1;
            ep_reward += step.reward[0];
            obs = step.obs.clone();

            let transition = step_proc.process(step);
            buffer.push(transition)?;
            agent.on_transition();

            if let Some(record_agent) = agent.opt(buffer) {
                record = record.merge(record_agent);
            }

            if self.sync_interval > 0 && *env_steps % self.sync_interval == 0 {
                agent.sync()?;
            }

            if !record.is_empty() {
                recorder.store(record);
            }

            if is_terminated {
                return Ok((j + 1, ep_reward, false));
            }
        }

        Ok((self.max_env_steps, ep_reward, false))
    }

    /// Trains the agent.
    pub fn train<A>(&mut self, agent: &mut A, recorder: &mut impl Recorder) -> Result<()>
    where
        A: Agent<E, R>,
    {
        let mut env = E::build(&self.env_config, self.seed)?;
        let mut step_proc = P::build(&self.step_proc_config);
        let mut buffer = R::build(&self.replay_buffer_config);
        let mut env_steps: usize = 0;
        let mut aborted_episodes: usize = 0;
        let mut full_episodes: usize = 0;
        agent.train();

        for ep in 0..self.max_episodes {
            let (ep_len, ep_reward, truncated) = self.run_episode(
                agent,
                &mut env,
                &mut step_proc,
                &mut buffer,
                recorder,
                &mut env_steps,
            )?;

            if truncated && ep_len < self.max_env_steps {
                aborted_episodes += 1;
            } else if ep_len == self.max_env_steps {
                full_episodes += 1;
            }

            let record = Record::from_slice(&[
                ("episode", Scalar(ep as f32)),
                ("episode_len", Scalar(ep_len as f32)),
                ("episode_reward", Scalar(ep_reward)),
                ("aborted_episodes", Scalar(aborted_episodes as f32)),
                ("full_episodes", Scalar(full_episodes as f32)),
            ]);
            recorder.write(record);
            recorder.flush(ep as i64);

            if let Some(model_dir) = &self.model_dir {
                if (self.save_interval > 0) && ((ep + 1) % self.save_interval == 0) {
                    Self::save_model_with_episode(agent, model_dir.clone(), ep + 1);
                }
            }
        }

        info!(
            "Finished training: {} env steps, {} aborted episodes",
            env_steps, aborted_episodes
        );

        Ok(())
    }
}
