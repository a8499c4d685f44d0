//! Double DQN agent implemented with candle.
use super::{config::DdqnConfig, explorer::EpsilonGreedy, model::DdqnModel};
use crate::{model::SubModel1, util::track, util::OutDim};
use anyhow::Result;
use candle_core::{shape::D, DType, Device, Tensor};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use soncoord_core::{
    record::{Record, RecordValue},
    Agent, Configurable, Env, ExperienceBufferBase, Policy, ReplayBufferBase, TransitionBatch,
};
use std::{fs, marker::PhantomData, path::Path};

/// Computes `r + gamma * Q_tgt(s', argmax_a Q(s', a))`.
///
/// The argmax is taken over the online network's action values while the
/// bootstrapped value comes from the target network, which decouples action
/// selection from value estimation.
fn double_q_target(gamma: f64, reward: &Tensor, q_next_online: &Tensor, q_next_tgt: &Tensor) -> Tensor {
    let best = q_next_online.argmax_keepdim(D::Minus1).unwrap();
    let q = q_next_tgt
        .gather(&best, D::Minus1)
        .unwrap()
        .squeeze(D::Minus1)
        .unwrap();
    (reward + (gamma * q).unwrap()).unwrap().detach()
}

/// Double DQN agent.
///
/// The agent's exploration rate decays once per stored transition via
/// [`Agent::on_transition`], and its target network is replaced with a copy
/// of the online network when the trainer calls [`Agent::sync`].
pub struct Ddqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    pub(in crate::ddqn) qnet: DdqnModel<Q>,
    pub(in crate::ddqn) qnet_tgt: DdqnModel<Q>,
    pub(in crate::ddqn) gamma: f64,
    pub(in crate::ddqn) train_start: usize,
    pub(in crate::ddqn) batch_size: usize,
    pub(in crate::ddqn) explorer: EpsilonGreedy,
    pub(in crate::ddqn) train: bool,
    pub(in crate::ddqn) device: Device,
    pub(in crate::ddqn) n_opts: usize,
    rng: SmallRng,
    phantom: PhantomData<(E, R)>,
}

impl<E, Q, R> Ddqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input>,
    E::Act: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    fn update_critic(&mut self, buffer: &mut R) -> f32 {
        let batch = buffer.batch(self.batch_size).unwrap();
        let (obs, act, next_obs, reward, ixs, weight) = batch.unpack();
        let obs = obs.into();
        let act = act.into().to_device(&self.device).unwrap();
        let next_obs = next_obs.into();
        let reward = Tensor::from_slice(&reward[..], (reward.len(),), &self.device).unwrap();

        let pred = {
            let x = self.qnet.forward(&obs);
            x.gather(&act, D::Minus1)
                .unwrap()
                .squeeze(D::Minus1)
                .unwrap()
        };

        let tgt = {
            let q_next_online = self.qnet.forward(&next_obs);
            let q_next_tgt = self.qnet_tgt.forward(&next_obs);
            double_q_target(self.gamma, &reward, &q_next_online, &q_next_tgt)
        };

        // Sampled transitions get their priorities refreshed from the
        // absolute TD-errors of this update.
        let td_errs: Vec<f32> = (&pred - &tgt).unwrap().abs().unwrap().to_vec1().unwrap();
        buffer.update_priority(&ixs, &Some(td_errs));

        let loss = match weight {
            Some(ws) => {
                let ws = Tensor::from_slice(&ws[..], (ws.len(),), &self.device).unwrap();
                let sq_err = (&pred - &tgt).unwrap().powf(2.0).unwrap();
                (ws * sq_err).unwrap().mean_all().unwrap()
            }
            None => candle_nn::loss::mse(&pred, &tgt).unwrap(),
        };

        self.qnet.backward_step(&loss).unwrap();

        loss.to_scalar::<f32>().unwrap()
    }

    fn opt_(&mut self, buffer: &mut R) -> Record {
        let loss_critic = self.update_critic(buffer);
        self.n_opts += 1;

        Record::from_slice(&[
            ("loss_critic", RecordValue::Scalar(loss_critic)),
            ("eps", RecordValue::Scalar(self.explorer.eps() as f32)),
        ])
    }
}

impl<E, Q, R> Policy<E> for Ddqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input>,
    E::Act: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let a = self.qnet.forward(&obs.clone().into());
        let a = if self.train {
            self.explorer.action(&a, &mut self.rng)
        } else {
            a.argmax(D::Minus1).unwrap().to_dtype(DType::I64).unwrap()
        };
        a.into()
    }
}

impl<E, Q, R> Configurable for Ddqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input>,
    E::Act: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    type Config = DdqnConfig<Q::Config>;

    fn build(config: Self::Config) -> Self {
        let device: Device = config
            .device
            .expect("No device is given for the DDQN agent")
            .into();
        let qnet = DdqnModel::build(config.model_config.clone(), device.clone()).unwrap();
        let qnet_tgt = qnet.clone();

        Ddqn {
            qnet,
            qnet_tgt,
            gamma: config.gamma,
            train_start: config.train_start,
            batch_size: config.batch_size,
            explorer: config.explorer,
            train: config.train,
            device,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(42),
            phantom: PhantomData,
        }
    }
}

impl<E, Q, R> Agent<E, R> for Ddqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    // The warm-up gate reads the buffer's fill level, which lives on
    // `ExperienceBufferBase`.
    R: ReplayBufferBase + ExperienceBufferBase,
    E::Obs: Into<Q::Input>,
    E::Act: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, buffer: &mut R) -> Option<Record> {
        if buffer.len() >= self.train_start {
            Some(self.opt_(buffer))
        } else {
            None
        }
    }

    fn on_transition(&mut self) {
        self.explorer.decay();
    }

    fn sync(&mut self) -> Result<()> {
        // Full parameter copy into the target network.
        track(self.qnet_tgt.get_varmap(), self.qnet.get_varmap(), 1.0)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(path.join("qnet.safetensors").as_path())?;
        self.qnet_tgt
            .save(path.join("qnet_tgt.safetensors").as_path())?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path.join("qnet.safetensors").as_path())?;
        self.qnet_tgt
            .load(path.join("qnet_tgt.safetensors").as_path())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::double_q_target;
    use candle_core::{Device, Tensor};

    #[test]
    fn test_double_q_target_bootstraps_from_target_net() {
        let device = Device::Cpu;
        let reward = Tensor::from_slice(&[0.5f32], (1,), &device).unwrap();
        let q_next_online = Tensor::from_slice(&[1.0f32, 2.0], (1, 2), &device).unwrap();
        let q_next_tgt = Tensor::from_slice(&[5.0f32, 9.0], (1, 2), &device).unwrap();

        // Online argmax is action 1, so the target net's 9.0 is used.
        let tgt = double_q_target(0.95, &reward, &q_next_online, &q_next_tgt);
        let tgt: Vec<f32> = tgt.to_vec1().unwrap();
        assert!((tgt[0] - (0.5 + 0.95 * 9.0)).abs() < 1e-6);
    }

    #[test]
    fn test_double_q_target_uses_online_argmax() {
        let device = Device::Cpu;
        let reward = Tensor::from_slice(&[1.0f32], (1,), &device).unwrap();
        let q_next_online = Tensor::from_slice(&[2.0f32, 1.0], (1, 2), &device).unwrap();
        let q_next_tgt = Tensor::from_slice(&[5.0f32, 9.0], (1, 2), &device).unwrap();

        // Vanilla DQN would bootstrap from max(q_next_tgt) = 9.0; double DQN
        // takes the target value at the online argmax (action 0) instead.
        let tgt = double_q_target(0.95, &reward, &q_next_online, &q_next_tgt);
        let tgt: Vec<f32> = tgt.to_vec1().unwrap();
        assert!((tgt[0] - (1.0 + 0.95 * 5.0)).abs() < 1e-6);
    }

    #[test]
    fn test_double_q_target_batched() {
        let device = Device::Cpu;
        let reward = Tensor::from_slice(&[0.0f32, 1.0], (2,), &device).unwrap();
        let q_next_online =
            Tensor::from_slice(&[0.0f32, 1.0, 3.0, 2.0], (2, 2), &device).unwrap();
        let q_next_tgt = Tensor::from_slice(&[4.0f32, 6.0, 8.0, 10.0], (2, 2), &device).unwrap();

        let tgt = double_q_target(0.5, &reward, &q_next_online, &q_next_tgt);
        let tgt: Vec<f32> = tgt.to_vec1().unwrap();
        assert!((tgt[0] - 0.5 * 6.0).abs() < 1e-6);
        assert!((tgt[1] - (1.0 + 0.5 * 8.0)).abs() < 1e-6);
    }
}
