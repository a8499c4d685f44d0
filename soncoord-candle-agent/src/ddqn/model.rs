use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{track, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`DdqnModel`].
pub struct DdqnModelConfig<Q>
where
    Q: OutDim,
{
    pub(super) q_config: Option<Q>,
    pub(super) opt_config: OptimizerConfig,
}

impl<Q> Default for DdqnModelConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> DdqnModelConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: i64) -> Self {
        match &mut self.q_config {
            None => {}
            Some(q_config) => q_config.set_out_dim(v),
        };
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`DdqnModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DdqnModelConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action-value function with its [`VarMap`] and optimizer.
///
/// [`VarMap`]: https://docs.rs/candle-nn/0.8.4/candle_nn/var_map/struct.VarMap.html
pub struct DdqnModel<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    device: Device,
    varmap: VarMap,

    // Dimension of the output vector (equal to the number of actions).
    pub(super) out_dim: i64,

    // Action-value function
    q: Q,

    opt_config: OptimizerConfig,
    q_config: Q::Config,
    opt: Optimizer,
}

impl<Q> DdqnModel<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`DdqnModel`].
    pub fn build(config: DdqnModelConfig<Q::Config>, device: Device) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let out_dim = q_config.get_out_dim();
        let opt_config = config.opt_config;
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, q_config.clone())
        };

        Ok(Self::_build(device, out_dim, opt_config, q_config, q, varmap))
    }

    fn _build(
        device: Device,
        out_dim: i64,
        opt_config: OptimizerConfig,
        q_config: Q::Config,
        q: Q,
        varmap: VarMap,
    ) -> Self {
        let opt = opt_config.build(varmap.all_vars()).unwrap();

        Self {
            device,
            out_dim,
            opt_config,
            varmap,
            opt,
            q,
            q_config,
        }
    }

    /// Outputs the action-value given observation(s).
    pub fn forward(&self, obs: &Q::Input) -> Tensor {
        self.q.forward(obs)
    }

    /// Applies a backward pass and an optimization step.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Returns the variables of the model.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the variables to the given path.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save model parameters to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the variables from the given path.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load model parameters from {:?}", path.as_ref());
        Ok(())
    }
}

impl<Q> Clone for DdqnModel<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Clones the model into independently owned parameter storage.
    ///
    /// The fresh variables are overwritten with the values of this model's
    /// variables, so the clone starts identical but can be updated on its
    /// own, as a target network must be.
    fn clone(&self) -> Self {
        let device = self.device.clone();
        let out_dim = self.out_dim;
        let opt_config = self.opt_config.clone();
        let q_config = self.q_config.clone();
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, self.q_config.clone())
        };

        let cloned = Self::_build(device, out_dim, opt_config, q_config, q, varmap);
        track(&cloned.varmap, &self.varmap, 1.0).unwrap();
        cloned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::{Mlp, MlpConfig};
    use crate::opt::OptimizerConfig;

    fn model() -> DdqnModel<Mlp> {
        let config = DdqnModelConfig::default()
            .q_config(MlpConfig::new(4, vec![8], 3, false))
            .opt_config(OptimizerConfig::Adam { lr: 0.001 });
        DdqnModel::build(config, Device::Cpu).unwrap()
    }

    #[test]
    fn test_clone_copies_parameters() {
        let online = model();
        let target = online.clone();

        let x = Tensor::randn(0f32, 1f32, (2, 4), &Device::Cpu).unwrap();
        assert_eq!(
            online.forward(&x).to_vec2::<f32>().unwrap(),
            target.forward(&x).to_vec2::<f32>().unwrap(),
        );
    }

    #[test]
    fn test_clone_owns_distinct_storage() {
        let online = model();
        let target = online.clone();

        let x = Tensor::randn(0f32, 1f32, (2, 4), &Device::Cpu).unwrap();
        let before = target.forward(&x).to_vec2::<f32>().unwrap();

        // Shift every online parameter; the target must not move with it.
        for (_, v) in online.get_varmap().data().lock().unwrap().iter() {
            v.set(&(v.as_tensor() + 1.0).unwrap()).unwrap();
        }
        assert_eq!(target.forward(&x).to_vec2::<f32>().unwrap(), before);
        assert_ne!(
            online.forward(&x).to_vec2::<f32>().unwrap(),
            target.forward(&x).to_vec2::<f32>().unwrap(),
        );

        // A full-copy track realigns the target with the online network,
        // the way the agent synchronizes.
        track(target.get_varmap(), online.get_varmap(), 1.0).unwrap();
        assert_eq!(
            online.forward(&x).to_vec2::<f32>().unwrap(),
            target.forward(&x).to_vec2::<f32>().unwrap(),
        );
    }
}
