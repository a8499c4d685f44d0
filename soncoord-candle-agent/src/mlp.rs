//! Multilayer perceptron.
mod base;
use crate::util::OutDim;
pub use base::Mlp;
use candle_core::Tensor;
use candle_nn::{Linear, Module};
use serde::{Deserialize, Serialize};

/// Configuration of [`Mlp`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MlpConfig {
    pub(crate) in_dim: i64,
    pub(crate) units: Vec<i64>,
    pub(crate) out_dim: i64,
    pub(crate) activation_out: bool,
}

impl MlpConfig {
    /// Creates the configuration of an MLP with the given input dimension,
    /// hidden-layer widths and output dimension.
    ///
    /// * `activation_out` - If `true`, a ReLU is applied to the output layer.
    pub fn new(in_dim: i64, units: Vec<i64>, out_dim: i64, activation_out: bool) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation_out,
        }
    }
}

impl OutDim for MlpConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, out_dim: i64) {
        self.out_dim = out_dim;
    }
}

fn mlp_forward(xs: Tensor, layers: &Vec<Linear>) -> Tensor {
    let n_layers = layers.len();
    let mut xs = xs;

    for i in 0..=n_layers - 2 {
        xs = layers[i].forward(&xs).unwrap().relu().unwrap();
    }

    layers[n_layers - 1].forward(&xs).unwrap()
}
