//! Exploration strategy of the double DQN agent.
use candle_core::{shape::D, DType, Tensor};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer with multiplicative decay.
///
/// The exploration rate is decayed by [`EpsilonGreedy::decay`], which the
/// agent calls once per stored transition. The rate thus shrinks with
/// accumulated experience and never goes below `eps_final`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    pub(super) eps: f64,
    pub(super) eps_final: f64,
    pub(super) eps_decay: f64,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            eps: 1.0,
            eps_final: 0.01,
            eps_decay: 0.999,
        }
    }
}

impl EpsilonGreedy {
    /// Takes an action based on action values, returns i64 tensor.
    ///
    /// * `a` - action values of shape `[n, n_actions]`.
    pub fn action(&self, a: &Tensor, rng: &mut impl Rng) -> Tensor {
        let is_random = rng.gen::<f64>() < self.eps;

        if is_random {
            let n_samples = a.dims()[0];
            let n_actions = a.dims()[1] as u64;
            Tensor::from_slice(
                (0..n_samples)
                    .map(|_| (rng.gen::<u64>() % n_actions) as i64)
                    .collect::<Vec<_>>()
                    .as_slice(),
                &[n_samples],
                a.device(),
            )
            .unwrap()
        } else {
            a.argmax(D::Minus1).unwrap().to_dtype(DType::I64).unwrap()
        }
    }

    /// Multiplies the exploration rate by the decay factor, if the rate is
    /// still above its floor.
    pub fn decay(&mut self) {
        if self.eps > self.eps_final {
            self.eps *= self.eps_decay;
        }
    }

    /// The current exploration rate.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Sets the initial exploration rate.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps = v;
        self
    }

    /// Sets the floor of the exploration rate.
    pub fn eps_final(mut self, v: f64) -> Self {
        self.eps_final = v;
        self
    }

    /// Sets the multiplicative decay factor.
    pub fn eps_decay(mut self, v: f64) -> Self {
        self.eps_decay = v;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::EpsilonGreedy;

    #[test]
    fn test_decay_is_multiplicative() {
        let mut explorer = EpsilonGreedy::default();
        explorer.decay();
        assert!((explorer.eps() - 0.999).abs() < 1e-12);
        explorer.decay();
        assert!((explorer.eps() - 0.999 * 0.999).abs() < 1e-12);
    }

    #[test]
    fn test_decay_stops_at_floor() {
        let mut explorer = EpsilonGreedy::default()
            .eps_start(0.011)
            .eps_final(0.01)
            .eps_decay(0.5);
        explorer.decay();
        // One more step would go below the floor, so the rate stays put.
        let eps = explorer.eps();
        explorer.decay();
        assert_eq!(explorer.eps(), eps);
    }
}
