//! Observations.
use crate::{N_CELLS, STATE_DIM};
use candle_core::{Device, Tensor};
use ndarray::Array1;
use soncoord_candle_agent::TensorBatch;
use soncoord_core::Obs;

/// Per-cell network telemetry reported by the simulator.
///
/// Every field holds one value per cell, except `results` which carries
/// the cumulative `[rlf, pp]` counters of the run.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkObs {
    /// Discretized average UE velocity, the MRO sub-policy state.
    pub average_velocity: Array1<f32>,

    /// Discretized load state, the MLB sub-policy state.
    pub mlb_state: Array1<f32>,

    /// Average channel quality indicator.
    pub avg_cqi: Array1<f32>,

    /// Downlink PRB usage in percent.
    pub dl_prb_usage: Array1<f32>,

    /// Best-cell indicator.
    pub best_cell: Array1<f32>,

    /// PRB usage of the last step, in percent.
    pub step_prb: Array1<f32>,

    /// Radio-link failures of the last step.
    pub step_rlf: Array1<f32>,

    /// Ping-pong handovers of the last step.
    pub step_pp: Array1<f32>,

    /// Cumulative `[rlf, pp]` counters.
    pub results: Array1<f32>,
}

impl NetworkObs {
    /// Per-cell MRO state indices, taken from the velocity field.
    pub fn mro_states(&self) -> [usize; N_CELLS] {
        let mut states = [0; N_CELLS];
        for (i, v) in self.average_velocity.iter().enumerate() {
            states[i] = *v as usize;
        }
        states
    }

    /// Per-cell MLB state indices, taken from the load-state field.
    pub fn mlb_states(&self) -> [usize; N_CELLS] {
        let mut states = [0; N_CELLS];
        for (i, v) in self.mlb_state.iter().enumerate() {
            states[i] = *v as usize;
        }
        states
    }
}

/// State vector of the coordinator agent.
///
/// The layout is six blocks of [`N_CELLS`] values: the direction-of-change
/// (+1/0/-1) of the CIO, HOM and TTT proposals relative to the previous
/// step's proposals, followed by average CQI, downlink PRB usage and the
/// best-cell indicator.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinatorObs {
    /// The state vector of length [`STATE_DIM`].
    pub obs: Array1<f32>,
}

impl CoordinatorObs {
    /// Concatenates proposal directions and telemetry into the state vector.
    pub fn encode(
        cio_dir: &[f32; N_CELLS],
        hom_dir: &[f32; N_CELLS],
        ttt_dir: &[f32; N_CELLS],
        net: &NetworkObs,
    ) -> Self {
        let mut obs = Vec::with_capacity(STATE_DIM);
        obs.extend_from_slice(cio_dir);
        obs.extend_from_slice(hom_dir);
        obs.extend_from_slice(ttt_dir);
        obs.extend(net.avg_cqi.iter());
        obs.extend(net.dl_prb_usage.iter());
        obs.extend(net.best_cell.iter());

        Self {
            obs: Array1::from(obs),
        }
    }

    /// A zero observation, used as a placeholder in truncated steps.
    pub fn dummy() -> Self {
        Self {
            obs: Array1::zeros(STATE_DIM),
        }
    }
}

impl Obs for CoordinatorObs {
    fn len(&self) -> usize {
        1
    }
}

impl From<CoordinatorObs> for Tensor {
    fn from(obs: CoordinatorObs) -> Tensor {
        let v = obs.obs.to_vec();
        Tensor::from_vec(v, (1, STATE_DIM), &Device::Cpu).unwrap()
    }
}

impl From<CoordinatorObs> for TensorBatch {
    fn from(obs: CoordinatorObs) -> Self {
        TensorBatch::from_tensor(obs.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn net_obs() -> NetworkObs {
        NetworkObs {
            average_velocity: Array1::zeros(N_CELLS),
            mlb_state: Array1::zeros(N_CELLS),
            avg_cqi: Array1::from_elem(N_CELLS, 10.0),
            dl_prb_usage: Array1::from_elem(N_CELLS, 40.0),
            best_cell: Array1::from_elem(N_CELLS, 1.0),
            step_prb: Array1::zeros(N_CELLS),
            step_rlf: Array1::zeros(N_CELLS),
            step_pp: Array1::zeros(N_CELLS),
            results: Array1::zeros(2),
        }
    }

    #[test]
    fn test_encode_layout() {
        let cio = [1.0; N_CELLS];
        let hom = [0.0; N_CELLS];
        let ttt = [-1.0; N_CELLS];
        let obs = CoordinatorObs::encode(&cio, &hom, &ttt, &net_obs());

        assert_eq!(obs.obs.len(), STATE_DIM);
        assert_eq!(obs.obs[0], 1.0);
        assert_eq!(obs.obs[N_CELLS], 0.0);
        assert_eq!(obs.obs[2 * N_CELLS], -1.0);
        assert_eq!(obs.obs[3 * N_CELLS], 10.0);
        assert_eq!(obs.obs[4 * N_CELLS], 40.0);
        assert_eq!(obs.obs[5 * N_CELLS], 1.0);
    }

    #[test]
    fn test_tensor_conversion_shape() {
        let obs = CoordinatorObs::dummy();
        let t: Tensor = obs.into();
        assert_eq!(t.dims(), &[1, STATE_DIM]);
    }
}
