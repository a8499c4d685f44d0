//! Reward shaping.
use crate::obs::NetworkObs;

const LOAD_STD_MIN: f32 = 0.008;
const LOAD_STD_MAX: f32 = 0.314;
const HOAP_MIN: f32 = 0.0;
const HOAP_MAX: f32 = 0.7;
const HOAP_WEIGHT: f32 = 2.75;
const SCALE: f32 = 50.0;

/// Shaped reward of one environment step together with its components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReward {
    /// The shaped reward.
    pub reward: f32,

    /// Standard deviation of the per-cell PRB usage fractions.
    pub load_std: f32,

    /// Radio-link failures per second.
    pub rlf_rate: f32,

    /// Ping-pong handovers per second.
    pub pp_rate: f32,
}

fn round5(v: f32) -> f32 {
    (v * 1e5).round() / 1e5
}

/// Computes the coordinator reward from step telemetry.
///
/// Load imbalance is the population standard deviation of the per-cell PRB
/// usage fractions; handover performance is a 0.7/0.3 mix of the RLF and
/// ping-pong rates over the 60-second step window. Both are min-max
/// normalized against fixed deployment bounds and combined into a negative
/// cost, scaled and rounded to five decimals.
pub fn step_reward(net: &NetworkObs) -> StepReward {
    let prb = net.step_prb.mapv(|v| v / 100.0);
    let mean = prb.mean().unwrap_or(0.0);
    let load_std = prb.mapv(|v| (v - mean) * (v - mean)).mean().unwrap_or(0.0).sqrt();

    let rlf_rate = net.step_rlf.sum() / 60.0;
    let pp_rate = net.step_pp.sum() / 60.0;
    let hoap = 0.7 * rlf_rate + 0.3 * pp_rate;

    let norm_load_std = (load_std - LOAD_STD_MIN) / (LOAD_STD_MAX - LOAD_STD_MIN);
    let norm_hoap = (hoap - HOAP_MIN) / (HOAP_MAX - HOAP_MIN);

    let reward = round5((-norm_load_std - HOAP_WEIGHT * norm_hoap) * SCALE);

    StepReward {
        reward,
        load_std,
        rlf_rate,
        pp_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::N_CELLS;
    use ndarray::Array1;

    fn net_obs(prb: [f32; N_CELLS], rlf: [f32; N_CELLS], pp: [f32; N_CELLS]) -> NetworkObs {
        NetworkObs {
            average_velocity: Array1::zeros(N_CELLS),
            mlb_state: Array1::zeros(N_CELLS),
            avg_cqi: Array1::zeros(N_CELLS),
            dl_prb_usage: Array1::zeros(N_CELLS),
            best_cell: Array1::zeros(N_CELLS),
            step_prb: Array1::from(prb.to_vec()),
            step_rlf: Array1::from(rlf.to_vec()),
            step_pp: Array1::from(pp.to_vec()),
            results: Array1::zeros(2),
        }
    }

    #[test]
    fn test_uniform_load_has_zero_std() {
        let mut rlf = [0.0; N_CELLS];
        rlf[0] = 6.0;
        let mut pp = [0.0; N_CELLS];
        pp[0] = 3.0;
        let r = step_reward(&net_obs([50.0; N_CELLS], rlf, pp));

        assert_eq!(r.load_std, 0.0);
        assert!((r.rlf_rate - 0.1).abs() < 1e-6);
        assert!((r.pp_rate - 0.05).abs() < 1e-6);
        // hoap = 0.085; reward = (0.008/0.306 - 2.75 * 0.085/0.7) * 50.
        assert!((r.reward - (-15.38924)).abs() < 1e-4);
    }

    #[test]
    fn test_reward_rounded_to_five_decimals() {
        let r = step_reward(&net_obs([50.0; N_CELLS], [1.0; N_CELLS], [0.0; N_CELLS]));
        let scaled = r.reward * 1e5;
        assert!((scaled - scaled.round()).abs() < 1e-2);
    }

    #[test]
    fn test_more_failures_lower_reward() {
        let base = step_reward(&net_obs([50.0; N_CELLS], [0.0; N_CELLS], [0.0; N_CELLS]));
        let worse = step_reward(&net_obs([50.0; N_CELLS], [2.0; N_CELLS], [0.0; N_CELLS]));
        assert!(worse.reward < base.reward);
    }

    #[test]
    fn test_load_std_is_population_std() {
        // PRB fractions [0.2, 0.4] over two active cells and zeros
        // elsewhere; std of [0.2, 0.4, 0, ...] with ddof = 0.
        let mut prb = [0.0; N_CELLS];
        prb[0] = 20.0;
        prb[1] = 40.0;
        let r = step_reward(&net_obs(prb, [0.0; N_CELLS], [0.0; N_CELLS]));

        let vals: Vec<f32> = prb.iter().map(|v| v / 100.0).collect();
        let mean: f32 = vals.iter().sum::<f32>() / vals.len() as f32;
        let var: f32 = vals.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / vals.len() as f32;
        assert!((r.load_std - var.sqrt()).abs() < 1e-6);
    }
}
