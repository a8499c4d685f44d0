//! Environment implementation.
use crate::{
    act::CoordinatorAct,
    config::SonEnvConfig,
    obs::{CoordinatorObs, NetworkObs},
    qtable::{join_proposals, MlbPolicy, MroPolicy},
    reward::step_reward,
    simulator::{HandoverParams, Simulator},
    N_CELLS,
};
use anyhow::Result;
use log::warn;
use soncoord_core::{
    record::{Record, RecordValue::Scalar},
    Env, Step,
};

fn direction(current: f32, previous: f32) -> f32 {
    if current > previous {
        1.0
    } else if current == previous {
        0.0
    } else {
        -1.0
    }
}

/// Per-field direction-of-change of parameter sets, as `(cio, hom, ttt)`.
#[allow(clippy::type_complexity)]
fn directions(
    current: &[HandoverParams; N_CELLS],
    previous: &[HandoverParams; N_CELLS],
) -> ([f32; N_CELLS], [f32; N_CELLS], [f32; N_CELLS]) {
    let mut cio = [0.0; N_CELLS];
    let mut hom = [0.0; N_CELLS];
    let mut ttt = [0.0; N_CELLS];
    for i in 0..N_CELLS {
        cio[i] = direction(current[i].cio, previous[i].cio);
        hom[i] = direction(current[i].hom, previous[i].hom);
        ttt[i] = direction(current[i].ttt, previous[i].ttt);
    }
    (cio, hom, ttt)
}

/// The handover coordination environment.
///
/// Each step the environment holds the current per-cell MRO/MLB proposals;
/// the coordinator's action arbitrates which of them are applied and which
/// cells keep their previously applied parameters. The blended parameters
/// go to the simulator, whose telemetry yields the next proposals, the next
/// coordinator state and the reward.
///
/// The coordinator state compares the freshly computed proposals against
/// the previous step's proposals; on `reset` the baseline is the last
/// applied parameter set, which persists across episodes.
pub struct SonEnv<S: Simulator> {
    simulator: S,
    mro: MroPolicy,
    mlb: MlbPolicy,

    /// Proposals awaiting arbitration in the coming step.
    proposals: [HandoverParams; N_CELLS],

    /// Raw sub-policy actions behind `proposals`.
    mro_actions: [usize; N_CELLS],
    mlb_actions: [usize; N_CELLS],

    /// Sub-policy actions whose proposals were last applied, per cell.
    mro_applied_actions: [usize; N_CELLS],
    mlb_applied_actions: [usize; N_CELLS],

    /// Parameters most recently applied to the network.
    applied: [HandoverParams; N_CELLS],
}

impl<S: Simulator> SonEnv<S> {
    /// Greedy sub-policy proposals for the given telemetry.
    #[allow(clippy::type_complexity)]
    fn propose(
        &self,
        net: &NetworkObs,
    ) -> ([HandoverParams; N_CELLS], [usize; N_CELLS], [usize; N_CELLS]) {
        let mro = self.mro.propose(&net.mro_states());
        let mlb = self.mlb.propose(&net.mlb_states());

        let params = join_proposals(&mlb, &mro);
        let mut mro_actions = [0; N_CELLS];
        let mut mlb_actions = [0; N_CELLS];
        for i in 0..N_CELLS {
            mro_actions[i] = mro[i].action;
            mlb_actions[i] = mlb[i].action;
        }
        (params, mro_actions, mlb_actions)
    }

    /// Blends the pending proposals with the previously applied parameters
    /// according to the per-cell arbitration decisions.
    fn blend(&self, act: &CoordinatorAct) -> [HandoverParams; N_CELLS] {
        let decisions = act.decisions();
        let mut params = self.applied;
        for i in 0..N_CELLS {
            if decisions[i].applies_mlb() {
                params[i].cio = self.proposals[i].cio;
            }
            if decisions[i].applies_mro() {
                params[i].hom = self.proposals[i].hom;
                params[i].ttt = self.proposals[i].ttt;
            }
        }
        params
    }

    /// Latches the sub-policy actions of cells whose proposal was applied.
    fn latch_applied_actions(&mut self, act: &CoordinatorAct) {
        let decisions = act.decisions();
        for i in 0..N_CELLS {
            if decisions[i].applies_mro() {
                self.mro_applied_actions[i] = self.mro_actions[i];
            }
            if decisions[i].applies_mlb() {
                self.mlb_applied_actions[i] = self.mlb_actions[i];
            }
        }
    }

    /// Parameters most recently applied to the network.
    pub fn applied_params(&self) -> &[HandoverParams; N_CELLS] {
        &self.applied
    }

    /// Sub-policy actions behind the most recently applied parameters, as
    /// `(mro, mlb)`.
    pub fn applied_sub_actions(&self) -> (&[usize; N_CELLS], &[usize; N_CELLS]) {
        (&self.mro_applied_actions, &self.mlb_applied_actions)
    }

    fn truncated_step(&self, act: &CoordinatorAct) -> (Step<Self>, Record) {
        let step = Step::new(
            CoordinatorObs::dummy(),
            act.clone(),
            vec![0.0],
            vec![0],
            vec![1],
            (),
        );
        (step, Record::empty())
    }
}

impl<S: Simulator> Env for SonEnv<S> {
    type Config = SonEnvConfig<S::Config>;
    type Obs = CoordinatorObs;
    type Act = CoordinatorAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let simulator = S::build(&config.simulator, seed)?;
        let mro = MroPolicy::load(&config.mro_tables)?;
        let mlb = MlbPolicy::load(&config.mlb_tables)?;

        Ok(Self {
            simulator,
            mro,
            mlb,
            proposals: [HandoverParams::default(); N_CELLS],
            mro_actions: [0; N_CELLS],
            mlb_actions: [0; N_CELLS],
            mro_applied_actions: [0; N_CELLS],
            mlb_applied_actions: [0; N_CELLS],
            applied: [HandoverParams::default(); N_CELLS],
        })
    }

    /// Resets the simulator and computes the initial proposals, so the
    /// first step's arbitration has parameters to choose between.
    fn reset(&mut self) -> Result<Self::Obs> {
        let net = self.simulator.reset()?;
        let (proposals, mro_actions, mlb_actions) = self.propose(&net);

        let (cio_dir, hom_dir, ttt_dir) = directions(&proposals, &self.applied);
        self.proposals = proposals;
        self.mro_actions = mro_actions;
        self.mlb_actions = mlb_actions;

        Ok(CoordinatorObs::encode(&cio_dir, &hom_dir, &ttt_dir, &net))
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record) {
        let params = self.blend(act);

        let net = match self.simulator.step(&params) {
            Ok(Some(net)) => net,
            Ok(None) => return self.truncated_step(act),
            Err(e) => {
                warn!("Simulator failed mid-episode: {}", e);
                return self.truncated_step(act);
            }
        };

        self.latch_applied_actions(act);
        self.applied = params;

        let (proposals, mro_actions, mlb_actions) = self.propose(&net);
        let (cio_dir, hom_dir, ttt_dir) = directions(&proposals, &self.proposals);
        self.proposals = proposals;
        self.mro_actions = mro_actions;
        self.mlb_actions = mlb_actions;

        let obs = CoordinatorObs::encode(&cio_dir, &hom_dir, &ttt_dir, &net);
        let r = step_reward(&net);
        let record = Record::from_slice(&[
            ("reward", Scalar(r.reward)),
            ("load_std", Scalar(r.load_std)),
            ("rlf_rate", Scalar(r.rlf_rate)),
            ("pp_rate", Scalar(r.pp_rate)),
        ]);

        let step = Step::new(obs, act.clone(), vec![r.reward], vec![0], vec![0], ());
        (step, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_sign() {
        assert_eq!(direction(2.0, 1.0), 1.0);
        assert_eq!(direction(1.0, 1.0), 0.0);
        assert_eq!(direction(0.5, 1.0), -1.0);
    }

    #[test]
    fn test_directions_per_field() {
        let mut current = [HandoverParams::default(); N_CELLS];
        let previous = [HandoverParams::default(); N_CELLS];
        current[0] = HandoverParams {
            cio: 1.0,
            hom: -1.0,
            ttt: 0.0,
        };

        let (cio, hom, ttt) = directions(&current, &previous);
        assert_eq!(cio[0], 1.0);
        assert_eq!(hom[0], -1.0);
        assert_eq!(ttt[0], 0.0);
        assert_eq!(cio[1], 0.0);
    }
}
