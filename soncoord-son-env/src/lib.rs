//! SON (self-organizing network) boundary of the handover coordination task.
//!
//! Nine cells of a simulated cellular network are controlled by two
//! pre-trained tabular policies: MRO (mobility robustness optimization)
//! proposes hysteresis and time-to-trigger values, MLB (mobility load
//! balancing) proposes cell individual offsets. A learned coordinator
//! arbitrates per cell which proposals are applied and which are held at
//! their previously applied values; [`SonEnv`] wraps the simulator, the
//! tabular policies, action decoding and reward shaping behind the
//! [`Env`](soncoord_core::Env) trait.
mod act;
mod base;
mod config;
mod obs;
mod qtable;
mod reward;
mod simulator;

pub use act::{Arbitration, CoordinatorAct};
pub use base::SonEnv;
pub use config::SonEnvConfig;
pub use obs::{CoordinatorObs, NetworkObs};
pub use qtable::{
    MlbPolicy, MlbProposal, MroPolicy, MroProposal, QTable, CIO_VALUES, HOM_VALUES, TTT_VALUES,
};
pub use reward::{step_reward, StepReward};
pub use simulator::{HandoverParams, Simulator};

/// Number of cells in the deployment.
pub const N_CELLS: usize = 9;

/// Dimension of the coordinator state vector.
pub const STATE_DIM: usize = 6 * N_CELLS;

/// Size of the coordinator action space, `4^N_CELLS`.
pub const N_COORDINATOR_ACTIONS: i64 = 262_144;
