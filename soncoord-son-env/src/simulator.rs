//! Simulator boundary.
use crate::{obs::NetworkObs, N_CELLS};
use anyhow::Result;

/// Handover parameters applied to one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandoverParams {
    /// Cell individual offset in dB.
    pub cio: f32,

    /// Handover margin (hysteresis) in dB.
    pub hom: f32,

    /// Time-to-trigger in milliseconds.
    pub ttt: f32,
}

/// The network simulator, an opaque blocking boundary.
///
/// The environment only assumes `reset`/`step`; the real ns-3 protocol is
/// out of scope and stands behind this trait.
pub trait Simulator {
    /// Configuration from which the simulator is constructed.
    type Config: Clone;

    /// Builds a simulator with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns the initial network telemetry.
    fn reset(&mut self) -> Result<NetworkObs>;

    /// Applies per-cell handover parameters and advances the simulation.
    ///
    /// Returns `None` when the simulator has no further state; the episode
    /// then ends early. This is an expected outcome, not an error.
    fn step(&mut self, params: &[HandoverParams; N_CELLS]) -> Result<Option<NetworkObs>>;
}
