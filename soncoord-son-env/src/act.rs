//! Actions.
use crate::{N_CELLS, N_COORDINATOR_ACTIONS};
use candle_core::{Device, Tensor};
use soncoord_candle_agent::TensorBatch;
use soncoord_core::Act;

/// Per-cell arbitration decision between the two sub-policy proposals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arbitration {
    /// Apply both the MLB and the MRO proposal.
    ApplyBoth,

    /// Apply the MLB proposal, hold the previous MRO parameters.
    HoldMro,

    /// Apply the MRO proposal, hold the previous MLB parameter.
    HoldMlb,

    /// Hold all previous parameters.
    HoldBoth,
}

impl Arbitration {
    fn from_digit(d: i64) -> Self {
        match d {
            0 => Self::ApplyBoth,
            1 => Self::HoldMro,
            2 => Self::HoldMlb,
            3 => Self::HoldBoth,
            _ => unreachable!(),
        }
    }

    /// If the MRO proposal (HOM/TTT) is applied.
    pub fn applies_mro(&self) -> bool {
        matches!(self, Self::ApplyBoth | Self::HoldMlb)
    }

    /// If the MLB proposal (CIO) is applied.
    pub fn applies_mlb(&self) -> bool {
        matches!(self, Self::ApplyBoth | Self::HoldMro)
    }
}

/// The coordinator's joint action, an integer in `[0, 4^9)`.
///
/// Base-4 decoding yields one [`Arbitration`] per cell; the least
/// significant digit belongs to cell 0.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinatorAct {
    act: i64,
}

impl CoordinatorAct {
    /// Wraps a raw action index.
    ///
    /// # Panics
    ///
    /// Panics if the index is outside `[0, 4^9)`.
    pub fn new(act: i64) -> Self {
        assert!(
            (0..N_COORDINATOR_ACTIONS).contains(&act),
            "action index {} out of range",
            act
        );
        Self { act }
    }

    /// The raw action index.
    pub fn index(&self) -> i64 {
        self.act
    }

    /// Decodes the action into per-cell arbitration decisions.
    pub fn decisions(&self) -> [Arbitration; N_CELLS] {
        let mut decisions = [Arbitration::ApplyBoth; N_CELLS];
        let mut a = self.act;
        for d in decisions.iter_mut() {
            *d = Arbitration::from_digit(a % 4);
            a /= 4;
        }
        decisions
    }
}

impl Act for CoordinatorAct {
    fn len(&self) -> usize {
        1
    }
}

impl From<Tensor> for CoordinatorAct {
    fn from(t: Tensor) -> Self {
        let act: Vec<i64> = t.flatten_all().unwrap().to_vec1().unwrap();
        Self::new(act[0])
    }
}

impl From<CoordinatorAct> for Tensor {
    fn from(a: CoordinatorAct) -> Tensor {
        // Shape [1, 1]: a single action, gather-ready along the last dim.
        Tensor::from_vec(vec![a.act], (1, 1), &Device::Cpu).unwrap()
    }
}

impl From<CoordinatorAct> for TensorBatch {
    fn from(a: CoordinatorAct) -> Self {
        TensorBatch::from_tensor(a.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_zero_applies_everything() {
        let act = CoordinatorAct::new(0);
        assert_eq!(act.decisions(), [Arbitration::ApplyBoth; N_CELLS]);
    }

    #[test]
    fn test_decode_base4_digits() {
        // 1 + 2*4 + 3*16 = 57: cells 0..2 get decisions 1, 2, 3.
        let act = CoordinatorAct::new(57);
        let decisions = act.decisions();
        assert_eq!(decisions[0], Arbitration::HoldMro);
        assert_eq!(decisions[1], Arbitration::HoldMlb);
        assert_eq!(decisions[2], Arbitration::HoldBoth);
        assert_eq!(decisions[3], Arbitration::ApplyBoth);
    }

    #[test]
    fn test_decode_max_index() {
        let act = CoordinatorAct::new(N_COORDINATOR_ACTIONS - 1);
        assert_eq!(act.decisions(), [Arbitration::HoldBoth; N_CELLS]);
    }

    #[test]
    fn test_arbitration_application_matrix() {
        assert!(Arbitration::ApplyBoth.applies_mro());
        assert!(Arbitration::ApplyBoth.applies_mlb());
        assert!(!Arbitration::HoldMro.applies_mro());
        assert!(Arbitration::HoldMro.applies_mlb());
        assert!(Arbitration::HoldMlb.applies_mro());
        assert!(!Arbitration::HoldMlb.applies_mlb());
        assert!(!Arbitration::HoldBoth.applies_mro());
        assert!(!Arbitration::HoldBoth.applies_mlb());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_index_panics() {
        let _ = CoordinatorAct::new(N_COORDINATOR_ACTIONS);
    }

    #[test]
    fn test_tensor_roundtrip() {
        let act = CoordinatorAct::new(123);
        let t: Tensor = act.clone().into();
        assert_eq!(t.dims(), &[1, 1]);
        let act_: CoordinatorAct = t.into();
        assert_eq!(act, act_);
    }
}
