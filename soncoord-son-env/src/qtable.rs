//! CSV-loaded tabular sub-policies.
use crate::{simulator::HandoverParams, N_CELLS};
use anyhow::Result;
use log::info;
use soncoord_core::error::SoncoordError;
use std::path::Path;

/// Hysteresis values in dB, indexed by the MRO action quotient.
pub const HOM_VALUES: [f32; 7] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

/// Time-to-trigger values in milliseconds, indexed by the MRO action
/// remainder.
pub const TTT_VALUES: [f32; 7] = [100.0, 128.0, 256.0, 320.0, 480.0, 512.0, 640.0];

/// Cell individual offsets in dB, indexed by the MLB action.
pub const CIO_VALUES: [f32; 5] = [-2.0, -1.0, 0.0, 1.0, 2.0];

/// A read-only Q-table mapping a discrete state index to per-action values.
#[derive(Clone, Debug)]
pub struct QTable {
    values: Vec<Vec<f32>>,
}

impl QTable {
    /// Loads a table from a headerless delimited text file, one state per
    /// row.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path.as_ref())?;

        let mut values: Vec<Vec<f32>> = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|v| v.trim().parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    SoncoordError::LookupTableError(format!(
                        "{:?}: {}",
                        path.as_ref(),
                        e
                    ))
                })?;
            if let Some(first) = values.first() {
                if first.len() != row.len() {
                    return Err(SoncoordError::LookupTableError(format!(
                        "{:?}: ragged rows ({} vs {})",
                        path.as_ref(),
                        first.len(),
                        row.len()
                    ))
                    .into());
                }
            }
            values.push(row);
        }

        if values.is_empty() {
            return Err(
                SoncoordError::LookupTableError(format!("{:?}: empty table", path.as_ref()))
                    .into(),
            );
        }

        info!(
            "Loaded Q-table {:?} ({} states x {} actions)",
            path.as_ref(),
            values.len(),
            values[0].len()
        );
        Ok(Self { values })
    }

    /// Number of states (rows).
    pub fn n_states(&self) -> usize {
        self.values.len()
    }

    /// Number of actions (columns).
    pub fn n_actions(&self) -> usize {
        self.values[0].len()
    }

    /// The greedy action for the given state, ties broken to the left.
    ///
    /// # Panics
    ///
    /// Panics if the state index is out of range; a telemetry value outside
    /// the table is a contract violation of the simulator boundary.
    pub fn greedy(&self, state: usize) -> usize {
        assert!(
            state < self.values.len(),
            "state index {} out of range of a {}-state table",
            state,
            self.values.len()
        );

        let row = &self.values[state];
        let mut best = 0;
        for (a, v) in row.iter().enumerate() {
            if *v > row[best] {
                best = a;
            }
        }
        best
    }
}

/// Proposal of the MRO sub-policy for one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MroProposal {
    /// Raw table action in `[0, 49)`.
    pub action: usize,

    /// Proposed hysteresis in dB.
    pub hom: f32,

    /// Proposed time-to-trigger in milliseconds.
    pub ttt: f32,
}

/// Proposal of the MLB sub-policy for one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MlbProposal {
    /// Raw table action in `[0, 5)`.
    pub action: usize,

    /// Proposed cell individual offset in dB.
    pub cio: f32,
}

/// Pre-trained mobility-robustness policy, one Q-table per cell.
///
/// A table action `a` decodes by `divmod 7` into `HOM_VALUES[a / 7]` and
/// `TTT_VALUES[a % 7]`.
#[derive(Clone, Debug)]
pub struct MroPolicy {
    tables: Vec<QTable>,
}

impl MroPolicy {
    /// Loads one table per cell from the given paths.
    pub fn load(paths: &[String]) -> Result<Self> {
        if paths.len() != N_CELLS {
            return Err(SoncoordError::LookupTableError(format!(
                "expected {} MRO tables, got {}",
                N_CELLS,
                paths.len()
            ))
            .into());
        }
        let tables = paths.iter().map(QTable::load).collect::<Result<Vec<_>>>()?;
        Ok(Self { tables })
    }

    /// Greedy per-cell proposals for the given state indices.
    pub fn propose(&self, states: &[usize; N_CELLS]) -> [MroProposal; N_CELLS] {
        let mut proposals = [MroProposal::default(); N_CELLS];
        for (i, (table, &state)) in self.tables.iter().zip(states.iter()).enumerate() {
            let action = table.greedy(state);
            proposals[i] = MroProposal {
                action,
                hom: HOM_VALUES[action / TTT_VALUES.len()],
                ttt: TTT_VALUES[action % TTT_VALUES.len()],
            };
        }
        proposals
    }
}

/// Pre-trained load-balancing policy, one Q-table per cell.
#[derive(Clone, Debug)]
pub struct MlbPolicy {
    tables: Vec<QTable>,
}

impl MlbPolicy {
    /// Loads one table per cell from the given paths.
    pub fn load(paths: &[String]) -> Result<Self> {
        if paths.len() != N_CELLS {
            return Err(SoncoordError::LookupTableError(format!(
                "expected {} MLB tables, got {}",
                N_CELLS,
                paths.len()
            ))
            .into());
        }
        let tables = paths.iter().map(QTable::load).collect::<Result<Vec<_>>>()?;
        Ok(Self { tables })
    }

    /// Greedy per-cell proposals for the given state indices.
    pub fn propose(&self, states: &[usize; N_CELLS]) -> [MlbProposal; N_CELLS] {
        let mut proposals = [MlbProposal::default(); N_CELLS];
        for (i, (table, &state)) in self.tables.iter().zip(states.iter()).enumerate() {
            let action = table.greedy(state);
            proposals[i] = MlbProposal {
                action,
                cio: CIO_VALUES[action],
            };
        }
        proposals
    }
}

/// Joins MLB and MRO proposals into per-cell handover parameters.
pub(crate) fn join_proposals(
    mlb: &[MlbProposal; N_CELLS],
    mro: &[MroProposal; N_CELLS],
) -> [HandoverParams; N_CELLS] {
    let mut params = [HandoverParams::default(); N_CELLS];
    for i in 0..N_CELLS {
        params[i] = HandoverParams {
            cio: mlb[i].cio,
            hom: mro[i].hom,
            ttt: mro[i].ttt,
        };
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    fn write_table(dir: &TempDir, name: &str, rows: &[&[f32]]) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for row in rows {
            let line = row
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",");
            writeln!(file, "{}", line).unwrap();
        }
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_load_and_greedy() {
        let dir = TempDir::new("qtable").unwrap();
        let path = write_table(
            &dir,
            "q.csv",
            &[&[0.1, 0.9, 0.3], &[2.0, 1.0, 2.0], &[0.0, 0.0, 0.0]],
        );

        let table = QTable::load(&path).unwrap();
        assert_eq!(table.n_states(), 3);
        assert_eq!(table.n_actions(), 3);
        assert_eq!(table.greedy(0), 1);
        // Ties go to the left.
        assert_eq!(table.greedy(1), 0);
        assert_eq!(table.greedy(2), 0);
    }

    #[test]
    fn test_load_rejects_ragged_rows() {
        let dir = TempDir::new("qtable").unwrap();
        let path = write_table(&dir, "ragged.csv", &[&[0.1, 0.9], &[1.0]]);
        assert!(QTable::load(&path).is_err());
    }

    #[test]
    #[should_panic]
    fn test_greedy_out_of_range_panics() {
        let dir = TempDir::new("qtable").unwrap();
        let path = write_table(&dir, "q.csv", &[&[0.0, 1.0]]);
        let table = QTable::load(&path).unwrap();
        let _ = table.greedy(1);
    }

    #[test]
    fn test_mro_action_decoding() {
        // One 49-action table per cell; row 0 peaks at action 10, which
        // decodes by divmod 7 into HOM index 1 and TTT index 3.
        let dir = TempDir::new("qtable").unwrap();
        let mut row = vec![0.0f32; 49];
        row[10] = 1.0;
        let paths: Vec<String> = (0..N_CELLS)
            .map(|i| write_table(&dir, &format!("mro{}.csv", i), &[&row]))
            .collect();

        let policy = MroPolicy::load(&paths).unwrap();
        let proposals = policy.propose(&[0; N_CELLS]);
        for p in proposals.iter() {
            assert_eq!(p.action, 10);
            assert_eq!(p.hom, 1.0);
            assert_eq!(p.ttt, 320.0);
        }
    }

    #[test]
    fn test_mlb_action_decoding() {
        let dir = TempDir::new("qtable").unwrap();
        let paths: Vec<String> = (0..N_CELLS)
            .map(|i| {
                write_table(
                    &dir,
                    &format!("mlb{}.csv", i),
                    &[&[0.0, 0.0, 0.0, 0.0, 1.0], &[1.0, 0.0, 0.0, 0.0, 0.0]],
                )
            })
            .collect();

        let policy = MlbPolicy::load(&paths).unwrap();
        let proposals = policy.propose(&[0, 1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(proposals[0].cio, 2.0);
        assert_eq!(proposals[1].cio, -2.0);
    }

    #[test]
    fn test_load_requires_nine_tables() {
        assert!(MroPolicy::load(&["a.csv".to_string()]).is_err());
    }
}
