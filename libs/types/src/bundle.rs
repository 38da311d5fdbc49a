//! Submission-ready bundles (C6/C7).

use ethers::types::{Bytes, H256, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub raw_tx: Bytes,
    /// Set only on the entry that races a specific unmined victim transaction.
    pub victim_hash: Option<H256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub entries: Vec<BundleEntry>,
    pub target_block: u64,
    pub tip_per_gas: U256,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BundleShapeError {
    #[error("bundle references {0} victims, at most one is allowed")]
    MultipleVictimReferences(usize),
    #[error("victim reference at entry 0 has no preceding front-run entry")]
    VictimWithoutFront,
    #[error("bundle has no entries")]
    Empty,
}

impl Bundle {
    /// Validates the "at most one victim reference, sitting between a front and an
    /// optional back" invariant spec.md requires of every bundle shape.
    pub fn validate_shape(&self) -> Result<(), BundleShapeError> {
        if self.entries.is_empty() {
            return Err(BundleShapeError::Empty);
        }
        let victim_positions: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.victim_hash.map(|_| i))
            .collect();

        if victim_positions.len() > 1 {
            return Err(BundleShapeError::MultipleVictimReferences(victim_positions.len()));
        }
        if let Some(&pos) = victim_positions.first() {
            if pos == 0 {
                return Err(BundleShapeError::VictimWithoutFront);
            }
        }
        Ok(())
    }
}
