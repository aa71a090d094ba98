//! Ledger configuration.

use nomochain_core::{Difficulty, ProofSearch, DEFAULT_GENESIS_PROOF};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Configuration for the Ledger.
///
/// Unset fields fall back to their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero bits a proof candidate digest must have.
    pub difficulty: u32,
    /// Proof embedded in a freshly created genesis state.
    pub genesis_proof: u64,
    /// Upper bound on proof candidates per search. `None` is unbounded.
    pub max_proof_attempts: Option<u64>,
    /// Whether to warrant recovered states before accepting them.
    pub validate_on_open: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::DEFAULT.bits(),
            genesis_proof: DEFAULT_GENESIS_PROOF,
            max_proof_attempts: Some(1 << 24),
            validate_on_open: true,
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))
    }

    pub fn difficulty(&self) -> Result<Difficulty> {
        Ok(Difficulty::new(self.difficulty)?)
    }

    /// The proof search this configuration describes.
    pub fn proof_search(&self) -> Result<ProofSearch> {
        let search = ProofSearch::new(self.difficulty()?);
        Ok(match self.max_proof_attempts {
            Some(max) => search.with_max_attempts(max),
            None => search,
        })
    }
}
