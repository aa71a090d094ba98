//! Negentropy search: finding a proof that satisfies the difficulty predicate.
//!
//! A proof for the state after `prev` is an integer `p` such that
//! `Blake3(PROOF_DOMAIN || canonical{prev.index, hash(prev), prev.proof, p})`
//! starts with at least `difficulty` zero bits.

use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use crate::canonical::entry;
use crate::error::{CoreError, Result};
use crate::hasher::{hash_state, hash_value, PROOF_DOMAIN};
use crate::state::State;
use crate::types::StateHash;

/// Required number of leading zero bits in a proof candidate digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Difficulty(u32);

impl Difficulty {
    /// Four leading zero hex digits.
    pub const DEFAULT: Self = Self(16);

    /// Accepts every candidate.
    pub const TRIVIAL: Self = Self(0);

    pub fn new(bits: u32) -> Result<Self> {
        if bits > 256 {
            return Err(CoreError::InvalidDifficulty(bits));
        }
        Ok(Self(bits))
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether a digest meets this difficulty.
    pub fn is_met_by(&self, digest: &StateHash) -> bool {
        digest.leading_zero_bits() >= self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The semantic identifiers of the state a proof builds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofContext {
    pub index: u64,
    pub state_hash: StateHash,
}

impl ProofContext {
    /// Context of a state. The hash is recomputed from content, so a
    /// tampered `digest` field cannot vouch for a proof.
    pub fn of(state: &State) -> Result<Self> {
        Ok(Self {
            index: state.index,
            state_hash: hash_state(state)?,
        })
    }

    /// Digest of a proof candidate in this context.
    pub fn candidate_digest(&self, last_proof: u64, proof: u64) -> Result<StateHash> {
        let value = Value::Map(vec![
            entry(0, Value::Integer(self.index.into())),
            entry(1, Value::Bytes(self.state_hash.0.to_vec())),
            entry(2, Value::Integer(last_proof.into())),
            entry(3, Value::Integer(proof.into())),
        ]);
        hash_value(PROOF_DOMAIN, &value)
    }
}

/// The difficulty predicate. Pure in all of its inputs.
pub fn warrant_proof(
    context: &ProofContext,
    last_proof: u64,
    proof: u64,
    difficulty: Difficulty,
) -> Result<bool> {
    let digest = context.candidate_digest(last_proof, proof)?;
    Ok(difficulty.is_met_by(&digest))
}

/// Linear proof search with an optional attempt bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofSearch {
    pub difficulty: Difficulty,
    /// `None` searches until a proof is found.
    pub max_attempts: Option<u64>,
}

impl ProofSearch {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            max_attempts: None,
        }
    }

    /// Bound the number of candidates tried before giving up.
    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Find the smallest proof, counting up from zero, that satisfies the
    /// predicate for `context` and `last_proof`.
    pub fn search(&self, context: &ProofContext, last_proof: u64) -> Result<u64> {
        let mut candidate = 0u64;
        loop {
            if self.max_attempts.is_some_and(|max| candidate >= max) {
                return Err(CoreError::ProofSearchExhausted {
                    attempts: candidate,
                });
            }
            if warrant_proof(context, last_proof, candidate, self.difficulty)? {
                return Ok(candidate);
            }
            candidate = candidate.checked_add(1).ok_or(CoreError::ProofSearchExhausted {
                attempts: u64::MAX,
            })?;
        }
    }

    /// Find a proof for the state that will follow `prev`.
    pub fn search_after(&self, prev: &State) -> Result<u64> {
        self.search(&ProofContext::of(prev)?, prev.proof)
    }
}
