//! Chain warrants: re-walking a chain to certify hash linkage and proofs.
//!
//! Validation is a query, not an assumed-succeed operation. A broken chain is
//! reported as [`Warrant::Invalid`] with the offending position; only hashing
//! failures surface as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::hasher::hash_state;
use crate::proof::{warrant_proof, Difficulty, ProofContext};
use crate::state::State;

/// Why a chain failed validation.
///
/// Positions are 0-based offsets into the validated slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Violation {
    /// `index` does not follow the previous state's index.
    IndexDiscontinuity(usize),
    /// `prev_hash` is not the digest of the previous state.
    HashLinkBroken(usize),
    /// `proof` does not satisfy the difficulty predicate.
    ProofInvalid(usize),
    /// The stored `digest` does not match the state's content.
    DigestMismatch(usize),
}

impl Violation {
    /// The position of the offending state.
    pub fn position(&self) -> usize {
        match self {
            Violation::IndexDiscontinuity(i)
            | Violation::HashLinkBroken(i)
            | Violation::ProofInvalid(i)
            | Violation::DigestMismatch(i) => *i,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::IndexDiscontinuity(i) => write!(f, "index discontinuity at position {}", i),
            Violation::HashLinkBroken(i) => write!(f, "hash link broken at position {}", i),
            Violation::ProofInvalid(i) => write!(f, "invalid proof at position {}", i),
            Violation::DigestMismatch(i) => write!(f, "digest mismatch at position {}", i),
        }
    }
}

/// The verdict of a chain validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Warrant {
    Valid,
    Invalid(Violation),
}

impl Warrant {
    pub fn is_valid(&self) -> bool {
        matches!(self, Warrant::Valid)
    }

    /// The violation, if any.
    pub fn violation(&self) -> Option<Violation> {
        match self {
            Warrant::Valid => None,
            Warrant::Invalid(v) => Some(*v),
        }
    }
}

/// Read-only validator for full or partial chain copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainValidator {
    difficulty: Difficulty,
}

impl ChainValidator {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    /// Validate a chain or a contiguous slice of one.
    ///
    /// The first state is trusted. For every later position, checks in order:
    /// index continuity, hash link, proof, then the stored digest. The scan
    /// stops at the first violation.
    pub fn validate(&self, states: &[State]) -> Result<Warrant> {
        let Some(first) = states.first() else {
            return Ok(Warrant::Valid);
        };

        let mut prev = first;
        let mut prev_hash = hash_state(prev)?;

        for (position, curr) in states.iter().enumerate().skip(1) {
            if Some(curr.index) != prev.index.checked_add(1) {
                return Ok(Warrant::Invalid(Violation::IndexDiscontinuity(position)));
            }

            if curr.prev_hash != prev_hash {
                return Ok(Warrant::Invalid(Violation::HashLinkBroken(position)));
            }

            let context = ProofContext {
                index: prev.index,
                state_hash: prev_hash,
            };
            if !warrant_proof(&context, prev.proof, curr.proof, self.difficulty)? {
                return Ok(Warrant::Invalid(Violation::ProofInvalid(position)));
            }

            let curr_hash = hash_state(curr)?;
            if curr.digest != curr_hash {
                return Ok(Warrant::Invalid(Violation::DigestMismatch(position)));
            }

            prev = curr;
            prev_hash = curr_hash;
        }

        Ok(Warrant::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use crate::proof::ProofSearch;
    use crate::types::StateHash;

    const NOW: i64 = 1_736_870_400_000;

    fn difficulty() -> Difficulty {
        Difficulty::new(6).unwrap()
    }

    fn build_chain(commits: usize) -> Vec<State> {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        let search = ProofSearch::new(difficulty());
        for i in 0..commits {
            chain.submit_transaction("alice", "bob", i as i64 + 1);
            chain.submit_transaction("bob", "carol", 1);
            let proof = search.search_after(chain.last_state().unwrap()).unwrap();
            chain.commit_state(proof, None, NOW + i as i64).unwrap();
        }
        chain.into_states()
    }

    fn validate(states: &[State]) -> Warrant {
        ChainValidator::new(difficulty()).validate(states).unwrap()
    }

    #[test]
    fn test_valid_chain() {
        let states = build_chain(4);
        assert_eq!(validate(&states), Warrant::Valid);
    }

    #[test]
    fn test_empty_and_genesis_only() {
        assert_eq!(validate(&[]), Warrant::Valid);
        assert_eq!(validate(&build_chain(0)), Warrant::Valid);
    }

    #[test]
    fn test_idempotent() {
        let states = build_chain(3);
        assert_eq!(validate(&states), validate(&states));
    }

    #[test]
    fn test_partial_copy() {
        let states = build_chain(4);
        assert_eq!(validate(&states[2..]), Warrant::Valid);
    }

    #[test]
    fn test_tampered_amount_in_head() {
        let mut states = build_chain(3);
        states[3].transactions[0].amount += 1;
        assert_eq!(
            validate(&states),
            Warrant::Invalid(Violation::DigestMismatch(3))
        );
    }

    #[test]
    fn test_tampered_amount_mid_chain() {
        let mut states = build_chain(3);
        states[2].transactions[1].amount = -1;
        assert_eq!(
            validate(&states),
            Warrant::Invalid(Violation::DigestMismatch(2))
        );
    }

    #[test]
    fn test_rehashed_tamper_breaks_next_link() {
        let mut states = build_chain(3);
        states[1].transactions[0].recipient = "mallory".into();
        states[1].digest = states[1].compute_digest().unwrap();
        assert_eq!(
            validate(&states),
            Warrant::Invalid(Violation::HashLinkBroken(2))
        );
    }

    #[test]
    fn test_broken_link() {
        let mut states = build_chain(2);
        states[2].prev_hash = StateHash::from_bytes([0xee; 32]);
        assert_eq!(
            validate(&states),
            Warrant::Invalid(Violation::HashLinkBroken(2))
        );
    }

    #[test]
    fn test_index_discontinuity() {
        let mut states = build_chain(2);
        states[2].index = 7;
        assert_eq!(
            validate(&states),
            Warrant::Invalid(Violation::IndexDiscontinuity(2))
        );
    }

    #[test]
    fn test_tampered_timestamp() {
        let mut states = build_chain(2);
        states[1].time_ru += 1;
        assert_eq!(
            validate(&states),
            Warrant::Invalid(Violation::DigestMismatch(1))
        );
    }

    #[test]
    fn test_removed_state() {
        let mut states = build_chain(3);
        states.remove(2);
        assert_eq!(
            validate(&states),
            Warrant::Invalid(Violation::IndexDiscontinuity(2))
        );
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let states = build_chain(2);
        let copy = states.clone();
        validate(&states);
        assert_eq!(states, copy);
    }

    #[test]
    fn test_violation_position_and_display() {
        let violation = Violation::ProofInvalid(4);
        assert_eq!(violation.position(), 4);
        assert_eq!(violation.to_string(), "invalid proof at position 4");
        assert_eq!(Warrant::Invalid(violation).violation(), Some(violation));
        assert!(Warrant::Valid.is_valid());
    }
}
