//! State: one immutable, hash-linked record of the chain.
//!
//! A state is never edited once baptized. Corrections are new states.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::hasher::hash_state;
use crate::transaction::Transaction;
use crate::types::StateHash;

/// A valid-time interval: when the recorded facts hold in the world.
///
/// Supplied by the caller to back-date or forward-date a state. Times are
/// Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidTime {
    pub from: i64,
    pub until: i64,
}

impl ValidTime {
    /// Create an interval, rejecting `from > until`.
    pub fn new(from: i64, until: i64) -> Result<Self> {
        if from > until {
            return Err(CoreError::InvalidValidTime { from, until });
        }
        Ok(Self { from, until })
    }

    /// The degenerate interval holding only `at`.
    pub const fn instant(at: i64) -> Self {
        Self { from: at, until: at }
    }

    /// Check whether `at` falls inside the interval (inclusive).
    pub fn contains(&self, at: i64) -> bool {
        self.from <= at && at <= self.until
    }
}

/// One record of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Position in the chain (1-indexed).
    pub index: u64,

    /// Wall clock at creation (Unix milliseconds).
    pub timestamp: i64,

    /// Valid time: definite-from.
    pub time_df: i64,

    /// Valid time: definite-until.
    pub time_du: i64,

    /// Record time: recorded-from.
    pub time_rf: i64,

    /// Record time: recorded-until.
    pub time_ru: i64,

    /// Transactions drained from the buffer when this state was created.
    pub transactions: Vec<Transaction>,

    /// Proof token found by negentropy search (or given for genesis).
    pub proof: u64,

    /// Digest of the previous state, [`StateHash::GENESIS`] for genesis.
    pub prev_hash: StateHash,

    /// Digest of this state's own content. Not part of the hashed content.
    pub digest: StateHash,
}

impl State {
    /// Build a state and seal it with its own digest.
    pub(crate) fn sealed(
        index: u64,
        now: i64,
        valid_time: ValidTime,
        transactions: Vec<Transaction>,
        proof: u64,
        prev_hash: StateHash,
    ) -> Result<Self> {
        let mut state = Self {
            index,
            timestamp: now,
            time_df: valid_time.from,
            time_du: valid_time.until,
            time_rf: now,
            time_ru: now,
            transactions,
            proof,
            prev_hash,
            digest: StateHash::GENESIS,
        };
        state.digest = hash_state(&state)?;
        Ok(state)
    }

    /// Recompute the digest from content, ignoring the stored `digest`.
    pub fn compute_digest(&self) -> Result<StateHash> {
        hash_state(self)
    }

    /// Check whether this is a genesis state (first index, no predecessor).
    pub fn is_genesis(&self) -> bool {
        self.index == 1 && self.prev_hash == StateHash::GENESIS
    }

    /// The valid-time interval of this state.
    pub fn valid_time(&self) -> ValidTime {
        ValidTime {
            from: self.time_df,
            until: self.time_du,
        }
    }

    /// The record-time interval of this state as `(from, until)`.
    pub fn record_time(&self) -> (i64, i64) {
        (self.time_rf, self.time_ru)
    }
}
