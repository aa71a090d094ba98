//! Error types for Nomochain Core.

use thiserror::Error;

/// Core errors that can occur while building, hashing or extending a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Content has no canonical encoding (floats, tags, ...).
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The chain holds no states, not even genesis.
    #[error("chain is empty")]
    EmptyChain,

    /// Proof search gave up after the configured number of candidates.
    #[error("proof search exhausted after {attempts} attempts")]
    ProofSearchExhausted { attempts: u64 },

    /// The supplied proof does not satisfy the difficulty predicate against
    /// the current head.
    #[error("proof {proof} rejected for state {index}")]
    ProofRejected { index: u64, proof: u64 },

    /// A prepared state no longer extends the chain head.
    #[error("stale state: expected index {expected}, got {got}")]
    StaleState { expected: u64, got: u64 },

    #[error("invalid valid-time interval: from {from} is after until {until}")]
    InvalidValidTime { from: i64, until: i64 },

    #[error("invalid difficulty: {0} leading zero bits (max 256)")]
    InvalidDifficulty(u32),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
