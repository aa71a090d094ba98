//! Error types for the Ledger.

use nomochain_core::{CoreError, StateHash, Violation};
use nomochain_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Hashing, proof or chain construction error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Recovered states failed validation.
    #[error("corrupt chain: {0}")]
    CorruptChain(Violation),

    /// The store already holds a different state at this index.
    #[error("conflict at index {index}: stored state {existing}")]
    Conflict { index: u64, existing: StateHash },

    /// The store's head does not match the in-memory chain.
    #[error("store out of sync: expected index {expected}, got {got}")]
    OutOfSync { expected: u64, got: u64 },

    #[error("invalid node address: {0:?}")]
    InvalidAddress(String),

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The blocking proof search task panicked or was cancelled.
    #[error("proof worker failed: {0}")]
    ProofWorker(String),
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
