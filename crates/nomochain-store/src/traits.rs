//! StateStore trait: the abstract interface for state persistence.
//!
//! This trait keeps the ledger storage-agnostic. The in-memory store is the
//! reference implementation; durable backends live with the collaborator
//! that owns them.

use std::sync::Arc;

use async_trait::async_trait;
use nomochain_core::{State, StateHash};

use crate::error::Result;

/// Result of appending a state record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendResult {
    /// The record was appended.
    Appended,
    /// The exact same record is already stored (idempotent - not an error).
    AlreadyExists,
    /// A different record already occupies this index.
    Conflict {
        index: u64,
        /// Digest of the stored record.
        existing: StateHash,
    },
    /// The record does not extend the stored head.
    OutOfOrder { expected: u64, got: u64 },
}

impl AppendResult {
    /// Check whether the store now holds the record.
    pub fn is_stored(&self) -> bool {
        matches!(self, AppendResult::Appended | AppendResult::AlreadyExists)
    }
}

/// The StateStore trait: async interface for state persistence.
///
/// Indices are the states' own 1-based indices.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Append a state record.
    ///
    /// # Arguments
    /// - `state`: The state being recorded.
    /// - `encoded`: Its persistence record, as produced by `encode_state`.
    async fn append_state(&self, state: &State, encoded: &[u8]) -> Result<AppendResult>;

    /// Get a state by index.
    async fn get_state(&self, index: u64) -> Result<Option<State>>;

    /// Get states with `start <= index <= end`, ordered by index.
    async fn get_states_range(&self, start: u64, end: u64) -> Result<Vec<State>>;

    /// Get the raw persistence record at an index.
    async fn get_encoded(&self, index: u64) -> Result<Option<Vec<u8>>>;

    /// Index of the last stored state, 0 if the store is empty.
    async fn head_index(&self) -> Result<u64>;

    /// Load every stored state in order.
    async fn load_all(&self) -> Result<Vec<State>> {
        let head = self.head_index().await?;
        if head == 0 {
            return Ok(Vec::new());
        }
        self.get_states_range(1, head).await
    }
}

/// A shared store, so several ledgers (or a ledger and its tests) can use one
/// backend in turn.
#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn append_state(&self, state: &State, encoded: &[u8]) -> Result<AppendResult> {
        (**self).append_state(state, encoded).await
    }

    async fn get_state(&self, index: u64) -> Result<Option<State>> {
        (**self).get_state(index).await
    }

    async fn get_states_range(&self, start: u64, end: u64) -> Result<Vec<State>> {
        (**self).get_states_range(start, end).await
    }

    async fn get_encoded(&self, index: u64) -> Result<Option<Vec<u8>>> {
        (**self).get_encoded(index).await
    }

    async fn head_index(&self) -> Result<u64> {
        (**self).head_index().await
    }
}
