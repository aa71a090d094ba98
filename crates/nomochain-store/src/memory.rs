//! In-memory implementation of the StateStore trait.
//!
//! This is primarily for testing. It has the write-once semantics a durable
//! backend must have but keeps everything in memory with no persistence.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;

use nomochain_core::{decode_state, encode_state, State, StateHash};

use crate::error::{Result, StoreError};
use crate::traits::{AppendResult, StateStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Records in index order; `records[i]` holds index `i + 1`.
    records: Vec<StoredState>,
}

struct StoredState {
    digest: StateHash,
    encoded: Bytes,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                records: Vec::new(),
            }),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite a stored record in place, bypassing write-once checks.
    ///
    /// Exists only so tests can simulate corruption of durable media.
    #[doc(hidden)]
    pub fn corrupt_record(&self, index: u64, encoded: Vec<u8>) {
        let mut inner = self.write();
        if let Some(record) = position(index).and_then(|pos| inner.records.get_mut(pos)) {
            record.encoded = Bytes::from(encoded);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a 1-based index to a vector position.
fn position(index: u64) -> Option<usize> {
    index.checked_sub(1).and_then(|p| usize::try_from(p).ok())
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn append_state(&self, state: &State, encoded: &[u8]) -> Result<AppendResult> {
        if encode_state(state)? != encoded {
            return Err(StoreError::InvalidData(format!(
                "record for state {} does not match its encoding",
                state.index
            )));
        }

        let mut inner = self.write();
        let expected = inner.records.len() as u64 + 1;

        if state.index > expected || state.index == 0 {
            return Ok(AppendResult::OutOfOrder {
                expected,
                got: state.index,
            });
        }

        if state.index < expected {
            let existing = position(state.index)
                .and_then(|pos| inner.records.get(pos))
                .ok_or_else(|| StoreError::InvalidData("record index overflow".into()))?;

            if existing.encoded.as_ref() == encoded {
                return Ok(AppendResult::AlreadyExists);
            }

            tracing::debug!(index = state.index, "refusing to overwrite stored state");
            return Ok(AppendResult::Conflict {
                index: state.index,
                existing: existing.digest,
            });
        }

        inner.records.push(StoredState {
            digest: state.digest,
            encoded: Bytes::copy_from_slice(encoded),
        });

        Ok(AppendResult::Appended)
    }

    async fn get_state(&self, index: u64) -> Result<Option<State>> {
        let encoded = self.get_encoded(index).await?;
        encoded.map(|bytes| decode_state(&bytes).map_err(StoreError::from)).transpose()
    }

    async fn get_states_range(&self, start: u64, end: u64) -> Result<Vec<State>> {
        let inner = self.read();

        let first = position(start.max(1)).unwrap_or(0);
        let last = position(end).map_or(0, |p| p + 1).min(inner.records.len());
        if first >= last {
            return Ok(Vec::new());
        }

        inner.records[first..last]
            .iter()
            .map(|record| decode_state(&record.encoded).map_err(StoreError::from))
            .collect()
    }

    async fn get_encoded(&self, index: u64) -> Result<Option<Vec<u8>>> {
        let inner = self.read();
        Ok(position(index)
            .and_then(|pos| inner.records.get(pos))
            .map(|record| record.encoded.to_vec()))
    }

    async fn head_index(&self) -> Result<u64> {
        Ok(self.read().records.len() as u64)
    }
}
