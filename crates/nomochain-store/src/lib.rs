//! # Nomochain Store
//!
//! Persistence interface for Nomochain. States are handed to the store as
//! opaque, write-once records: a record at an index is never replaced.
//!
//! ## Key Types
//!
//! - [`StateStore`] - The async trait every persistence backend implements
//! - [`MemoryStore`] - In-memory reference implementation for tests
//! - [`AppendResult`] - Outcome of appending a record
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nomochain_core::{encode_state, Chain, Difficulty};
//! use nomochain_store::{MemoryStore, StateStore};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     let chain = Chain::create(100, Difficulty::DEFAULT, 0).unwrap();
//!     let genesis = chain.last_state().unwrap();
//!
//!     let encoded = encode_state(genesis).unwrap();
//!     store.append_state(genesis, &encoded).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Write-once**: Re-appending an identical record returns `AlreadyExists`
//! - **Non-erasable**: A different record at an existing index returns `Conflict`
//! - **Contiguous**: Records must arrive in index order, starting at 1
//! - **Round-trip**: Reads decode the stored bytes, so the digest recomputed
//!   from a read state equals the one that was written

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{AppendResult, StateStore};
