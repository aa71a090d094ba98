//! # Nomochain
//!
//! The unified API for Nomochain - a bitemporal hashchain ledger.
//!
//! ## Overview
//!
//! Nomochain keeps a write-once audit log as a chain of states:
//!
//! - **States**: Immutable records bundling transactions, a proof and five timestamps
//! - **Hash links**: Every state carries the digest of its predecessor
//! - **Proofs**: Each state is sealed with a proof found by negentropy search
//! - **Warrants**: Any node can re-walk a chain copy and localize tampering
//!
//! ## Key Concepts
//!
//! - **State**: Immutable. Never edited. Corrections are new states.
//! - **Bitemporal**: Valid time (when facts hold) is tracked apart from record
//!   time (when they were written).
//! - **Warrant**: The validator's verdict, naming the offending position on failure.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nomochain::{Ledger, LedgerConfig};
//! use nomochain::store::MemoryStore;
//!
//! async fn example() {
//!     let ledger = Ledger::open(MemoryStore::new(), LedgerConfig::default())
//!         .await
//!         .unwrap();
//!
//!     // Stage a transfer
//!     ledger.submit_transaction("alice", "bob", 10).await;
//!
//!     // Search a proof and seal the next state
//!     let state = ledger.baptize(None).await.unwrap();
//!     assert_eq!(state.index, 2);
//!
//!     // Certify the whole chain
//!     assert!(ledger.warrant().await.unwrap().is_valid());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `nomochain::core` - Core primitives (State, Chain, ProofSearch, ...)
//! - `nomochain::store` - Storage abstraction and in-memory store

pub mod config;
pub mod error;
pub mod ledger;
pub mod nodes;

// Re-export component crates
pub use nomochain_core as core;
pub use nomochain_store as store;

// Re-export main types for convenience
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use nodes::{NodeRef, NodeRegistry};

// Re-export commonly used core types
pub use nomochain_core::{
    ChainValidator, Difficulty, ProofContext, ProofSearch, State, StateHash, Transaction,
    ValidTime, Violation, Warrant,
};
