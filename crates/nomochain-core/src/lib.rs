//! # Nomochain Core
//!
//! Pure primitives for Nomochain: a bitemporal hashchain ledger whose states
//! are linked by content hash and sealed with a proof token.
//!
//! This crate contains no I/O, no storage, no networking and no locking. It is
//! pure computation over hash-linked records.
//!
//! ## Key Types
//!
//! - [`State`] - One immutable, hash-linked record of the chain
//! - [`StateHash`] - Content digest of a state (Blake3)
//! - [`Transaction`] / [`TransactionBuffer`] - Staged transfers awaiting a state
//! - [`Chain`] - The append-only sequence of states
//! - [`ProofSearch`] - Negentropy search for a proof satisfying a [`Difficulty`]
//! - [`ChainValidator`] - Re-walks a chain and issues a [`Warrant`]
//!
//! ## Canonicalization
//!
//! States are hashed over deterministic CBOR. See the [`canonical`] module.

pub mod canonical;
pub mod chain;
pub mod error;
pub mod hasher;
pub mod proof;
pub mod state;
pub mod transaction;
pub mod types;
pub mod validation;

pub use canonical::{canonical_state_bytes, decode_state, encode_state};
pub use chain::{Chain, PreparedState, DEFAULT_GENESIS_PROOF};
pub use error::{CoreError, Result};
pub use hasher::{hash_bytes, hash_state, hash_value};
pub use proof::{warrant_proof, Difficulty, ProofContext, ProofSearch};
pub use state::{State, ValidTime};
pub use transaction::{Transaction, TransactionBuffer};
pub use types::StateHash;
pub use validation::{ChainValidator, Violation, Warrant};
