//! # Nomochain Testkit
//!
//! Testing utilities for Nomochain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Reproducible chains on a fixed clock and low difficulty
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use nomochain_testkit::generators::{chain_from_params, history};
//!
//! proptest! {
//!     #[test]
//!     fn built_chains_validate(params in history(5)) {
//!         let chain = chain_from_params(&params);
//!         prop_assert!(chain.warrant().unwrap().is_valid());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use nomochain_testkit::fixtures::ChainFixture;
//!
//! let mut fixture = ChainFixture::new();
//! fixture.submit("alice", "bob", 10);
//! let state = fixture.commit();
//! assert_eq!(state.index, 2);
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{failing_proof_from, ledger_config, open_ledger, ChainFixture, FIXED_NOW};
pub use generators::{chain_from_params, history, CommitParams};
