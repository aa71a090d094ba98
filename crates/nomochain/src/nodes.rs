//! Node registry: the collaborator hook for peers holding chain copies.
//!
//! No discovery or gossip happens here. A peer is registered by address, and
//! any chain copy obtained from it can be warranted with the local
//! difficulty.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use nomochain_core::{ChainValidator, Difficulty, State, Warrant};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LedgerError, Result};

/// Opaque reference to a peer holding a copy (or candidate copy) of the chain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    address: String,
}

impl NodeRef {
    /// Create a reference from an address. Surrounding whitespace is dropped;
    /// an empty address is rejected.
    pub fn new(address: &str) -> Result<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(LedgerError::InvalidAddress(address.to_string()));
        }
        Ok(Self {
            address: address.to_string(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// The set of known peers.
pub struct NodeRegistry {
    nodes: RwLock<BTreeSet<NodeRef>>,
    validator: ChainValidator,
}

impl NodeRegistry {
    /// Create an empty registry warranting peer chains at `difficulty`.
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            nodes: RwLock::new(BTreeSet::new()),
            validator: ChainValidator::new(difficulty),
        }
    }

    /// Register a peer. Registering the same address twice is a no-op.
    pub fn register(&self, address: &str) -> Result<NodeRef> {
        let node = NodeRef::new(address)?;
        let inserted = self
            .nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node.clone());
        if inserted {
            info!(node = %node, "node registered");
        }
        Ok(node)
    }

    /// Check if a peer is registered.
    pub fn contains(&self, node: &NodeRef) -> bool {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(node)
    }

    /// All registered peers, ordered by address.
    pub fn nodes(&self) -> Vec<NodeRef> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Warrant a chain copy received from a registered peer.
    ///
    /// The copy is only read, never modified.
    pub fn warrant_peer_chain(&self, node: &NodeRef, states: &[State]) -> Result<Warrant> {
        if !self.contains(node) {
            return Err(LedgerError::UnknownNode(node.to_string()));
        }

        let warrant = self.validator.validate(states)?;
        match warrant.violation() {
            None => info!(node = %node, states = states.len(), "peer chain warranted"),
            Some(violation) => warn!(node = %node, %violation, "peer chain rejected"),
        }
        Ok(warrant)
    }
}
