//! Transactions and the staging buffer they wait in until a state is baptized.

use serde::{Deserialize, Serialize};

/// A transfer from `agent` to `recipient`.
///
/// Only structural presence is checked here. Sign and identity checks on the
/// fields belong to whoever submits the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub agent: String,
    pub recipient: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(agent: impl Into<String>, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            agent: agent.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

/// Staging area for transactions not yet committed to a state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionBuffer {
    pending: Vec<Transaction>,
}

impl TransactionBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a transaction.
    ///
    /// Returns the 1-based position the transaction will occupy in the next
    /// state.
    pub fn stage(&mut self, transaction: Transaction) -> u64 {
        self.pending.push(transaction);
        self.pending.len() as u64
    }

    /// Take every pending transaction, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    /// Take the first `count` pending transactions, keeping anything staged
    /// after them.
    pub fn drain_prefix(&mut self, count: usize) -> Vec<Transaction> {
        let count = count.min(self.pending.len());
        self.pending.drain(..count).collect()
    }

    /// Transactions staged so far, in submission order.
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
