//! The Ledger: a shared, persistent chain with a single writer at a time.
//!
//! The Ledger wraps a [`Chain`] behind an async mutex and mirrors every state
//! into a [`StateStore`]. Proof search runs on the blocking pool so the lock
//! is only held for the prepare/persist/append sequence.

use nomochain_core::{
    encode_state, Chain, ChainValidator, CoreError, ProofSearch, State, Transaction, ValidTime,
    Violation, Warrant,
};
use nomochain_store::{AppendResult, StateStore};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Staging transactions
/// - Committing states with a given proof, or baptizing them with a searched one
/// - Taking snapshots and warranting the chain
/// - Recovering the chain from its store
pub struct Ledger<S: StateStore> {
    /// The chain and its pending transactions. Holding the lock makes the
    /// holder the single writer.
    chain: Mutex<Chain>,
    /// The storage backend.
    store: S,
    /// Configuration.
    config: LedgerConfig,
    proof_search: ProofSearch,
}

impl<S: StateStore> Ledger<S> {
    /// Open a ledger on a store.
    ///
    /// An empty store gets a fresh genesis state. Otherwise the stored states
    /// are loaded and, if configured, warranted before use.
    pub async fn open(store: S, config: LedgerConfig) -> Result<Self> {
        let difficulty = config.difficulty()?;
        let proof_search = config.proof_search()?;
        let stored = store.load_all().await?;

        let chain = if stored.is_empty() {
            let chain = Chain::create(config.genesis_proof, difficulty, now_millis())?;
            let genesis = chain.last_state()?;
            persist(&store, genesis).await?;
            info!(digest = %genesis.digest, proof = genesis.proof, "genesis state created");
            chain
        } else {
            let chain = Chain::from_states(stored, difficulty)?;
            if config.validate_on_open {
                if let Some(violation) = warrant_recovered(&chain)?.violation() {
                    warn!(%violation, "recovered chain failed validation");
                    return Err(LedgerError::CorruptChain(violation));
                }
            }
            info!(states = chain.len(), "ledger recovered from store");
            chain
        };

        Ok(Self {
            chain: Mutex::new(chain),
            store,
            config,
            proof_search,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Stage a transaction for the next state.
    ///
    /// Returns the position it will occupy among that state's transactions.
    pub async fn submit_transaction(
        &self,
        agent: impl Into<String>,
        recipient: impl Into<String>,
        amount: i64,
    ) -> u64 {
        let mut chain = self.chain.lock().await;
        let position = chain.submit_transaction(agent, recipient, amount);
        debug!(position, "transaction staged");
        position
    }

    /// Commit pending transactions into a new state sealed with `proof`.
    pub async fn commit_state(&self, proof: u64) -> Result<State> {
        self.commit(proof, None).await
    }

    /// Commit with an explicit valid-time interval (back- or forward-dated).
    pub async fn commit_state_with(&self, proof: u64, valid_time: ValidTime) -> Result<State> {
        self.commit(proof, Some(valid_time)).await
    }

    /// Search a proof against the current head, then commit with it.
    ///
    /// If another commit lands while the search runs, this fails with
    /// `ProofRejected`; retrying is up to the caller.
    pub async fn baptize(&self, valid_time: Option<ValidTime>) -> Result<State> {
        let proof = self.find_proof().await?;
        self.commit(proof, valid_time).await
    }

    /// Run negentropy search for the state after the current head.
    ///
    /// The search runs on the blocking pool without holding the writer lock.
    pub async fn find_proof(&self) -> Result<u64> {
        let last = self.last_state().await?;
        let search = self.proof_search;

        debug!(after = last.index, difficulty = search.difficulty.bits(), "searching proof");
        let proof = tokio::task::spawn_blocking(move || search.search_after(&last))
            .await
            .map_err(|e| LedgerError::ProofWorker(e.to_string()))??;

        Ok(proof)
    }

    async fn commit(&self, proof: u64, valid_time: Option<ValidTime>) -> Result<State> {
        let mut chain = self.chain.lock().await;

        let prepared = match chain.prepare_state(proof, valid_time, now_millis()) {
            Ok(prepared) => prepared,
            Err(e @ CoreError::ProofRejected { .. }) => {
                warn!(error = %e, "proof rejected");
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        persist(&self.store, prepared.state()).await?;
        let state = chain.append_prepared(prepared)?;

        info!(
            index = state.index,
            proof = state.proof,
            transactions = state.transactions.len(),
            digest = %state.digest,
            "state committed"
        );
        Ok(state)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// The most recently appended state.
    pub async fn last_state(&self) -> Result<State> {
        let chain = self.chain.lock().await;
        Ok(chain.last_state()?.clone())
    }

    /// Get a state by its 1-based index.
    pub async fn get_state(&self, index: u64) -> Option<State> {
        self.chain.lock().await.get(index).cloned()
    }

    /// Copy of every state, for validation or shipping to a peer.
    pub async fn snapshot(&self) -> Vec<State> {
        self.chain.lock().await.states().to_vec()
    }

    /// Transactions waiting for the next state.
    pub async fn pending(&self) -> Vec<Transaction> {
        self.chain.lock().await.pending().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.chain.lock().await.len()
    }

    /// Certify the chain.
    ///
    /// Works on a snapshot, so writers are only blocked while it is copied.
    pub async fn warrant(&self) -> Result<Warrant> {
        let states = self.snapshot().await;
        let validator = ChainValidator::new(self.config.difficulty()?);
        let warrant = validator.validate(&states)?;
        if let Some(violation) = warrant.violation() {
            warn!(%violation, "chain failed validation");
        }
        Ok(warrant)
    }
}

/// Write a state to the store, mapping refusals to errors.
async fn persist<S: StateStore>(store: &S, state: &State) -> Result<()> {
    let encoded = encode_state(state)?;
    match store.append_state(state, &encoded).await? {
        AppendResult::Appended | AppendResult::AlreadyExists => Ok(()),
        AppendResult::Conflict { index, existing } => {
            Err(LedgerError::Conflict { index, existing })
        }
        AppendResult::OutOfOrder { expected, got } => {
            Err(LedgerError::OutOfSync { expected, got })
        }
    }
}

/// Validate a chain recovered from storage.
///
/// Unlike a peer copy, a recovered chain must start at a well-formed genesis.
fn warrant_recovered(chain: &Chain) -> Result<Warrant> {
    let genesis = chain.states().first().ok_or(CoreError::EmptyChain)?;
    if !genesis.is_genesis() {
        return Ok(Warrant::Invalid(Violation::IndexDiscontinuity(0)));
    }
    if genesis.digest != genesis.compute_digest()? {
        return Ok(Warrant::Invalid(Violation::DigestMismatch(0)));
    }
    Ok(chain.warrant()?)
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
