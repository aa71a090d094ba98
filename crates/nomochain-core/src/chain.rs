//! Chain: the ordered, append-only sequence of states.
//!
//! Each state has exactly one predecessor (genesis has none) and references
//! it by digest. The chain owns the buffer of transactions waiting for the
//! next state.

use crate::error::{CoreError, Result};
use crate::hasher::hash_state;
use crate::proof::{warrant_proof, Difficulty, ProofContext};
use crate::state::{State, ValidTime};
use crate::transaction::{Transaction, TransactionBuffer};
use crate::types::StateHash;
use crate::validation::{ChainValidator, Warrant};

/// The proof conventionally given to genesis.
pub const DEFAULT_GENESIS_PROOF: u64 = 100;

/// A state built against the current head but not yet appended.
///
/// Produced by [`Chain::prepare_state`]; consumed by [`Chain::append_prepared`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedState {
    state: State,
    drained: usize,
}

impl PreparedState {
    /// The state that will be appended.
    pub fn state(&self) -> &State {
        &self.state
    }
}

/// An append-only chain of states plus its live transaction buffer.
#[derive(Debug, Clone)]
pub struct Chain {
    states: Vec<State>,
    buffer: TransactionBuffer,
    difficulty: Difficulty,
}

impl Chain {
    /// Create a chain holding only its genesis state.
    ///
    /// Genesis gets index 1, every temporal field set to `now`, no
    /// transactions, and the [`StateHash::GENESIS`] sentinel as `prev_hash`.
    pub fn create(genesis_proof: u64, difficulty: Difficulty, now: i64) -> Result<Self> {
        let genesis = State::sealed(
            1,
            now,
            ValidTime::instant(now),
            Vec::new(),
            genesis_proof,
            StateHash::GENESIS,
        )?;

        Ok(Self {
            states: vec![genesis],
            buffer: TransactionBuffer::new(),
            difficulty,
        })
    }

    /// Rebuild a chain from recovered states.
    ///
    /// The states are taken as-is; run a [`ChainValidator`] to certify them.
    pub fn from_states(states: Vec<State>, difficulty: Difficulty) -> Result<Self> {
        if states.is_empty() {
            return Err(CoreError::EmptyChain);
        }
        Ok(Self {
            states,
            buffer: TransactionBuffer::new(),
            difficulty,
        })
    }

    /// Stage a transaction for the next state.
    ///
    /// Returns the position it will occupy among that state's transactions.
    pub fn submit_transaction(
        &mut self,
        agent: impl Into<String>,
        recipient: impl Into<String>,
        amount: i64,
    ) -> u64 {
        self.buffer.stage(Transaction::new(agent, recipient, amount))
    }

    /// The most recently appended state.
    pub fn last_state(&self) -> Result<&State> {
        self.states.last().ok_or(CoreError::EmptyChain)
    }

    /// Drain the buffer into a new state sealed with `proof` and append it.
    ///
    /// `valid_time` back-dates or forward-dates the record; it defaults to the
    /// instant `now`. The proof must satisfy the difficulty predicate against
    /// the current head.
    pub fn commit_state(
        &mut self,
        proof: u64,
        valid_time: Option<ValidTime>,
        now: i64,
    ) -> Result<State> {
        let prepared = self.prepare_state(proof, valid_time, now)?;
        self.append_prepared(prepared)
    }

    /// Build the next state without touching the chain.
    ///
    /// The prepared state carries every transaction pending right now. Anything
    /// staged afterwards stays in the buffer for the state after it.
    pub fn prepare_state(
        &self,
        proof: u64,
        valid_time: Option<ValidTime>,
        now: i64,
    ) -> Result<PreparedState> {
        let last = self.last_state()?;
        let index = last.index + 1;

        let context = ProofContext::of(last)?;
        if !warrant_proof(&context, last.proof, proof, self.difficulty)? {
            return Err(CoreError::ProofRejected { index, proof });
        }

        let valid_time = match valid_time {
            Some(vt) => ValidTime::new(vt.from, vt.until)?,
            None => ValidTime::instant(now),
        };

        let state = State::sealed(
            index,
            now,
            valid_time,
            self.buffer.pending().to_vec(),
            proof,
            context.state_hash,
        )?;

        Ok(PreparedState {
            state,
            drained: self.buffer.len(),
        })
    }

    /// Append a prepared state, draining the transactions it carries.
    ///
    /// Fails with [`CoreError::StaleState`] if the head moved since the state
    /// was prepared.
    pub fn append_prepared(&mut self, prepared: PreparedState) -> Result<State> {
        let last = self.last_state()?;
        let expected = last.index + 1;
        if prepared.state.index != expected || prepared.state.prev_hash != hash_state(last)? {
            return Err(CoreError::StaleState {
                expected,
                got: prepared.state.index,
            });
        }

        self.buffer.drain_prefix(prepared.drained);
        self.states.push(prepared.state.clone());
        Ok(prepared.state)
    }

    /// Certify the whole chain.
    pub fn warrant(&self) -> Result<Warrant> {
        ChainValidator::new(self.difficulty).validate(&self.states)
    }

    /// Get a state by its 1-based index.
    pub fn get(&self, index: u64) -> Option<&State> {
        let first = self.states.first()?.index;
        let offset = index.checked_sub(first)?;
        self.states.get(usize::try_from(offset).ok()?)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Transactions waiting for the next state.
    pub fn pending(&self) -> &[Transaction] {
        self.buffer.pending()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Consume the chain, keeping only its states.
    pub fn into_states(self) -> Vec<State> {
        self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::ProofSearch;
    use crate::validation::Violation;

    const NOW: i64 = 1_736_870_400_000;

    fn difficulty() -> Difficulty {
        Difficulty::new(8).unwrap()
    }

    fn next_proof(chain: &Chain) -> u64 {
        ProofSearch::new(chain.difficulty())
            .search_after(chain.last_state().unwrap())
            .unwrap()
    }

    /// Smallest candidate above `from` that fails the predicate after `prev`.
    fn failing_proof_after(prev: &State, from: u64) -> u64 {
        let context = ProofContext::of(prev).unwrap();
        (from..)
            .find(|p| !warrant_proof(&context, prev.proof, *p, difficulty()).unwrap())
            .unwrap()
    }

    #[test]
    fn test_create_genesis() {
        let chain = Chain::create(DEFAULT_GENESIS_PROOF, difficulty(), NOW).unwrap();
        assert_eq!(chain.len(), 1);

        let genesis = chain.last_state().unwrap();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.prev_hash, StateHash::GENESIS);
        assert_eq!(genesis.proof, 100);
        assert!(genesis.transactions.is_empty());
        for t in [
            genesis.timestamp,
            genesis.time_df,
            genesis.time_du,
            genesis.time_rf,
            genesis.time_ru,
        ] {
            assert_eq!(t, NOW);
        }
    }

    #[test]
    fn test_submit_and_commit() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        assert_eq!(chain.submit_transaction("alice", "bob", 10), 1);

        let proof = next_proof(&chain);
        let state = chain.commit_state(proof, None, NOW + 1).unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(state.index, 2);
        assert_eq!(state.transactions, vec![Transaction::new("alice", "bob", 10)]);
        assert_eq!(state.prev_hash, hash_state(&chain.states()[0]).unwrap());
        assert_eq!(state.proof, proof);
        assert!(chain.pending().is_empty());
        assert_eq!(chain.warrant().unwrap(), Warrant::Valid);
    }

    #[test]
    fn test_tampered_proof_is_reported() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        chain.submit_transaction("alice", "bob", 10);
        let proof = next_proof(&chain);
        chain.commit_state(proof, None, NOW + 1).unwrap();

        let mut states = chain.into_states();
        states[1].proof = failing_proof_after(&states[0], proof + 1);

        let warrant = ChainValidator::new(difficulty()).validate(&states).unwrap();
        assert_eq!(warrant, Warrant::Invalid(Violation::ProofInvalid(1)));
    }

    #[test]
    fn test_commit_rejects_bad_proof() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        chain.submit_transaction("alice", "bob", 10);

        let bad = failing_proof_after(chain.last_state().unwrap(), 0);
        let result = chain.commit_state(bad, None, NOW + 1);

        assert_eq!(result, Err(CoreError::ProofRejected { index: 2, proof: bad }));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.pending().len(), 1);
    }

    #[test]
    fn test_commit_with_valid_time() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        let proof = next_proof(&chain);
        let back_dated = ValidTime::new(NOW - 86_400_000, NOW - 3_600_000).unwrap();

        let state = chain.commit_state(proof, Some(back_dated), NOW).unwrap();
        assert_eq!(state.valid_time(), back_dated);
        assert_eq!(state.record_time(), (NOW, NOW));
        assert_eq!(state.timestamp, NOW);
    }

    #[test]
    fn test_commit_rejects_inverted_valid_time() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        let proof = next_proof(&chain);
        let inverted = ValidTime { from: NOW, until: NOW - 1 };

        assert!(matches!(
            chain.commit_state(proof, Some(inverted), NOW),
            Err(CoreError::InvalidValidTime { .. })
        ));
    }

    #[test]
    fn test_empty_commit_allowed() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        let proof = next_proof(&chain);
        let state = chain.commit_state(proof, None, NOW).unwrap();
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn test_transactions_staged_after_prepare_stay_pending() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        chain.submit_transaction("alice", "bob", 10);

        let prepared = chain.prepare_state(next_proof(&chain), None, NOW).unwrap();
        assert_eq!(chain.submit_transaction("carol", "dave", 20), 2);

        let state = chain.append_prepared(prepared).unwrap();
        assert_eq!(state.transactions, vec![Transaction::new("alice", "bob", 10)]);
        assert_eq!(chain.pending(), &[Transaction::new("carol", "dave", 20)]);
    }

    #[test]
    fn test_stale_prepared_state_rejected() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        let proof = next_proof(&chain);

        let first = chain.prepare_state(proof, None, NOW).unwrap();
        let second = chain.prepare_state(proof, None, NOW + 1).unwrap();

        chain.append_prepared(first).unwrap();
        assert_eq!(
            chain.append_prepared(second),
            Err(CoreError::StaleState { expected: 3, got: 2 })
        );
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_indices_contiguous_and_linked() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        for i in 0..4 {
            chain.submit_transaction("alice", "bob", i);
            let proof = next_proof(&chain);
            chain.commit_state(proof, None, NOW + i).unwrap();
        }

        let states = chain.states();
        for pair in states.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + 1);
            assert_eq!(pair[1].prev_hash, hash_state(&pair[0]).unwrap());
        }
        assert_eq!(chain.get(3).unwrap().index, 3);
        assert!(chain.get(0).is_none());
        assert!(chain.get(6).is_none());
    }

    #[test]
    fn test_from_states_empty() {
        assert!(matches!(
            Chain::from_states(Vec::new(), difficulty()),
            Err(CoreError::EmptyChain)
        ));
    }

    #[test]
    fn test_from_states_resumes() {
        let mut chain = Chain::create(100, difficulty(), NOW).unwrap();
        let proof = next_proof(&chain);
        chain.commit_state(proof, None, NOW).unwrap();

        let mut resumed = Chain::from_states(chain.states().to_vec(), difficulty()).unwrap();
        let proof = next_proof(&resumed);
        let state = resumed.commit_state(proof, None, NOW + 1).unwrap();
        assert_eq!(state.index, 3);
        assert_eq!(resumed.warrant().unwrap(), Warrant::Valid);
    }
}
