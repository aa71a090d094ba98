//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Fixtures run on a fixed clock and
//! a low difficulty so chains are reproducible and cheap to build.

use nomochain::{Ledger, LedgerConfig};
use nomochain_core::{
    warrant_proof, Chain, Difficulty, ProofContext, ProofSearch, State, ValidTime,
    DEFAULT_GENESIS_PROOF,
};
use nomochain_store::StateStore;

/// Genesis time of every fixture chain (2025-01-14T16:00:00Z).
pub const FIXED_NOW: i64 = 1_736_870_400_000;

/// Clock advance between fixture commits.
pub const TICK: i64 = 1_000;

/// Difficulty used by fixtures: about 64 candidates per proof.
pub const FIXTURE_DIFFICULTY: u32 = 6;

/// A chain with a fixed clock and its proof search.
pub struct ChainFixture {
    pub chain: Chain,
    search: ProofSearch,
    clock: i64,
}

impl ChainFixture {
    /// Create a fixture holding only genesis.
    pub fn new() -> Self {
        Self::with_difficulty(FIXTURE_DIFFICULTY)
    }

    pub fn with_difficulty(bits: u32) -> Self {
        let difficulty = Difficulty::new(bits).expect("fixture difficulty out of range");
        let chain = Chain::create(DEFAULT_GENESIS_PROOF, difficulty, FIXED_NOW)
            .expect("genesis encodes");
        Self {
            chain,
            search: ProofSearch::new(difficulty),
            clock: FIXED_NOW,
        }
    }

    /// A fixture with `commits` states after genesis, one transfer each.
    pub fn build(commits: usize) -> Self {
        let mut fixture = Self::new();
        for i in 0..commits {
            fixture.submit("alice", "bob", i as i64 + 1);
            fixture.commit();
        }
        fixture
    }

    /// Stage a transaction.
    pub fn submit(&mut self, agent: &str, recipient: &str, amount: i64) -> u64 {
        self.chain.submit_transaction(agent, recipient, amount)
    }

    /// Search a proof and commit the pending transactions.
    pub fn commit(&mut self) -> State {
        self.commit_with(None)
    }

    /// Commit with an explicit valid-time interval.
    pub fn commit_with(&mut self, valid_time: Option<ValidTime>) -> State {
        let proof = self.next_proof();
        self.clock += TICK;
        self.chain
            .commit_state(proof, valid_time, self.clock)
            .expect("searched proof is accepted")
    }

    /// The proof the search finds for the next state.
    pub fn next_proof(&self) -> u64 {
        let last = self.chain.last_state().expect("fixture chain is never empty");
        self.search.search_after(last).expect("unbounded search")
    }

    pub fn difficulty(&self) -> Difficulty {
        self.chain.difficulty()
    }

    pub fn states(&self) -> &[State] {
        self.chain.states()
    }

    /// Hex digests of every state, in order.
    pub fn digests_hex(&self) -> Vec<String> {
        self.states().iter().map(|s| s.digest.to_hex()).collect()
    }

    /// The states as pretty JSON, for dumping in failing tests.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self.states()).expect("states serialize")
    }
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The smallest proof at or above `from` that the predicate refuses for the
/// state after `prev`.
pub fn failing_proof_from(prev: &State, difficulty: Difficulty, from: u64) -> u64 {
    let context = ProofContext::of(prev).expect("state encodes");
    (from..)
        .find(|p| !warrant_proof(&context, prev.proof, *p, difficulty).expect("proof encodes"))
        .expect("some candidate fails")
}

/// Ledger configuration matching the fixture difficulty.
pub fn ledger_config() -> LedgerConfig {
    LedgerConfig {
        difficulty: FIXTURE_DIFFICULTY,
        ..LedgerConfig::default()
    }
}

/// Open a ledger on `store` with the fixture configuration.
pub async fn open_ledger<S: StateStore>(store: S) -> Ledger<S> {
    Ledger::open(store, ledger_config())
        .await
        .expect("ledger opens")
}
