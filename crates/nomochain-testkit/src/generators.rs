//! Proptest generators for property-based testing.

use proptest::prelude::*;

use nomochain_core::{Chain, Transaction, ValidTime};

use crate::fixtures::ChainFixture;

/// Generate an agent or recipient name.
pub fn party() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,15}".prop_map(String::from)
}

/// Generate a transfer amount. Negative amounts are legal entries.
pub fn amount() -> impl Strategy<Value = i64> {
    any::<i64>()
}

/// Generate a transaction.
pub fn transaction() -> impl Strategy<Value = Transaction> {
    (party(), party(), amount()).prop_map(|(agent, recipient, amount)| {
        Transaction::new(agent, recipient, amount)
    })
}

/// Generate a well-formed valid-time interval.
pub fn valid_time() -> impl Strategy<Value = ValidTime> {
    (0i64..=1_700_000_000_000i64, 0i64..=86_400_000i64)
        .prop_map(|(from, span)| ValidTime {
            from,
            until: from + span,
        })
}

/// Parameters for one commit.
#[derive(Debug, Clone)]
pub struct CommitParams {
    pub transactions: Vec<Transaction>,
    pub valid_time: Option<ValidTime>,
}

impl Arbitrary for CommitParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(transaction(), 0..=4),
            prop::option::of(valid_time()),
        )
            .prop_map(|(transactions, valid_time)| CommitParams {
                transactions,
                valid_time,
            })
            .boxed()
    }
}

/// Generate a history of 1 to `max` commits.
pub fn history(max: usize) -> impl Strategy<Value = Vec<CommitParams>> {
    prop::collection::vec(any::<CommitParams>(), 1..=max)
}

/// Build a fixture chain by replaying commit parameters.
pub fn chain_from_params(params: &[CommitParams]) -> Chain {
    let mut fixture = ChainFixture::new();
    for commit in params {
        for tx in &commit.transactions {
            fixture.submit(&tx.agent, &tx.recipient, tx.amount);
        }
        fixture.commit_with(commit.valid_time);
    }
    fixture.chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomochain_core::{
        decode_state, encode_state, hash_state, ChainValidator, Violation, Warrant,
    };

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_built_chain_is_valid(params in history(5)) {
            let chain = chain_from_params(&params);

            prop_assert_eq!(chain.len(), params.len() + 1);
            prop_assert_eq!(chain.warrant().unwrap(), Warrant::Valid);
            prop_assert!(chain.pending().is_empty());
        }

        #[test]
        fn test_transactions_land_in_order(params in history(4)) {
            let chain = chain_from_params(&params);

            for (state, commit) in chain.states()[1..].iter().zip(&params) {
                prop_assert_eq!(&state.transactions, &commit.transactions);
                if let Some(vt) = commit.valid_time {
                    prop_assert_eq!(state.valid_time(), vt);
                }
            }
        }

        #[test]
        fn test_tampering_is_localized(
            params in history(5),
            pick in any::<prop::sample::Index>(),
            shift in 1i64..=1_000,
        ) {
            let chain = chain_from_params(&params);
            let mut states = chain.into_states();
            let position = 1 + pick.index(states.len() - 1);

            let state = &mut states[position];
            match state.transactions.first_mut() {
                Some(tx) => tx.amount = tx.amount.wrapping_add(shift),
                None => state.time_df = state.time_df.wrapping_sub(shift),
            }

            let warrant = ChainValidator::new(ChainFixture::new().difficulty())
                .validate(&states)
                .unwrap();
            prop_assert_eq!(warrant, Warrant::Invalid(Violation::DigestMismatch(position)));
        }

        #[test]
        fn test_tampered_genesis_breaks_first_link(params in history(3)) {
            let mut states = chain_from_params(&params).into_states();
            states[0].proof += 1;

            let warrant = ChainValidator::new(ChainFixture::new().difficulty())
                .validate(&states)
                .unwrap();
            prop_assert_eq!(warrant, Warrant::Invalid(Violation::HashLinkBroken(1)));
        }

        #[test]
        fn test_state_hash_deterministic(params in history(3)) {
            let a = chain_from_params(&params);
            let b = chain_from_params(&params);

            for (x, y) in a.states().iter().zip(b.states()) {
                prop_assert_eq!(hash_state(x).unwrap(), hash_state(y).unwrap());
                prop_assert_eq!(x.digest, y.digest);
            }
        }

        #[test]
        fn test_persistence_record_roundtrip(params in history(3)) {
            let chain = chain_from_params(&params);

            for state in chain.states() {
                let encoded = encode_state(state).unwrap();
                prop_assert_eq!(&decode_state(&encoded).unwrap(), state);
            }
        }
    }
}
