//! Canonical CBOR encoding for deterministic hashing and persistence.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (times are i64 milliseconds)
//!
//! The same state always produces identical bytes (and thus an identical
//! digest) on every node, whatever order its fields were assembled in.

use ciborium::value::{Integer, Value};

use crate::error::{CoreError, Result};
use crate::state::State;
use crate::transaction::Transaction;
use crate::types::StateHash;

/// State field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const INDEX: u64 = 0;
    pub const TIMESTAMP: u64 = 1;
    pub const TIME_DF: u64 = 2;
    pub const TIME_DU: u64 = 3;
    pub const TIME_RF: u64 = 4;
    pub const TIME_RU: u64 = 5;
    pub const TRANSACTIONS: u64 = 6;
    pub const PROOF: u64 = 7;
    pub const PREV_HASH: u64 = 8;
    /// Persistence records only; never hashed.
    pub const DIGEST: u64 = 9;
}

/// Transaction field keys.
mod tx_keys {
    pub const AGENT: u64 = 0;
    pub const RECIPIENT: u64 = 1;
    pub const AMOUNT: u64 = 2;
}

/// Encode the hashed content of a state (everything except `digest`).
pub fn canonical_state_bytes(state: &State) -> Result<Vec<u8>> {
    encode_value(&state_to_value(state, false))
}

/// Encode a full persistence record of a state, `digest` included.
pub fn encode_state(state: &State) -> Result<Vec<u8>> {
    encode_value(&state_to_value(state, true))
}

/// Encode any CBOR value canonically.
///
/// Fails with [`CoreError::Serialization`] for values with no canonical form.
pub fn encode_value(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Build an integer-keyed map entry.
pub(crate) fn entry(key: u64, value: Value) -> (Value, Value) {
    (Value::Integer(key.into()), value)
}

fn state_to_value(state: &State, with_digest: bool) -> Value {
    let mut entries = Vec::with_capacity(10);

    entries.push(entry(keys::INDEX, Value::Integer(state.index.into())));
    entries.push(entry(keys::TIMESTAMP, Value::Integer(state.timestamp.into())));
    entries.push(entry(keys::TIME_DF, Value::Integer(state.time_df.into())));
    entries.push(entry(keys::TIME_DU, Value::Integer(state.time_du.into())));
    entries.push(entry(keys::TIME_RF, Value::Integer(state.time_rf.into())));
    entries.push(entry(keys::TIME_RU, Value::Integer(state.time_ru.into())));

    let transactions = state.transactions.iter().map(transaction_to_value).collect();
    entries.push(entry(keys::TRANSACTIONS, Value::Array(transactions)));

    entries.push(entry(keys::PROOF, Value::Integer(state.proof.into())));
    entries.push(entry(keys::PREV_HASH, Value::Bytes(state.prev_hash.0.to_vec())));

    if with_digest {
        entries.push(entry(keys::DIGEST, Value::Bytes(state.digest.0.to_vec())));
    }

    Value::Map(entries)
}

fn transaction_to_value(tx: &Transaction) -> Value {
    Value::Map(vec![
        entry(tx_keys::AGENT, Value::Text(tx.agent.clone())),
        entry(tx_keys::RECIPIENT, Value::Text(tx.recipient.clone())),
        entry(tx_keys::AMOUNT, Value::Integer(tx.amount.into())),
    ])
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => {
            encode_uint(buf, 4, arr.len() as u64);
            for item in arr {
                encode_value_to(buf, item)?;
            }
        }
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => {
            return Err(CoreError::Serialization(
                "floats have no canonical encoding".into(),
            ))
        }
        Value::Tag(tag, _) => {
            return Err(CoreError::Serialization(format!("unsupported tag {}", tag)))
        }
        _ => return Err(CoreError::Serialization("unsupported CBOR value type".into())),
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison. Duplicate keys are
/// rejected since they make the content ambiguous.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<()> {
    let mut pairs = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        pairs.push((key_buf, v));
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(CoreError::Serialization("duplicate map key".into()));
    }

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}

/// Decode a state from a persistence record produced by [`encode_state`].
///
/// The record must be canonical: re-encoding the decoded state has to give
/// back the exact input bytes.
pub fn decode_state(bytes: &[u8]) -> Result<State> {
    let value: Value = ciborium::de::from_reader(bytes)
        .map_err(|e| CoreError::Deserialization(e.to_string()))?;

    let map = match &value {
        Value::Map(m) => m,
        _ => return Err(CoreError::Deserialization("expected map".into())),
    };

    let state = State {
        index: expect_u64(get(map, keys::INDEX), "index")?,
        timestamp: expect_i64(get(map, keys::TIMESTAMP), "timestamp")?,
        time_df: expect_i64(get(map, keys::TIME_DF), "time_df")?,
        time_du: expect_i64(get(map, keys::TIME_DU), "time_du")?,
        time_rf: expect_i64(get(map, keys::TIME_RF), "time_rf")?,
        time_ru: expect_i64(get(map, keys::TIME_RU), "time_ru")?,
        transactions: decode_transactions(get(map, keys::TRANSACTIONS))?,
        proof: expect_u64(get(map, keys::PROOF), "proof")?,
        prev_hash: expect_hash(get(map, keys::PREV_HASH), "prev_hash")?,
        digest: expect_hash(get(map, keys::DIGEST), "digest")?,
    };

    if encode_state(&state)? != bytes {
        return Err(CoreError::Deserialization("non-canonical state record".into()));
    }

    Ok(state)
}

fn decode_transactions(value: Option<&Value>) -> Result<Vec<Transaction>> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Err(CoreError::Deserialization("invalid transactions".into())),
    };

    items
        .iter()
        .map(|item| match item {
            Value::Map(m) => Ok(Transaction {
                agent: expect_text(get(m, tx_keys::AGENT), "agent")?,
                recipient: expect_text(get(m, tx_keys::RECIPIENT), "recipient")?,
                amount: expect_i64(get(m, tx_keys::AMOUNT), "amount")?,
            }),
            _ => Err(CoreError::Deserialization("invalid transaction".into())),
        })
        .collect()
}

/// Look up a value by integer key.
fn get(map: &[(Value, Value)], key: u64) -> Option<&Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == key as i128))
        .map(|(_, v)| v)
}

fn expect_u64(value: Option<&Value>, field: &str) -> Result<u64> {
    match value {
        Some(Value::Integer(i)) => u64::try_from(*i)
            .map_err(|_| CoreError::Deserialization(format!("{} out of range", field))),
        _ => Err(CoreError::Deserialization(format!("missing or invalid {}", field))),
    }
}

fn expect_i64(value: Option<&Value>, field: &str) -> Result<i64> {
    match value {
        Some(Value::Integer(i)) => i64::try_from(*i)
            .map_err(|_| CoreError::Deserialization(format!("{} out of range", field))),
        _ => Err(CoreError::Deserialization(format!("missing or invalid {}", field))),
    }
}

fn expect_text(value: Option<&Value>, field: &str) -> Result<String> {
    match value {
        Some(Value::Text(s)) => Ok(s.clone()),
        _ => Err(CoreError::Deserialization(format!("missing or invalid {}", field))),
    }
}

fn expect_hash(value: Option<&Value>, field: &str) -> Result<StateHash> {
    match value {
        Some(Value::Bytes(b)) => StateHash::try_from(b.as_slice())
            .map_err(|_| CoreError::Deserialization(format!("{} must be 32 bytes", field))),
        _ => Err(CoreError::Deserialization(format!("missing or invalid {}", field))),
    }
}
