//! Content hashing of states and proof contexts.
//!
//! Every digest is Blake3 over a domain tag followed by canonical CBOR, so a
//! state digest can never collide with a proof candidate digest.

use ciborium::value::Value;

use crate::canonical::{canonical_state_bytes, encode_value};
use crate::error::Result;
use crate::state::State;
use crate::types::StateHash;

/// Domain tag for state digests.
pub const STATE_DOMAIN: &[u8] = b"nomochain-state-v0:";

/// Domain tag for proof candidate digests.
pub const PROOF_DOMAIN: &[u8] = b"nomochain-proof-v0:";

/// Hash the content of a state. The stored `digest` field is not included.
pub fn hash_state(state: &State) -> Result<StateHash> {
    let content = canonical_state_bytes(state)?;
    Ok(domain_hash(STATE_DOMAIN, &content))
}

/// Hash an arbitrary CBOR value under the given domain tag.
pub fn hash_value(domain: &[u8], value: &Value) -> Result<StateHash> {
    let content = encode_value(value)?;
    Ok(domain_hash(domain, &content))
}

/// Hash raw bytes with no domain tag.
pub fn hash_bytes(data: &[u8]) -> StateHash {
    StateHash(*blake3::hash(data).as_bytes())
}

fn domain_hash(domain: &[u8], content: &[u8]) -> StateHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain);
    hasher.update(content);
    StateHash(*hasher.finalize().as_bytes())
}
