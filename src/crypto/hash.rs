//! Cryptographic hashing utilities for the ledger
//!
//! Provides SHA-256 based hashing and the canonical JSON serialization
//! used for block hashes and signed transaction messages.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Serializes a value to canonical JSON: compact, with object keys sorted.
///
/// Identical logical content always produces identical bytes regardless of
/// field-insertion order, so the output is safe to hash and sign.
/// `serde_json::Value` stores objects in a `BTreeMap`, which gives the
/// sorted-key ordering.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_string(&value)
}

/// SHA-256 hex digest of a value's canonical JSON form
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(value)?.as_bytes()))
}
