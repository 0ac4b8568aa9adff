//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - SHA-256 hashing and canonical JSON serialization
//! - ECDSA key management and address derivation (secp256k1)

pub mod hash;
pub mod keys;

pub use hash::{canonical_hash, canonical_json, sha256, sha256_hex};
pub use keys::{
    derive_address, derive_address_from_hex, public_key_from_hex, sign_message, verify_signature,
    KeyError, KeyPair, ADDRESS_LEN,
};
